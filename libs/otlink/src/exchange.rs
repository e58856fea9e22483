//! Exchange request/result types shared by all transports

use std::fmt;

use otproto::msg::{MsgType, Opcode};

/// One transparent command to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub opcode: Opcode,
    pub data_id: u8,
    /// The 16-bit data-value sent along with the data-id.
    pub parameter: u16,
}

impl ExchangeRequest {
    pub fn new(opcode: Opcode, data_id: u8, parameter: u16) -> Self {
        Self {
            opcode,
            data_id,
            parameter,
        }
    }
}

/// Outcome of one exchange, ordered by severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeResult {
    /// The expected ACK arrived; `data` is the slave's data-value.
    Success { msg_type: MsgType, data: u16 },
    /// The exchange completed but the slave answered DATA-INVALID or
    /// UNKNOWN-DATAID. The data word may be absent when the error code
    /// arrived before any data did.
    OpenthermError {
        msg_type: MsgType,
        data: Option<u16>,
    },
    /// The gateway rejected the command, or its replies failed validation.
    ValidationError(String),
    /// Replies arrived but could not be reconciled with the protocol.
    ProtocolMismatch(String),
    /// No resolution within the response deadline.
    Timeout(String),
    /// The link to the gateway itself failed.
    TransportError(String),
    /// Misuse of the transport (send while disconnected).
    InternalError(String),
}

/// Severity ranking used for retry and batch-abort decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Success,
    Opentherm,
    Validation,
    Mismatch,
    Timeout,
    Transport,
    Internal,
}

impl ExchangeResult {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Success { .. } => Severity::Success,
            Self::OpenthermError { .. } => Severity::Opentherm,
            Self::ValidationError(_) => Severity::Validation,
            Self::ProtocolMismatch(_) => Severity::Mismatch,
            Self::Timeout(_) => Severity::Timeout,
            Self::TransportError(_) => Severity::Transport,
            Self::InternalError(_) => Severity::Internal,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether another attempt of the same exchange can reasonably help.
    /// Protocol mismatches and internal errors are deterministic and are
    /// never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OpenthermError { .. }
                | Self::ValidationError(_)
                | Self::Timeout(_)
                | Self::TransportError(_)
        )
    }

    /// Whether an enclosing batch operation (scan, range sweep) should stop.
    pub fn is_fatal_for_batch(&self) -> bool {
        self.severity() > Severity::Timeout
    }

    /// Numeric status used for process exit mapping: 1 for success,
    /// negative magnitudes per severity otherwise.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Success { .. } => 1,
            Self::OpenthermError { .. } => -1,
            Self::ValidationError(_) => -2,
            Self::ProtocolMismatch(_) => -3,
            Self::Timeout(_) => -5,
            Self::TransportError(_) => -7,
            Self::InternalError(_) => -100,
        }
    }
}

impl fmt::Display for ExchangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { msg_type, data } => {
                write!(f, "ok ({msg_type} with data {data})")
            }
            Self::OpenthermError { msg_type, .. } => {
                write!(f, "got {}/{} response", msg_type, msg_type.code())
            }
            Self::ValidationError(msg)
            | Self::ProtocolMismatch(msg)
            | Self::Timeout(msg)
            | Self::TransportError(msg)
            | Self::InternalError(msg) => f.write_str(msg),
        }
    }
}

//! Reply correlation for the MQTT control topics
//!
//! The Wirenboard driver echoes every register we write back on the same
//! control topic before the gateway's own response arrives, so an exchange
//! sees an interleaved stream of echoes and responses on the `TR Command`
//! and `TR Data` topics. [`PendingExchange`] consumes that stream one
//! message at a time and resolves it into an [`ExchangeResult`] once both
//! the response code and the response data are known.

use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, warn};

use otproto::msg::MsgType;

use crate::exchange::{ExchangeRequest, ExchangeResult};
use crate::mqtt::BusTimeouts;

/// Which control topic a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Command,
    Id,
    Data,
    Other,
}

/// One message taken off the reply channel.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub received_at: Instant,
    pub topic: String,
    pub payload: String,
}

/// The three Wirenboard control topics of one gateway device.
#[derive(Debug, Clone)]
pub(crate) struct ControlTopics {
    pub command: String,
    pub id: String,
    pub data: String,
}

impl ControlTopics {
    pub fn new(device: &str) -> Self {
        let base = format!("/devices/{device}/controls");
        Self {
            command: format!("{base}/TR Command"),
            id: format!("{base}/TR ID"),
            data: format!("{base}/TR Data"),
        }
    }

    pub fn all(&self) -> [String; 3] {
        [self.command.clone(), self.id.clone(), self.data.clone()]
    }

    pub fn classify(&self, topic: &str) -> Topic {
        if topic == self.command {
            Topic::Command
        } else if topic == self.id {
            Topic::Id
        } else if topic == self.data {
            Topic::Data
        } else {
            Topic::Other
        }
    }

    /// Writes go to the `/on` sub-topic of a control.
    pub fn publish_topic(&self, topic: &str) -> String {
        format!("{topic}/on")
    }
}

/// Last payload seen per control topic outside of an active exchange.
///
/// Retained values and late replies from a previous exchange land here;
/// the partial-timeout recovery path consults it.
#[derive(Debug, Clone, Default)]
pub struct EchoSnapshot {
    pub command: String,
    pub id: String,
    pub data: String,
}

impl EchoSnapshot {
    pub fn record(&mut self, topic: Topic, payload: &str) {
        match topic {
            Topic::Command => {
                debug!("Saving TR Command value: {}", payload);
                self.command = payload.to_string();
            }
            Topic::Id => {
                debug!("Saving TR ID value: {}", payload);
                self.id = payload.to_string();
            }
            Topic::Data => {
                debug!("Saving TR Data value: {}", payload);
                self.data = payload.to_string();
            }
            Topic::Other => warn!("Unexpected topic in drain: {}", payload),
        }
    }
}

fn error_msg_type(payload: &str) -> MsgType {
    if payload == "6" {
        MsgType::DataInvalid
    } else {
        MsgType::UnknownDataId
    }
}

/// Correlation state for one in-flight exchange.
#[derive(Debug)]
pub struct PendingExchange {
    request: ExchangeRequest,
    command_replies: u32,
    data_replies: u32,
    response_code: String,
    response_data: String,
}

impl PendingExchange {
    pub fn new(request: ExchangeRequest) -> Self {
        Self {
            request,
            command_replies: 0,
            data_replies: 0,
            response_code: String::new(),
            response_data: String::new(),
        }
    }

    pub fn total_replies(&self) -> u32 {
        self.command_replies + self.data_replies
    }

    /// True once the command topic carried the expected ACK code.
    pub fn response_code_is_ack(&self) -> bool {
        self.response_code == self.request.opcode.ack().code().to_string()
    }

    /// Feed one message; `Some` means the exchange is resolved.
    pub fn on_message(&mut self, topic: Topic, payload: &str) -> Option<ExchangeResult> {
        match topic {
            Topic::Command => {
                self.command_replies += 1;
                if let Some(result) = self.on_command(payload) {
                    return Some(result);
                }
            }
            Topic::Id => {
                // The driver echoes the data-id here; informational only.
                debug!("TR ID reply: {}", payload);
            }
            Topic::Data => {
                self.data_replies += 1;
                if let Some(result) = self.on_data(payload) {
                    return Some(result);
                }
            }
            Topic::Other => {
                warn!("Message on unexpected topic ignored: {}", payload);
            }
        }
        self.try_resolve()
    }

    fn on_command(&mut self, payload: &str) -> Option<ExchangeResult> {
        let sent_code = self.request.opcode.command_code().to_string();
        let ack_code = self.request.opcode.ack().code().to_string();
        match self.command_replies {
            1 => {
                // First message must be the driver echoing our command.
                if payload != sent_code {
                    return Some(ExchangeResult::ValidationError(
                        "command validation error".to_string(),
                    ));
                }
            }
            2 => {
                if payload == "0" {
                    // Gateway accepted the command; response still pending.
                } else if payload == "1" {
                    return Some(ExchangeResult::ValidationError(
                        "command validation error".to_string(),
                    ));
                } else if payload == ack_code {
                    warn!("ACK before gateway accept; treating as response");
                    self.response_code = payload.to_string();
                } else if payload == "6" || payload == "7" {
                    return Some(ExchangeResult::OpenthermError {
                        msg_type: error_msg_type(payload),
                        data: None,
                    });
                } else {
                    return Some(ExchangeResult::ValidationError(
                        "invalid response".to_string(),
                    ));
                }
            }
            _ => {
                if !self.response_code.is_empty() {
                    error!("Extra TR Command reply ignored: {}", payload);
                } else {
                    self.response_code = payload.to_string();
                    if payload != ack_code && (payload == "6" || payload == "7") {
                        return Some(ExchangeResult::OpenthermError {
                            msg_type: error_msg_type(payload),
                            data: self.response_data.parse().ok(),
                        });
                    }
                    if payload != ack_code {
                        return Some(ExchangeResult::ValidationError(
                            "invalid response".to_string(),
                        ));
                    }
                }
            }
        }
        None
    }

    fn on_data(&mut self, payload: &str) -> Option<ExchangeResult> {
        let echo = self.request.parameter.to_string();
        match self.data_replies {
            1 => {
                if payload == echo {
                    // Driver echoing our data-value.
                } else if self.response_code_is_ack() {
                    // Echo was lost but the ACK already arrived.
                    warn!("Data echo missing, recovered via heuristic: {}", payload);
                    self.response_data = payload.to_string();
                } else if self.command_replies >= 2 {
                    warn!("Data echo missing, recovered via heuristic: {}", payload);
                    self.response_data = payload.to_string();
                } else {
                    return Some(ExchangeResult::ValidationError(
                        "data validation error".to_string(),
                    ));
                }
            }
            2 => {
                if payload == "0" {
                    // Driver clearing the data register.
                } else {
                    warn!("Data accept missing, recovered via heuristic: {}", payload);
                    self.response_data = payload.to_string();
                }
            }
            _ => {
                if self.response_data.is_empty() {
                    self.response_data = payload.to_string();
                } else {
                    error!("Extra TR Data reply ignored: {}", payload);
                }
            }
        }
        None
    }

    fn try_resolve(&self) -> Option<ExchangeResult> {
        if self.response_code.is_empty() || self.response_data.is_empty() {
            return None;
        }
        let code: u16 = match self.response_code.parse() {
            Ok(v) => v,
            Err(_) => {
                return Some(ExchangeResult::ProtocolMismatch(format!(
                    "non-numeric response cmd/data ({}, {})",
                    self.response_code, self.response_data
                )));
            }
        };
        let data: u16 = match self.response_data.parse() {
            Ok(v) => v,
            Err(_) => {
                return Some(ExchangeResult::ProtocolMismatch(format!(
                    "non-numeric response cmd/data ({}, {})",
                    self.response_code, self.response_data
                )));
            }
        };
        let ack = self.request.opcode.ack();
        if code == u16::from(ack.code()) {
            return Some(ExchangeResult::Success {
                msg_type: ack,
                data,
            });
        }
        if let Some(msg_type) = u8::try_from(code).ok().and_then(MsgType::from_code) {
            if msg_type.is_error() {
                return Some(ExchangeResult::OpenthermError {
                    msg_type,
                    data: Some(data),
                });
            }
        }
        Some(ExchangeResult::ProtocolMismatch(format!(
            "inconsistent response ({code}, {data})"
        )))
    }
}

/// Wait on the reply channel until the exchange resolves or a deadline
/// tier fires.
///
/// Three deadlines apply, all measured from the first wait:
/// * `ack` - if the bus stayed completely silent this long, the driver is
///   gone and the exchange fails with a transport error;
/// * `partial` - if some replies arrived but the exchange is still open,
///   try to recover the response from the last-seen topic values;
/// * `total` - hard stop, reported as a timeout.
pub(crate) async fn await_resolution(
    rx: &mut mpsc::Receiver<Inbound>,
    snapshot: &mut EchoSnapshot,
    topics: &ControlTopics,
    request: &ExchangeRequest,
    timeouts: &BusTimeouts,
) -> ExchangeResult {
    let mut pending = PendingExchange::new(*request);
    let start = Instant::now();
    let ack_deadline = start + timeouts.ack;
    let partial_deadline = start + timeouts.partial;
    let total_deadline = start + timeouts.total;

    loop {
        // Wake at the nearest deadline that can still fire.
        let mut tick = total_deadline;
        if Instant::now() < partial_deadline {
            tick = partial_deadline;
        }
        if pending.total_replies() == 0 && ack_deadline < tick {
            tick = ack_deadline;
        }
        let wait = tick.saturating_duration_since(Instant::now());

        match timeout(wait, rx.recv()).await {
            Ok(Some(inbound)) => {
                let topic = topics.classify(&inbound.topic);
                snapshot.record(topic, &inbound.payload);
                if let Some(result) = pending.on_message(topic, &inbound.payload) {
                    return result;
                }
            }
            Ok(None) => {
                return ExchangeResult::TransportError(
                    "gateway driver connection lost".to_string(),
                );
            }
            Err(_) => {
                let now = Instant::now();
                if now >= partial_deadline
                    && pending.response_code_is_ack()
                    && snapshot.id == request.data_id.to_string()
                {
                    warn!(
                        "Exchange incomplete, recovered via heuristic from last topic values"
                    );
                    return match snapshot.data.parse::<u16>() {
                        Ok(data) => ExchangeResult::Success {
                            msg_type: request.opcode.ack(),
                            data,
                        },
                        Err(_) => ExchangeResult::ProtocolMismatch(format!(
                            "non-numeric response cmd/data ({}, {})",
                            snapshot.command, snapshot.data
                        )),
                    };
                }
                if pending.total_replies() == 0 && now >= ack_deadline {
                    return ExchangeResult::TransportError(
                        "no response from gateway driver".to_string(),
                    );
                }
                if now >= total_deadline {
                    return ExchangeResult::Timeout(format!(
                        "no resolution within {:?}",
                        timeouts.total
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use otproto::msg::Opcode;

    fn read_req() -> ExchangeRequest {
        ExchangeRequest::new(Opcode::Read, 25, 0)
    }

    fn feed(pe: &mut PendingExchange, msgs: &[(Topic, &str)]) -> Option<ExchangeResult> {
        for (topic, payload) in msgs {
            if let Some(r) = pe.on_message(*topic, payload) {
                return Some(r);
            }
        }
        None
    }

    #[test]
    fn test_normal_read_sequence() {
        let mut pe = PendingExchange::new(read_req());
        let result = feed(
            &mut pe,
            &[
                (Topic::Command, "2"),
                (Topic::Id, "25"),
                (Topic::Data, "0"),
                (Topic::Command, "0"),
                (Topic::Command, "4"),
                (Topic::Id, "25"),
                (Topic::Data, "11648"),
            ],
        );
        assert_eq!(
            result,
            Some(ExchangeResult::Success {
                msg_type: MsgType::ReadAck,
                data: 11648
            })
        );
    }

    #[test]
    fn test_write_sequence() {
        let mut pe = PendingExchange::new(ExchangeRequest::new(Opcode::Write, 1, 0x0A00));
        let result = feed(
            &mut pe,
            &[
                (Topic::Command, "3"),
                (Topic::Data, "2560"),
                (Topic::Command, "0"),
                (Topic::Data, "0"),
                (Topic::Command, "5"),
                (Topic::Data, "2560"),
            ],
        );
        assert_eq!(
            result,
            Some(ExchangeResult::Success {
                msg_type: MsgType::WriteAck,
                data: 2560
            })
        );
    }

    #[test]
    fn test_first_command_mismatch_is_validation_error() {
        let mut pe = PendingExchange::new(read_req());
        let result = pe.on_message(Topic::Command, "3");
        assert_eq!(
            result,
            Some(ExchangeResult::ValidationError(
                "command validation error".to_string()
            ))
        );
    }

    #[test]
    fn test_gateway_reject_is_validation_error() {
        let mut pe = PendingExchange::new(read_req());
        assert!(pe.on_message(Topic::Command, "2").is_none());
        let result = pe.on_message(Topic::Command, "1");
        assert_eq!(
            result,
            Some(ExchangeResult::ValidationError(
                "command validation error".to_string()
            ))
        );
    }

    #[test]
    fn test_early_error_code_without_data() {
        let mut pe = PendingExchange::new(read_req());
        assert!(pe.on_message(Topic::Command, "2").is_none());
        let result = pe.on_message(Topic::Command, "7");
        assert_eq!(
            result,
            Some(ExchangeResult::OpenthermError {
                msg_type: MsgType::UnknownDataId,
                data: None
            })
        );
    }

    #[test]
    fn test_late_error_code() {
        let mut pe = PendingExchange::new(read_req());
        let result = feed(
            &mut pe,
            &[
                (Topic::Command, "2"),
                (Topic::Data, "0"),
                (Topic::Command, "0"),
                (Topic::Command, "6"),
            ],
        );
        assert_eq!(
            result,
            Some(ExchangeResult::OpenthermError {
                msg_type: MsgType::DataInvalid,
                data: None
            })
        );
    }

    #[test]
    fn test_error_code_after_data() {
        let mut pe = PendingExchange::new(read_req());
        let result = feed(
            &mut pe,
            &[
                (Topic::Command, "2"),
                (Topic::Command, "0"),
                (Topic::Data, "25"),
                (Topic::Command, "6"),
            ],
        );
        assert_eq!(
            result,
            Some(ExchangeResult::OpenthermError {
                msg_type: MsgType::DataInvalid,
                data: Some(25)
            })
        );
    }

    #[test]
    fn test_missing_data_echo_recovered_after_ack() {
        // ACK lands before any data message; the lone data message is the
        // response, not the echo.
        let mut pe = PendingExchange::new(read_req());
        let result = feed(
            &mut pe,
            &[
                (Topic::Command, "2"),
                (Topic::Command, "0"),
                (Topic::Command, "4"),
                (Topic::Data, "400"),
            ],
        );
        assert_eq!(
            result,
            Some(ExchangeResult::Success {
                msg_type: MsgType::ReadAck,
                data: 400
            })
        );
    }

    #[test]
    fn test_unexpected_first_data_is_validation_error() {
        let mut pe = PendingExchange::new(read_req());
        assert!(pe.on_message(Topic::Command, "2").is_none());
        let result = pe.on_message(Topic::Data, "99");
        assert_eq!(
            result,
            Some(ExchangeResult::ValidationError(
                "data validation error".to_string()
            ))
        );
    }

    #[test]
    fn test_non_numeric_response_is_protocol_mismatch() {
        let mut pe = PendingExchange::new(read_req());
        let result = feed(
            &mut pe,
            &[
                (Topic::Command, "2"),
                (Topic::Data, "0"),
                (Topic::Command, "0"),
                (Topic::Command, "4"),
                (Topic::Data, "0"),
                (Topic::Data, "oops"),
            ],
        );
        match result {
            Some(ExchangeResult::ProtocolMismatch(msg)) => {
                assert!(msg.contains("non-numeric"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_ack_flag() {
        let mut pe = PendingExchange::new(read_req());
        assert!(!pe.response_code_is_ack());
        pe.on_message(Topic::Command, "2");
        pe.on_message(Topic::Command, "0");
        pe.on_message(Topic::Command, "4");
        assert!(pe.response_code_is_ack());
    }

    fn topics() -> ControlTopics {
        ControlTopics::new("nevoton-bcg-gw_17")
    }

    fn inbound(topics: &ControlTopics, topic: Topic, payload: &str) -> Inbound {
        let name = match topic {
            Topic::Command => topics.command.clone(),
            Topic::Id => topics.id.clone(),
            Topic::Data => topics.data.clone(),
            Topic::Other => "/devices/other/controls/Misc".to_string(),
        };
        Inbound {
            received_at: Instant::now(),
            topic: name,
            payload: payload.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_full_sequence() {
        let topics = topics();
        let request = ExchangeRequest::new(Opcode::Read, 1, 0);
        let (tx, mut rx) = mpsc::channel(16);
        for (t, p) in [
            (Topic::Command, "2"),
            (Topic::Id, "1"),
            (Topic::Data, "0"),
            (Topic::Command, "0"),
            (Topic::Command, "4"),
            (Topic::Id, "1"),
            (Topic::Data, "400"),
        ] {
            tx.send(inbound(&topics, t, p)).await.unwrap();
        }
        let mut snapshot = EchoSnapshot::default();
        let result = await_resolution(
            &mut rx,
            &mut snapshot,
            &topics,
            &request,
            &BusTimeouts::default(),
        )
        .await;
        assert_eq!(
            result,
            ExchangeResult::Success {
                msg_type: MsgType::ReadAck,
                data: 400
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_silent_bus_fails_fast() {
        let topics = topics();
        let request = read_req();
        let (tx, mut rx) = mpsc::channel::<Inbound>(16);
        let mut snapshot = EchoSnapshot::default();
        let started = Instant::now();
        let result = await_resolution(
            &mut rx,
            &mut snapshot,
            &topics,
            &request,
            &BusTimeouts::default(),
        )
        .await;
        drop(tx);
        assert_eq!(
            result,
            ExchangeResult::TransportError("no response from gateway driver".to_string())
        );
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_gateway_reject() {
        let topics = topics();
        let request = read_req();
        let (tx, mut rx) = mpsc::channel(16);
        tx.send(inbound(&topics, Topic::Command, "2")).await.unwrap();
        tx.send(inbound(&topics, Topic::Command, "1")).await.unwrap();
        let mut snapshot = EchoSnapshot::default();
        let result = await_resolution(
            &mut rx,
            &mut snapshot,
            &topics,
            &request,
            &BusTimeouts::default(),
        )
        .await;
        assert_eq!(
            result,
            ExchangeResult::ValidationError("command validation error".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_partial_recovery_from_snapshot() {
        let topics = topics();
        let request = ExchangeRequest::new(Opcode::Read, 1, 0);
        let (tx, mut rx) = mpsc::channel(16);
        tx.send(inbound(&topics, Topic::Command, "2")).await.unwrap();
        tx.send(inbound(&topics, Topic::Command, "4")).await.unwrap();
        let mut snapshot = EchoSnapshot {
            command: String::new(),
            id: "1".to_string(),
            data: "400".to_string(),
        };
        let result = await_resolution(
            &mut rx,
            &mut snapshot,
            &topics,
            &request,
            &BusTimeouts::default(),
        )
        .await;
        drop(tx);
        assert_eq!(
            result,
            ExchangeResult::Success {
                msg_type: MsgType::ReadAck,
                data: 400
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_total_timeout() {
        let topics = topics();
        let request = read_req();
        let (tx, mut rx) = mpsc::channel(16);
        tx.send(inbound(&topics, Topic::Command, "2")).await.unwrap();
        tx.send(inbound(&topics, Topic::Command, "0")).await.unwrap();
        let mut snapshot = EchoSnapshot::default();
        let result = await_resolution(
            &mut rx,
            &mut snapshot,
            &topics,
            &request,
            &BusTimeouts::default(),
        )
        .await;
        drop(tx);
        assert!(matches!(result, ExchangeResult::Timeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_channel_closed() {
        let topics = topics();
        let request = read_req();
        let (tx, mut rx) = mpsc::channel::<Inbound>(16);
        drop(tx);
        let mut snapshot = EchoSnapshot::default();
        let result = await_resolution(
            &mut rx,
            &mut snapshot,
            &topics,
            &request,
            &BusTimeouts::default(),
        )
        .await;
        assert_eq!(
            result,
            ExchangeResult::TransportError("gateway driver connection lost".to_string())
        );
    }
}

//! Modbus-RTU exchange engine for a directly attached gateway
//!
//! The gateway exposes the transparent command interface as three holding
//! registers (command, data-id, data-value) and publishes its response in
//! the same registers. Input registers 200..204 identify the module and
//! firmware and are checked once at connect time.

use std::time::Duration;

use tokio_modbus::client::Context;
use tokio_modbus::prelude::{Reader, Writer};
use tokio_modbus::Slave;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, StopBits};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use otproto::msg::MsgType;

use crate::error::LinkError;
use crate::exchange::{ExchangeRequest, ExchangeResult};
use crate::transport::ExchangeTransport;

const REG_COMMAND: u16 = 209;
const REG_ID: u16 = 210;
const REG_DATA: u16 = 211;

const REG_IDENT: u16 = 200;
const IDENT_WORDS: u16 = 5;
const MODULE_NAME: &str = "BCG102W";
const MIN_FIRMWARE: u16 = 130;

/// Command register value meaning the gateway rejected the request.
const GW_VALIDATION_ERROR: u16 = 1;

#[derive(Debug, Clone)]
pub struct SerialSettings {
    /// Serial device path, e.g. `/dev/ttyRS485-1`.
    pub device: String,
    /// Modbus station address of the gateway.
    pub station: u8,
    pub baud_rate: u32,
    /// How long to poll the registers for a response.
    pub response_timeout: Duration,
    pub poll_interval: Duration,
    pub port_timeout: Duration,
}

impl SerialSettings {
    pub fn new(device: impl Into<String>, station: u8) -> Self {
        Self {
            device: device.into(),
            station,
            baud_rate: 19200,
            response_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(250),
            port_timeout: Duration::from_secs(10),
        }
    }
}

pub struct ModbusExchange {
    settings: SerialSettings,
    ctx: Option<Context>,
}

impl ModbusExchange {
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            settings,
            ctx: None,
        }
    }
}

/// Flatten the nested Modbus result: transport errors and slave exceptions
/// both become `LinkError::Transport`.
fn flatten<T>(result: tokio_modbus::Result<T>) -> Result<T, LinkError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(exception)) => Err(LinkError::Transport(format!(
            "Modbus exception: {exception}"
        ))),
        Err(e) => Err(LinkError::Transport(format!("Modbus: {e}"))),
    }
}

/// Module name packed two ASCII chars per register, high byte first.
/// Non-alphanumeric bytes (padding) are dropped.
fn decode_module_name(regs: &[u16]) -> String {
    let mut name = String::new();
    for reg in regs {
        for byte in [(reg >> 8) as u8, (reg & 0xff) as u8] {
            if byte.is_ascii_alphanumeric() {
                name.push(byte as char);
            }
        }
    }
    name
}

/// Classify one poll of the three response registers. `None` means the
/// gateway has not answered yet (all registers still zero).
fn classify_poll(regs: &[u16], request: &ExchangeRequest) -> Option<ExchangeResult> {
    if regs.len() < 3 {
        return Some(ExchangeResult::ProtocolMismatch(format!(
            "short register block ({} words)",
            regs.len()
        )));
    }
    let (code, id, data) = (regs[0], regs[1], regs[2]);
    if code == 0 && id == 0 && data == 0 {
        return None;
    }
    if code == GW_VALIDATION_ERROR {
        return Some(ExchangeResult::ValidationError(
            "command validation error".to_string(),
        ));
    }
    let id_matches = id == u16::from(request.data_id);
    if let Some(msg_type) = u8::try_from(code).ok().and_then(MsgType::from_code) {
        if msg_type.is_error() && id_matches {
            return Some(ExchangeResult::OpenthermError {
                msg_type,
                data: Some(data),
            });
        }
        if msg_type == request.opcode.ack() && id_matches {
            return Some(ExchangeResult::Success {
                msg_type,
                data,
            });
        }
    }
    Some(ExchangeResult::ProtocolMismatch(format!(
        "inconsistent response ({code}, {id}, {data})"
    )))
}

#[async_trait::async_trait]
impl ExchangeTransport for ModbusExchange {
    async fn connect(&mut self) -> Result<(), LinkError> {
        let builder = tokio_serial::new(self.settings.device.clone(), self.settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(self.settings.port_timeout);
        let port = builder.open_native_async()?;
        let mut ctx =
            tokio_modbus::client::rtu::attach_slave(port, Slave(self.settings.station));

        let ident = flatten(ctx.read_input_registers(REG_IDENT, IDENT_WORDS).await)?;
        if ident.len() < IDENT_WORDS as usize {
            return Err(LinkError::Transport(format!(
                "short identification block ({} words)",
                ident.len()
            )));
        }
        let name = decode_module_name(&ident[..4]);
        if name != MODULE_NAME {
            return Err(LinkError::Transport(format!(
                "unsupported module '{name}' at station {}",
                self.settings.station
            )));
        }
        let firmware = ident[4];
        if firmware < MIN_FIRMWARE {
            return Err(LinkError::Transport(format!(
                "firmware {}.{:02} too old, need {}.{:02}",
                firmware / 100,
                firmware % 100,
                MIN_FIRMWARE / 100,
                MIN_FIRMWARE % 100
            )));
        }
        info!(
            "Connected to {} fw {}.{:02} at station {}",
            name,
            firmware / 100,
            firmware % 100,
            self.settings.station
        );
        self.ctx = Some(ctx);
        Ok(())
    }

    async fn disconnect(&mut self) {
        // Dropping the context closes the serial port.
        self.ctx = None;
    }

    fn is_connected(&self) -> bool {
        self.ctx.is_some()
    }

    fn device_id(&self) -> String {
        self.settings.device.clone()
    }

    async fn send(&mut self, request: &ExchangeRequest) -> ExchangeResult {
        let Some(ctx) = self.ctx.as_mut() else {
            return ExchangeResult::InternalError("send on disconnected transport".into());
        };

        let writes = [
            (REG_COMMAND, u16::from(request.opcode.command_code())),
            (REG_ID, u16::from(request.data_id)),
            (REG_DATA, request.parameter),
        ];
        for (reg, value) in writes {
            debug!("Writing register {} = {}", reg, value);
            if let Err(e) = flatten(ctx.write_single_register(reg, value).await) {
                return ExchangeResult::TransportError(format!("error writing reg {reg}: {e}"));
            }
        }

        let started = Instant::now();
        while started.elapsed() < self.settings.response_timeout {
            let regs = match flatten(ctx.read_holding_registers(REG_COMMAND, 3).await) {
                Ok(regs) => regs,
                Err(e) => {
                    return ExchangeResult::TransportError(format!(
                        "error reading response registers: {e}"
                    ));
                }
            };
            if let Some(result) = classify_poll(&regs, request) {
                return result;
            }
            sleep(self.settings.poll_interval).await;
        }
        ExchangeResult::Timeout(format!(
            "no response within {:?}",
            self.settings.response_timeout
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otproto::msg::Opcode;

    fn read_req() -> ExchangeRequest {
        ExchangeRequest::new(Opcode::Read, 1, 0)
    }

    #[test]
    fn test_decode_module_name() {
        let regs = [0x4243u16, 0x4731, 0x3032, 0x5700];
        assert_eq!(decode_module_name(&regs), "BCG102W");
    }

    #[test]
    fn test_decode_module_name_empty() {
        assert_eq!(decode_module_name(&[0, 0, 0, 0]), "");
    }

    #[test]
    fn test_classify_pending_while_zero() {
        assert_eq!(classify_poll(&[0, 0, 0], &read_req()), None);
    }

    #[test]
    fn test_classify_success() {
        assert_eq!(
            classify_poll(&[4, 1, 400], &read_req()),
            Some(ExchangeResult::Success {
                msg_type: MsgType::ReadAck,
                data: 400
            })
        );
    }

    #[test]
    fn test_classify_write_ack() {
        let request = ExchangeRequest::new(Opcode::Write, 1, 2560);
        assert_eq!(
            classify_poll(&[5, 1, 2560], &request),
            Some(ExchangeResult::Success {
                msg_type: MsgType::WriteAck,
                data: 2560
            })
        );
    }

    #[test]
    fn test_classify_opentherm_error() {
        assert_eq!(
            classify_poll(&[6, 1, 0], &read_req()),
            Some(ExchangeResult::OpenthermError {
                msg_type: MsgType::DataInvalid,
                data: Some(0)
            })
        );
    }

    #[test]
    fn test_classify_gateway_reject() {
        assert_eq!(
            classify_poll(&[1, 1, 0], &read_req()),
            Some(ExchangeResult::ValidationError(
                "command validation error".to_string()
            ))
        );
    }

    #[test]
    fn test_classify_wrong_id_is_mismatch() {
        assert!(matches!(
            classify_poll(&[4, 7, 400], &read_req()),
            Some(ExchangeResult::ProtocolMismatch(_))
        ));
    }

    #[test]
    fn test_classify_short_block() {
        assert!(matches!(
            classify_poll(&[4, 1], &read_req()),
            Some(ExchangeResult::ProtocolMismatch(_))
        ));
    }
}

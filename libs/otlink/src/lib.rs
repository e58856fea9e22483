//! Gateway exchange transports
//!
//! One transparent read/write exchange at a time against the Nevoton
//! BCG-1.0.2-W gateway module, over either the Wirenboard MQTT control
//! topics ([`mqtt::MqttExchange`]) or a direct Modbus-RTU serial link
//! ([`serial::ModbusExchange`]). Both engines implement the same
//! [`transport::ExchangeTransport`] contract and report the shared
//! [`exchange::ExchangeResult`] taxonomy.

pub mod correlate;
pub mod error;
pub mod exchange;
pub mod mqtt;
pub mod serial;
pub mod transport;

pub use error::LinkError;
pub use exchange::{ExchangeRequest, ExchangeResult, Severity};
pub use mqtt::{BusTimeouts, MqttExchange, MqttSettings};
pub use serial::{ModbusExchange, SerialSettings};
pub use transport::ExchangeTransport;

//! Transport contract shared by the MQTT and serial engines

use async_trait::async_trait;

use crate::error::LinkError;
use crate::exchange::{ExchangeRequest, ExchangeResult};

/// One-exchange-at-a-time access to an OpenTherm gateway.
///
/// Methods take `&mut self`: a transport never carries more than one
/// outstanding exchange. `send` is only valid on a connected transport and
/// reports `ExchangeResult::InternalError` otherwise; `disconnect` is
/// idempotent.
#[async_trait]
pub trait ExchangeTransport: Send {
    /// Establish and verify the gateway connection.
    async fn connect(&mut self) -> Result<(), LinkError>;

    async fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Identifier of the underlying device (MQTT topic id or serial path).
    fn device_id(&self) -> String;

    /// Run one full exchange and classify its outcome.
    async fn send(&mut self, request: &ExchangeRequest) -> ExchangeResult;
}

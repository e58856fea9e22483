//! MQTT exchange engine for the Wirenboard transparent control topics
//!
//! The gateway driver exposes three controls under
//! `/devices/<device>/controls`: `TR Command`, `TR ID` and `TR Data`.
//! Publishing to the `/on` sub-topics of all three starts an exchange;
//! the driver then echoes the written values and later publishes the
//! gateway's response on the same topics. A background pump task feeds
//! every incoming publish into an mpsc channel and the engine correlates
//! them with [`PendingExchange`].

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::correlate::{await_resolution, ControlTopics, EchoSnapshot, Inbound};
use crate::error::LinkError;
use crate::exchange::{ExchangeRequest, ExchangeResult};
use crate::transport::ExchangeTransport;

/// Deadlines governing one MQTT exchange.
#[derive(Debug, Clone, Copy)]
pub struct BusTimeouts {
    /// Broker connect plus subscribe handshake.
    pub connect: Duration,
    /// Earliest point at which a completely silent bus is declared dead.
    pub ack: Duration,
    /// Partial-reply recovery checkpoint.
    pub partial: Duration,
    /// Hard deadline for the whole exchange.
    pub total: Duration,
    /// Window for draining retained values after subscribing.
    pub probe: Duration,
}

impl Default for BusTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            ack: Duration::from_secs(3),
            partial: Duration::from_secs(30),
            total: Duration::from_secs(60),
            probe: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Wirenboard device id, e.g. `nevoton-bcg-gw_17`.
    pub device: String,
    pub timeouts: BusTimeouts,
}

impl MqttSettings {
    pub fn new(host: impl Into<String>, port: u16, device: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            device: device.into(),
            timeouts: BusTimeouts::default(),
        }
    }
}

enum ConnSignal {
    Up,
    Down(String),
}

pub struct MqttExchange {
    settings: MqttSettings,
    topics: ControlTopics,
    client: Option<AsyncClient>,
    replies: Option<mpsc::Receiver<Inbound>>,
    pump: Option<JoinHandle<()>>,
    snapshot: EchoSnapshot,
    connected: bool,
}

impl MqttExchange {
    pub fn new(settings: MqttSettings) -> Self {
        let topics = ControlTopics::new(&settings.device);
        Self {
            settings,
            topics,
            client: None,
            replies: None,
            pump: None,
            snapshot: EchoSnapshot::default(),
            connected: false,
        }
    }

    /// Forward broker traffic into the reply channel until the event loop
    /// dies or the engine is shut down.
    async fn pump_events(
        mut eventloop: EventLoop,
        reply_tx: mpsc::Sender<Inbound>,
        conn_tx: mpsc::Sender<ConnSignal>,
    ) {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    let signal = if ack.code == ConnectReturnCode::Success {
                        ConnSignal::Up
                    } else {
                        ConnSignal::Down(format!("broker refused connection: {:?}", ack.code))
                    };
                    let _ = conn_tx.send(signal).await;
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let payload = String::from_utf8_lossy(&publish.payload).to_string();
                    let inbound = Inbound {
                        received_at: Instant::now(),
                        topic: publish.topic.clone(),
                        payload,
                    };
                    if reply_tx.send(inbound).await.is_err() {
                        return;
                    }
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    let _ = conn_tx.send(ConnSignal::Down("broker disconnect".into())).await;
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT event loop error: {}", e);
                    let _ = conn_tx.send(ConnSignal::Down(e.to_string())).await;
                    return;
                }
            }
        }
    }

    /// Pull messages into the echo snapshot for a fixed window. Used right
    /// after subscribing to collect retained control values.
    async fn drain_for(&mut self, window: Duration) {
        let Some(rx) = self.replies.as_mut() else {
            return;
        };
        let mut drained = 0u32;
        let deadline = Instant::now() + window;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            match timeout(left, rx.recv()).await {
                Ok(Some(inbound)) => {
                    let topic = self.topics.classify(&inbound.topic);
                    self.snapshot.record(topic, &inbound.payload);
                    drained += 1;
                }
                Ok(None) | Err(_) => break,
            }
        }
        debug!("Drained {} retained/stale messages", drained);
    }

    /// Discard anything queued from before this exchange, non-blocking.
    fn drain_now(&mut self) -> u32 {
        let Some(rx) = self.replies.as_mut() else {
            return 0;
        };
        let mut dropped = 0u32;
        while let Ok(inbound) = rx.try_recv() {
            warn!(
                "Dropping stale message on {}: {}",
                inbound.topic, inbound.payload
            );
            let topic = self.topics.classify(&inbound.topic);
            self.snapshot.record(topic, &inbound.payload);
            dropped += 1;
        }
        dropped
    }

    async fn shutdown(&mut self) {
        if let Some(client) = self.client.take() {
            let _ = client.disconnect().await;
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.replies = None;
        self.connected = false;
    }
}

#[async_trait::async_trait]
impl ExchangeTransport for MqttExchange {
    async fn connect(&mut self) -> Result<(), LinkError> {
        let client_id = format!("otexplorer-{}-{}", std::process::id(), rand::random::<u32>());
        let mut opts = MqttOptions::new(client_id, self.settings.host.clone(), self.settings.port);
        opts.set_keep_alive(Duration::from_secs(30));
        if let Some(username) = &self.settings.username {
            let password = self.settings.password.clone().unwrap_or_default();
            opts.set_credentials(username.clone(), password);
        }

        let (client, eventloop) = AsyncClient::new(opts, 64);
        let (reply_tx, reply_rx) = mpsc::channel(64);
        let (conn_tx, mut conn_rx) = mpsc::channel(4);
        let pump = tokio::spawn(Self::pump_events(eventloop, reply_tx, conn_tx));

        match timeout(self.settings.timeouts.connect, conn_rx.recv()).await {
            Ok(Some(ConnSignal::Up)) => {
                info!(
                    "Connected to MQTT broker {}:{}",
                    self.settings.host, self.settings.port
                );
            }
            Ok(Some(ConnSignal::Down(reason))) => {
                pump.abort();
                return Err(LinkError::Transport(reason));
            }
            Ok(None) | Err(_) => {
                pump.abort();
                return Err(LinkError::Timeout(format!(
                    "no broker connection within {:?}",
                    self.settings.timeouts.connect
                )));
            }
        }

        for topic in self.topics.all() {
            client.subscribe(topic, QoS::AtLeastOnce).await?;
        }

        self.client = Some(client);
        self.replies = Some(reply_rx);
        self.pump = Some(pump);
        self.connected = true;

        // Retained values prove the driver actually publishes these
        // controls; a silent subscribe means a wrong device id.
        self.drain_for(self.settings.timeouts.probe).await;
        if self.snapshot.command.is_empty()
            && self.snapshot.id.is_empty()
            && self.snapshot.data.is_empty()
        {
            self.shutdown().await;
            return Err(LinkError::Transport(format!(
                "no transparent control topics found for device '{}'",
                self.settings.device
            )));
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.shutdown().await;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn device_id(&self) -> String {
        self.settings.device.clone()
    }

    async fn send(&mut self, request: &ExchangeRequest) -> ExchangeResult {
        if !self.connected {
            return ExchangeResult::InternalError("send on disconnected transport".into());
        }
        let stale = self.drain_now();
        if stale > 0 {
            warn!("Discarded {} stale messages before exchange", stale);
        }
        let Some(client) = self.client.clone() else {
            return ExchangeResult::InternalError("send on disconnected transport".into());
        };

        let writes = [
            (
                self.topics.publish_topic(&self.topics.command),
                request.opcode.command_code().to_string(),
            ),
            (
                self.topics.publish_topic(&self.topics.id),
                request.data_id.to_string(),
            ),
            (
                self.topics.publish_topic(&self.topics.data),
                request.parameter.to_string(),
            ),
        ];
        for (topic, value) in writes {
            debug!("Publishing {} -> {}", topic, value);
            if let Err(e) = client.publish(topic, QoS::AtLeastOnce, false, value).await {
                return ExchangeResult::TransportError(format!("publish failed: {e}"));
            }
        }

        let Some(rx) = self.replies.as_mut() else {
            return ExchangeResult::InternalError("send on disconnected transport".into());
        };
        await_resolution(
            rx,
            &mut self.snapshot,
            &self.topics,
            request,
            &self.settings.timeouts,
        )
        .await
    }
}

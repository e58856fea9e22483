//! Explorer operations on top of an exchange transport
//!
//! Every user-facing command maps to one method here. Methods print their
//! results and report failures as [`OpFailure`] carrying the process exit
//! status.

use colored::Colorize;
use tracing::{debug, warn};

use otlink::{ExchangeRequest, ExchangeResult, ExchangeTransport};
use otproto::msg::Opcode;
use otproto::{describe_param, encode_value, readable_ids, DescribeError, Direction};

const MAX_ATTEMPTS: u32 = 5;

/// Data-id of the TSP index/value register pair.
const DATA_ID_TSP: u8 = 11;
/// Data-id reporting the number of TSPs the slave supports.
const DATA_ID_TSP_COUNT: u8 = 10;
/// Data-id of the fault-history index/value register pair.
const DATA_ID_FHB: u8 = 13;
/// Data-id reporting the fault-history buffer size.
const DATA_ID_FHB_COUNT: u8 = 12;

#[derive(Debug)]
pub struct OpFailure {
    pub code: i32,
    pub message: String,
}

pub type OpResult = Result<(), OpFailure>;

impl OpFailure {
    fn reading(result: &ExchangeResult) -> Self {
        Self::from_result("Reading", result)
    }

    fn writing(result: &ExchangeResult) -> Self {
        Self::from_result("Writing", result)
    }

    fn from_result(op: &str, result: &ExchangeResult) -> Self {
        if let ExchangeResult::OpenthermError { msg_type, .. } = result {
            return Self {
                code: -i32::from(msg_type.code()),
                message: format!("Opentherm error {}", msg_type.name()),
            };
        }
        Self {
            code: result.status_code(),
            message: format!("{op} error: {result}"),
        }
    }

    fn describe(err: &DescribeError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// The sent data-value when the user did not supply one. The status
/// exchange (id 0) expects all master flags raised.
fn default_parameter(data_id: u8) -> u16 {
    if data_id == 0 {
        0xFF00
    } else {
        0
    }
}

fn parse_range(spec: &str) -> Result<(u8, u8), OpFailure> {
    let parse = |s: &str| {
        s.parse::<u8>().map_err(|_| {
            OpFailure::describe(&DescribeError::InvalidNumber(s.to_string()))
        })
    };
    match spec.split_once('-') {
        Some((lo, hi)) => {
            let (lo, hi) = (parse(lo)?, parse(hi)?);
            if lo > hi {
                return Err(OpFailure::describe(&DescribeError::InvalidNumber(
                    spec.to_string(),
                )));
            }
            Ok((lo, hi))
        }
        None => {
            let id = parse(spec)?;
            Ok((id, id))
        }
    }
}

pub struct ExplorerClient {
    transport: Box<dyn ExchangeTransport>,
    pub verbose: bool,
    pub retry: bool,
}

impl ExplorerClient {
    pub fn new(transport: Box<dyn ExchangeTransport>, verbose: bool, retry: bool) -> Self {
        Self {
            transport,
            verbose,
            retry,
        }
    }

    pub fn transport_mut(&mut self) -> &mut dyn ExchangeTransport {
        self.transport.as_mut()
    }

    async fn exchange(&mut self, request: ExchangeRequest) -> ExchangeResult {
        let attempts = if self.retry { MAX_ATTEMPTS } else { 1 };
        let mut result = self.transport.send(&request).await;
        for attempt in 1..attempts {
            if !result.is_retryable() {
                break;
            }
            eprintln!("{}", "Retrying...".yellow());
            debug!(
                "Attempt {} of {} for data-id {}",
                attempt + 1,
                attempts,
                request.data_id
            );
            result = self.transport.send(&request).await;
        }
        result
    }

    /// Print the decoded description of a successful exchange, falling back
    /// to hex/binary when the dictionary cannot decode it. Decode problems
    /// never fail the operation.
    fn print_described(&self, data_id: u8, dir: Direction, sent: u16, received: u16) {
        match describe_param(data_id, dir, sent, received) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                warn!("Cannot decode response for data-id {}: {}", data_id, e);
                println!("{e}");
                println!("In hex: 0x{received:04x} / In binary: {received:016b}");
            }
        }
    }

    /// Read one data-id. `spec` is `<id>` or `<id>/<value>` where the value
    /// uses the dictionary encode language.
    pub async fn read(&mut self, spec: &str) -> OpResult {
        let (id_part, value_part) = match spec.split_once('/') {
            Some((id, value)) => (id, Some(value)),
            None => (spec, None),
        };
        let data_id: u8 = id_part.parse().map_err(|_| {
            OpFailure::describe(&DescribeError::InvalidNumber(id_part.to_string()))
        })?;
        let parameter = match value_part {
            Some(value) => encode_value(value).map_err(|_| {
                OpFailure::describe(&DescribeError::InvalidNumber(value.to_string()))
            })?,
            None => default_parameter(data_id),
        };

        let request = ExchangeRequest::new(Opcode::Read, data_id, parameter);
        match self.exchange(request).await {
            ExchangeResult::Success { msg_type, data } => {
                if self.verbose {
                    println!("Got {} with data 0x{data:04x} ({data})", msg_type.name());
                    self.print_described(data_id, Direction::Read, parameter, data);
                } else {
                    println!("{data_id}: {data}");
                }
                Ok(())
            }
            result => Err(OpFailure::reading(&result)),
        }
    }

    /// Write one data-id; `value` uses the dictionary encode language.
    pub async fn write(&mut self, data_id: u8, value: &str) -> OpResult {
        let parameter = encode_value(value).map_err(|_| {
            OpFailure::describe(&DescribeError::InvalidNumber(value.to_string()))
        })?;

        let request = ExchangeRequest::new(Opcode::Write, data_id, parameter);
        match self.exchange(request).await {
            ExchangeResult::Success { msg_type, data } => {
                if self.verbose {
                    println!("Got {} with data 0x{data:04x} ({data})", msg_type.name());
                    self.print_described(data_id, Direction::Write, parameter, data);
                } else {
                    println!("{data_id}= {parameter}");
                }
                Ok(())
            }
            result => Err(OpFailure::writing(&result)),
        }
    }

    /// Number of entries the slave reports for a counted table (TSP or
    /// fault history): the count lives in the high byte of the response.
    async fn probe_count(&mut self, count_id: u8) -> Result<u8, OpFailure> {
        let request = ExchangeRequest::new(Opcode::Read, count_id, default_parameter(count_id));
        match self.exchange(request).await {
            ExchangeResult::Success { data, .. } => Ok((data >> 8) as u8),
            result => Err(OpFailure::reading(&result)),
        }
    }

    async fn exchange_indexed(&mut self, data_id: u8, index: u8) -> ExchangeResult {
        let request = ExchangeRequest::new(Opcode::Read, data_id, u16::from(index) << 8);
        self.exchange(request).await
    }

    fn print_indexed(&self, data_id: u8, index: u8, data: u16) {
        if self.verbose {
            self.print_described(data_id, Direction::Read, u16::from(index) << 8, data);
        } else if data_id == DATA_ID_TSP {
            println!("TSP{index}: {}", data & 0xff);
        } else {
            println!("FHB{index}: {data}");
        }
    }

    async fn read_indexed(&mut self, data_id: u8, index: u8) -> OpResult {
        match self.exchange_indexed(data_id, index).await {
            ExchangeResult::Success { data, .. } => {
                self.print_indexed(data_id, index, data);
                Ok(())
            }
            result => Err(OpFailure::reading(&result)),
        }
    }

    async fn sweep_indexed(&mut self, data_id: u8, count: u8) -> OpResult {
        for index in 0..count {
            match self.exchange_indexed(data_id, index).await {
                ExchangeResult::Success { data, .. } => {
                    self.print_indexed(data_id, index, data);
                }
                result => {
                    let tag = if data_id == DATA_ID_TSP { "TSP" } else { "FHB" };
                    eprintln!("{}", format!("{tag}{index}: {result}").red());
                    if result.is_fatal_for_batch() {
                        return Err(OpFailure::reading(&result));
                    }
                }
            }
        }
        Ok(())
    }

    /// Read transparent slave parameters: a single index, an `a-b` range, or
    /// every parameter the slave reports when `spec` is absent.
    pub async fn read_tsp(&mut self, spec: Option<&str>) -> OpResult {
        match spec {
            None | Some("-1") | Some("") => {
                let count = self.probe_count(DATA_ID_TSP_COUNT).await?;
                println!("Slave reports {count} transparent parameters");
                self.sweep_indexed(DATA_ID_TSP, count).await
            }
            Some(spec) => {
                let (lo, hi) = parse_range(spec)?;
                if lo == hi {
                    self.read_indexed(DATA_ID_TSP, lo).await
                } else {
                    for index in lo..=hi {
                        match self.exchange_indexed(DATA_ID_TSP, index).await {
                            ExchangeResult::Success { data, .. } => {
                                self.print_indexed(DATA_ID_TSP, index, data);
                            }
                            result => {
                                eprintln!("{}", format!("TSP{index}: {result}").red());
                                if result.is_fatal_for_batch() {
                                    return Err(OpFailure::reading(&result));
                                }
                            }
                        }
                    }
                    Ok(())
                }
            }
        }
    }

    /// Write one transparent slave parameter (index in the high byte, value
    /// in the low byte).
    pub async fn write_tsp(&mut self, index: u8, value: &str) -> OpResult {
        let encoded = encode_value(value).map_err(|_| {
            OpFailure::describe(&DescribeError::InvalidNumber(value.to_string()))
        })?;
        let parameter = (u16::from(index) << 8) | (encoded & 0xff);
        let request = ExchangeRequest::new(Opcode::Write, DATA_ID_TSP, parameter);
        match self.exchange(request).await {
            ExchangeResult::Success { data, .. } => {
                if self.verbose {
                    self.print_described(DATA_ID_TSP, Direction::Write, parameter, data);
                } else {
                    println!("TSP{index}= {}", data & 0xff);
                }
                Ok(())
            }
            result => Err(OpFailure::writing(&result)),
        }
    }

    /// Read the fault-history buffer: one index, or the whole buffer the
    /// slave reports when `spec` is absent.
    pub async fn read_err(&mut self, spec: Option<&str>) -> OpResult {
        match spec {
            None | Some("-1") | Some("") => {
                let count = self.probe_count(DATA_ID_FHB_COUNT).await?;
                println!("Slave reports {count} fault-history entries");
                self.sweep_indexed(DATA_ID_FHB, count).await
            }
            Some(spec) => {
                let index: u8 = spec.parse().map_err(|_| {
                    OpFailure::describe(&DescribeError::InvalidNumber(spec.to_string()))
                })?;
                self.read_indexed(DATA_ID_FHB, index).await
            }
        }
    }

    /// Read every data-id the dictionary marks readable. A successful read
    /// of the TSP count triggers a full TSP sweep, after which the raw TSP
    /// register pair is skipped.
    pub async fn scan(&mut self) -> OpResult {
        let mut tsp_swept = false;
        for key in readable_ids() {
            let Ok(data_id) = key.parse::<u8>() else {
                continue;
            };
            if data_id == DATA_ID_TSP && tsp_swept {
                continue;
            }
            let parameter = default_parameter(data_id);
            let request = ExchangeRequest::new(Opcode::Read, data_id, parameter);
            match self.exchange(request).await {
                ExchangeResult::Success { data, .. } => {
                    if self.verbose {
                        println!("=== data-id {data_id} ===");
                        self.print_described(data_id, Direction::Read, parameter, data);
                    } else {
                        println!("{data_id}: {data}");
                    }
                    if data_id == DATA_ID_TSP_COUNT {
                        let count = (data >> 8) as u8;
                        self.sweep_indexed(DATA_ID_TSP, count).await?;
                        tsp_swept = true;
                    }
                }
                result => {
                    eprintln!("{}", format!("{data_id}: {result}").red());
                    if result.is_fatal_for_batch() {
                        return Err(OpFailure::reading(&result));
                    }
                }
            }
        }
        Ok(())
    }

    /// Try reading every data-id in a range, reporting what answers.
    /// A bare starting id scans from there to 255.
    pub async fn full_scan(&mut self, spec: Option<&str>) -> OpResult {
        let (lo, hi) = match spec {
            Some(spec) if spec.contains('-') => parse_range(spec)?,
            Some(spec) => {
                let lo: u8 = spec.parse().map_err(|_| {
                    OpFailure::describe(&DescribeError::InvalidNumber(spec.to_string()))
                })?;
                (lo, u8::MAX)
            }
            None => (0, u8::MAX),
        };
        for data_id in lo..=hi {
            let parameter = default_parameter(data_id);
            let request = ExchangeRequest::new(Opcode::Read, data_id, parameter);
            match self.exchange(request).await {
                ExchangeResult::Success { data, .. } => {
                    if self.verbose {
                        println!("=== data-id {data_id} ===");
                        self.print_described(data_id, Direction::Read, parameter, data);
                    } else {
                        println!("{data_id}: {data}");
                    }
                }
                result => {
                    eprintln!("{}", format!("{data_id}: {result}").red());
                    if result.is_fatal_for_batch() {
                        return Err(OpFailure::reading(&result));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use otlink::LinkError;
    use otproto::MsgType;

    use super::*;

    struct ScriptedTransport {
        script: VecDeque<ExchangeResult>,
        sent: Arc<Mutex<Vec<ExchangeRequest>>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<ExchangeResult>) -> (Self, Arc<Mutex<Vec<ExchangeRequest>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    script: script.into(),
                    sent: sent.clone(),
                },
                sent,
            )
        }
    }

    #[async_trait]
    impl ExchangeTransport for ScriptedTransport {
        async fn connect(&mut self) -> Result<(), LinkError> {
            Ok(())
        }

        async fn disconnect(&mut self) {}

        fn is_connected(&self) -> bool {
            true
        }

        fn device_id(&self) -> String {
            "scripted".to_string()
        }

        async fn send(&mut self, request: &ExchangeRequest) -> ExchangeResult {
            self.sent.lock().unwrap().push(*request);
            self.script
                .pop_front()
                .unwrap_or(ExchangeResult::Timeout("script exhausted".to_string()))
        }
    }

    fn ok(data: u16) -> ExchangeResult {
        ExchangeResult::Success {
            msg_type: MsgType::ReadAck,
            data,
        }
    }

    #[tokio::test]
    async fn test_read_retries_on_timeout() {
        let (transport, sent) = ScriptedTransport::new(vec![
            ExchangeResult::Timeout("t".into()),
            ExchangeResult::Timeout("t".into()),
            ok(400),
        ]);
        let mut client = ExplorerClient::new(Box::new(transport), false, true);
        client.read("25").await.unwrap();
        assert_eq!(sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_read_no_retry_when_disabled() {
        let (transport, sent) =
            ScriptedTransport::new(vec![ExchangeResult::Timeout("t".into()), ok(400)]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        let failure = client.read("25").await.unwrap_err();
        assert_eq!(failure.code, -5);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_retry_on_protocol_mismatch() {
        let (transport, sent) =
            ScriptedTransport::new(vec![ExchangeResult::ProtocolMismatch("m".into()), ok(400)]);
        let mut client = ExplorerClient::new(Box::new(transport), false, true);
        let failure = client.read("25").await.unwrap_err();
        assert_eq!(failure.code, -3);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_opentherm_error_maps_to_msg_type_code() {
        let (transport, _) = ScriptedTransport::new(vec![
            ExchangeResult::OpenthermError {
                msg_type: MsgType::UnknownDataId,
                data: Some(0),
            };
            5
        ]);
        let mut client = ExplorerClient::new(Box::new(transport), false, true);
        let failure = client.read("99").await.unwrap_err();
        assert_eq!(failure.code, -7);
        assert!(failure.message.contains("UNKNOWN-DATAID"));
    }

    #[tokio::test]
    async fn test_read_with_input_value() {
        let (transport, sent) = ScriptedTransport::new(vec![ok(0x0A)]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        client.read("0/512+256").await.unwrap();
        let requests = sent.lock().unwrap();
        assert_eq!(requests[0].data_id, 0);
        assert_eq!(requests[0].parameter, 768);
    }

    #[tokio::test]
    async fn test_read_status_default_parameter() {
        let (transport, sent) = ScriptedTransport::new(vec![ok(0)]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        client.read("0").await.unwrap();
        assert_eq!(sent.lock().unwrap()[0].parameter, 0xFF00);
    }

    #[tokio::test]
    async fn test_bad_value_is_invalid_number() {
        let (transport, sent) = ScriptedTransport::new(vec![]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        let failure = client.write(1, "10%Q8").await.unwrap_err();
        assert_eq!(failure.code, -1);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tsp_sweep_probes_count_then_reads() {
        // Count probe says 2 entries, then two indexed reads follow.
        let (transport, sent) =
            ScriptedTransport::new(vec![ok(0x0200), ok(0x0005), ok(0x0107)]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        client.read_tsp(None).await.unwrap();
        let requests = sent.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].data_id, DATA_ID_TSP_COUNT);
        assert_eq!(requests[1].data_id, DATA_ID_TSP);
        assert_eq!(requests[1].parameter, 0x0000);
        assert_eq!(requests[2].parameter, 0x0100);
    }

    #[tokio::test]
    async fn test_fhb_sweep_covers_every_entry() {
        let (transport, sent) = ScriptedTransport::new(vec![
            ok(0x0300),
            ok(0x0001),
            ok(0x0102),
            ok(0x0203),
        ]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        client.read_err(None).await.unwrap();
        let requests = sent.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[0].data_id, DATA_ID_FHB_COUNT);
        assert!(requests[1..].iter().all(|r| r.data_id == DATA_ID_FHB));
        assert_eq!(requests[3].parameter, 0x0200);
    }

    #[tokio::test]
    async fn test_full_scan_aborts_on_transport_error() {
        let (transport, sent) = ScriptedTransport::new(vec![
            ok(1),
            ExchangeResult::OpenthermError {
                msg_type: MsgType::UnknownDataId,
                data: Some(0),
            },
            ExchangeResult::TransportError("gone".into()),
        ]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        let failure = client.full_scan(Some("0-9")).await.unwrap_err();
        assert_eq!(failure.code, -7);
        // One success, one tolerated error, one fatal abort.
        assert_eq!(sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_write_tsp_packs_index_and_value() {
        let (transport, sent) = ScriptedTransport::new(vec![ExchangeResult::Success {
            msg_type: MsgType::WriteAck,
            data: 0x0307,
        }]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        client.write_tsp(3, "7").await.unwrap();
        let requests = sent.lock().unwrap();
        assert_eq!(requests[0].data_id, DATA_ID_TSP);
        assert_eq!(requests[0].parameter, 0x0307);
    }

    #[tokio::test]
    async fn test_full_scan_bare_start_runs_to_end() {
        // "250" means 250..=255, not a single id.
        let (transport, sent) = ScriptedTransport::new(vec![ok(1); 6]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        client.full_scan(Some("250")).await.unwrap();
        let requests = sent.lock().unwrap();
        assert_eq!(requests.len(), 6);
        assert_eq!(requests[0].data_id, 250);
        assert_eq!(requests[5].data_id, 255);
    }

    #[tokio::test]
    async fn test_full_scan_tolerates_protocol_mismatch() {
        let (transport, sent) = ScriptedTransport::new(vec![
            ok(1),
            ExchangeResult::ProtocolMismatch("odd".into()),
            ok(2),
        ]);
        let mut client = ExplorerClient::new(Box::new(transport), false, false);
        client.full_scan(Some("0-2")).await.unwrap();
        assert_eq!(sent.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("5").unwrap(), (5, 5));
        assert_eq!(parse_range("3-9").unwrap(), (3, 9));
        assert!(parse_range("9-3").is_err());
        assert!(parse_range("x").is_err());
    }
}

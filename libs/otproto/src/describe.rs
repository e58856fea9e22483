//! Human-readable request/response decoding
//!
//! Turns a raw exchange (data-id, direction, sent and received words) into
//! the multi-line text an operator reads: per-sub-field flags for bitfields,
//! conditional clause descriptions, units, range checks and vendor names.

use thiserror::Error;
use tracing::debug;

use crate::codec::{decode_value, CodecError, DataFormat};
use crate::dictionary::{lookup, member_name, DataPoint};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescribeError {
    #[error("value '{0}' is not a number")]
    InvalidNumber(String),

    #[error("unable to decode value '{value}' as per fmt {fmt} from pos '{pos}'")]
    Undecodable {
        value: u16,
        fmt: String,
        pos: String,
    },

    #[error("data-id {0} is unknown")]
    UnknownDataId(String),

    #[error("data-id {id}/{dir} is unknown")]
    UnknownDirection { id: String, dir: char },
}

impl DescribeError {
    /// Status code for process exit mapping: -1 invalid numeric input,
    /// -2 undecodable value, -3 unknown id or direction.
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidNumber(_) => -1,
            Self::Undecodable { .. } => -2,
            Self::UnknownDataId(_) | Self::UnknownDirection { .. } => -3,
        }
    }
}

/// Transfer direction of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    fn letter(self) -> char {
        match self {
            Self::Read => 'R',
            Self::Write => 'W',
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Read => "R",
            Self::Write => "W",
        }
    }
}

/// Resolve a `;`-separated conditional description against a decoded value.
///
/// Each clause is `<op><threshold> <text>` with ops ==, !=, >=, <=, >, <;
/// the first matching clause wins. Descriptions without `;` pass through.
pub fn decode_descr(descr: &str, value: &str) -> String {
    if !descr.contains(';') {
        return descr.to_string();
    }
    let Ok(v) = value.parse::<f64>() else {
        return format!("unknown value {value}");
    };
    for clause in descr.split(';') {
        if let Some((cond, text)) = clause.trim().split_once(' ') {
            if eval_condition(cond, v) == Some(true) {
                return text.to_string();
            }
        }
    }
    debug!(value, descr, "no conditional clause matched");
    format!("unknown value {value}")
}

fn eval_condition(cond: &str, v: f64) -> Option<bool> {
    let (rest, matched) = if let Some(t) = cond.strip_prefix("==") {
        (t, f64::eq as fn(&f64, &f64) -> bool)
    } else if let Some(t) = cond.strip_prefix("!=") {
        (t, f64::ne as fn(&f64, &f64) -> bool)
    } else if let Some(t) = cond.strip_prefix(">=") {
        (t, f64::ge as fn(&f64, &f64) -> bool)
    } else if let Some(t) = cond.strip_prefix("<=") {
        (t, f64::le as fn(&f64, &f64) -> bool)
    } else if let Some(t) = cond.strip_prefix('>') {
        (t, f64::gt as fn(&f64, &f64) -> bool)
    } else if let Some(t) = cond.strip_prefix('<') {
        (t, f64::lt as fn(&f64, &f64) -> bool)
    } else {
        return None;
    };
    let threshold: f64 = rest.parse().ok()?;
    Some(matched(&v, &threshold))
}

const SUBFIELDS: [&str; 18] = [
    "HB", "HB0", "HB1", "HB2", "HB3", "HB4", "HB5", "HB6", "HB7", "LB", "LB0", "LB1", "LB2",
    "LB3", "LB4", "LB5", "LB6", "LB7",
];

/// Sub-fields whose value is a vendor member-id.
const MEMBER_SUBFIELDS: [&str; 4] = ["002:LB", "003:LB", "074:LB", "103:LB"];

fn undecodable(value: u16, dp: &DataPoint, _err: CodecError) -> DescribeError {
    DescribeError::Undecodable {
        value,
        fmt: dp.fmt.to_string(),
        pos: dp.pos.to_string(),
    }
}

fn out_of_range(dp: &DataPoint, decoded: &str) -> bool {
    decoded
        .parse::<f64>()
        .map(|v| v < dp.min || v > dp.max)
        .unwrap_or(false)
}

/// Describe a raw data-value via a direct dictionary key.
///
/// Bitfield entries iterate their present sub-fields: single bits render as
/// `+`/`-` flags, multi-bit ranges as `<descr> = <value><units>` with an
/// out-of-range marker; member-id sub-fields append the vendor name.
pub fn describe_data_id(key: &str, raw: u16) -> Result<String, DescribeError> {
    let dp = lookup(key).ok_or_else(|| DescribeError::UnknownDataId(key.to_string()))?;
    if dp.fmt != DataFormat::Bf {
        let v = decode_value(raw, dp.fmt, dp.pos).map_err(|e| undecodable(raw, dp, e))?;
        let mut out = format!("{}\n {}{}", decode_descr(dp.descr, &v), v, dp.units);
        if out_of_range(dp, &v) {
            out.push_str(" - out of range!");
        }
        return Ok(out);
    }

    let mut out = dp.descr.to_string();
    for variant in SUBFIELDS {
        let varid = format!("{key}:{variant}");
        let Some(sub) = lookup(&varid) else {
            continue;
        };
        let v = decode_value(raw, sub.fmt, sub.pos).map_err(|e| undecodable(raw, sub, e))?;
        if sub.pos.contains('-') {
            // multi-bit field
            out.push_str(&format!(
                "\n {} = {}{}",
                decode_descr(sub.descr, &v),
                v,
                sub.units
            ));
            if out_of_range(sub, &v) {
                out.push_str(" - out of range!");
            }
        } else {
            out.push_str(&format!(
                "\n {}{}",
                if v == "1" { "+" } else { "-" },
                sub.descr
            ));
        }
        if MEMBER_SUBFIELDS.contains(&varid.as_str()) {
            if let Ok(member) = v.parse::<u8>() {
                out.push_str(&format!(" ({})", member_name(member)));
            }
        }
    }
    Ok(out)
}

/// Describe a full exchange: the most generic request/response decoder.
///
/// Read-write ids are re-queried with the direction suffix and prefixed with
/// the base description. A read of an id carrying the "I" modifier also
/// describes the sent input word; a write of an id carrying the "O" modifier
/// also describes the received output word.
pub fn describe_param(
    data_id: u8,
    dir: Direction,
    sent: u16,
    received: u16,
) -> Result<String, DescribeError> {
    let dids = format!("{data_id:03}");
    let base = lookup(&dids).ok_or_else(|| DescribeError::UnknownDataId(dids.clone()))?;
    if base.dir == "RW" {
        let keyed = format!("{dids}{}", dir.suffix());
        let body = describe_keyed(&keyed, dir, sent, received)?;
        return Ok(format!("{}: {}", base.descr, body));
    }
    describe_keyed(&dids, dir, sent, received)
}

fn describe_keyed(
    key: &str,
    dir: Direction,
    sent: u16,
    received: u16,
) -> Result<String, DescribeError> {
    let dp = lookup(key).ok_or_else(|| DescribeError::UnknownDataId(key.to_string()))?;
    if !dp.dir.contains(dir.letter()) {
        return Err(DescribeError::UnknownDirection {
            id: key.to_string(),
            dir: dir.letter(),
        });
    }
    let mut out = String::new();
    match dir {
        Direction::Read => {
            if dp.dir.contains('I') {
                out.push_str("Read input value:\n");
                out.push_str(&describe_data_id(&format!("{key}I"), sent)?);
                out.push('\n');
            }
            out.push_str("Response:\n");
            out.push_str(&describe_data_id(key, received)?);
        }
        Direction::Write => {
            out.push_str("Written:\n");
            out.push_str(&describe_data_id(key, sent)?);
            out.push('\n');
            if dp.dir.contains('O') {
                out.push_str("Write output value:\n");
                out.push_str(&describe_data_id(&format!("{key}I"), received)?);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_descr_plain() {
        assert_eq!(decode_descr("Boiler faults", "3"), "Boiler faults");
    }

    #[test]
    fn test_decode_descr_conditionals() {
        let d = "==1 Boiler Lockout-reset;==10 Service request reset;==2 Request Water filling";
        assert_eq!(decode_descr(d, "1"), "Boiler Lockout-reset");
        assert_eq!(decode_descr(d, "10"), "Service request reset");
        assert_eq!(decode_descr(d, "2"), "Request Water filling");
        assert_eq!(decode_descr(d, "5"), "unknown value 5");

        let d = ">127 response ok;<128 response error";
        assert_eq!(decode_descr(d, "200"), "response ok");
        assert_eq!(decode_descr(d, "0"), "response error");
    }

    #[test]
    fn test_decode_descr_non_numeric_value() {
        assert_eq!(decode_descr("==1 on;==0 off", "x"), "unknown value x");
    }

    #[test]
    fn test_describe_flow_temperature() {
        // id 25 is read-only F8.8: 1024 raw = 4.0
        let text = describe_param(25, Direction::Read, 0, 1024).unwrap();
        assert!(text.contains("Boiler flow water temperature"));
        assert!(text.contains("\n 4°C"));
        assert!(!text.contains("out of range"));
    }

    #[test]
    fn test_describe_out_of_range() {
        // 0x9C00 as F8.8 = -100, below the -40 floor of id 25
        let text = describe_param(25, Direction::Read, 0, 0x9C00).unwrap();
        assert!(text.contains("out of range!"));
    }

    #[test]
    fn test_describe_status_bitfield_with_input_word() {
        // id 0 carries the "I" modifier: the sent word is described too.
        // sent 0xFF00 = all master flags set, received 0x0A = CH mode + flame
        let text = describe_param(0, Direction::Read, 0xFF00, 0x000A).unwrap();
        assert!(text.starts_with("Read input value:\n"));
        assert!(text.contains("+Master status: CH enable"));
        assert!(text.contains("Response:\n"));
        assert!(text.contains("+Slave Status: CH mode"));
        assert!(text.contains("+Slave Status: Flame on"));
        assert!(text.contains("-Slave Status: Fault"));
    }

    #[test]
    fn test_describe_member_id() {
        // id 3, member code 27 in the low byte
        let text = describe_param(3, Direction::Read, 0, 27).unwrap();
        assert!(text.contains("MemberId code = 27 (Baxi)"));
    }

    #[test]
    fn test_describe_rw_direction_resolution() {
        let r = describe_param(1, Direction::Read, 0, 0x0190).unwrap();
        assert!(r.starts_with("CH water temperature Setpoint: "));
        assert!(r.contains("1.562"));
        let w = describe_param(1, Direction::Write, 0x0190, 0).unwrap();
        assert!(w.contains("Written:\n"));
    }

    #[test]
    fn test_describe_unknown_id_and_direction() {
        let e = describe_param(47, Direction::Read, 0, 0).unwrap_err();
        assert_eq!(e.code(), -3);
        // id 7 is write-only
        let e = describe_param(7, Direction::Read, 0, 0).unwrap_err();
        assert_eq!(e.code(), -3);
    }

    #[test]
    fn test_describe_undecodable() {
        // id 71 has no format at all
        let e = describe_data_id("071", 1).unwrap_err();
        assert_eq!(e.code(), -2);
    }

    #[test]
    fn test_describe_tsp_entry() {
        let text = describe_param(11, Direction::Read, 3 << 8, (3 << 8) | 42).unwrap();
        assert!(text.contains("Index of read transparent slave parameter = 3"));
        assert!(text.contains("Value of read transparent slave parameter = 42"));
    }
}

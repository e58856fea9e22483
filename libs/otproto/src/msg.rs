//! OpenTherm message types
//!
//! The gateway exposes the 3-bit msg-type field of each OpenTherm frame as a
//! small integer; both transports report it verbatim.

use std::fmt;

/// Master-to-slave and slave-to-master message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MsgType {
    ReadData = 0,
    WriteData = 1,
    InvalidData = 2,
    Reserved = 3,
    ReadAck = 4,
    WriteAck = 5,
    DataInvalid = 6,
    UnknownDataId = 7,
}

impl MsgType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::ReadData),
            1 => Some(Self::WriteData),
            2 => Some(Self::InvalidData),
            3 => Some(Self::Reserved),
            4 => Some(Self::ReadAck),
            5 => Some(Self::WriteAck),
            6 => Some(Self::DataInvalid),
            7 => Some(Self::UnknownDataId),
            _ => None,
        }
    }

    /// Slave-side error responses (the exchange itself completed).
    pub fn is_error(self) -> bool {
        matches!(self, Self::DataInvalid | Self::UnknownDataId)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ReadData => "READ-DATA",
            Self::WriteData => "WRITE-DATA",
            Self::InvalidData => "INVALID-DATA",
            Self::Reserved => "OT-RESERVED",
            Self::ReadAck => "READ-ACK",
            Self::WriteAck => "WRITE-ACK",
            Self::DataInvalid => "DATA-INVALID",
            Self::UnknownDataId => "UNKNOWN-DATAID",
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describe a raw msg-type code without requiring a valid enum value.
pub fn msg_descr(code: u16) -> &'static str {
    match u8::try_from(code).ok().and_then(MsgType::from_code) {
        Some(m) => m.name(),
        None => "!LAME!",
    }
}

/// Gateway command opcodes for the transparent-control interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Read,
    Write,
}

impl Opcode {
    /// Command word written to the gateway (register 209 / "TR Command").
    pub fn command_code(self) -> u8 {
        match self {
            Self::Read => 2,
            Self::Write => 3,
        }
    }

    /// The msg-type that acknowledges this opcode.
    pub fn ack(self) -> MsgType {
        match self {
            Self::Read => MsgType::ReadAck,
            Self::Write => MsgType::WriteAck,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_codes_roundtrip() {
        for code in 0..=7u8 {
            let m = MsgType::from_code(code).unwrap();
            assert_eq!(m.code(), code);
        }
        assert!(MsgType::from_code(8).is_none());
    }

    #[test]
    fn test_msg_descr_out_of_range() {
        assert_eq!(msg_descr(4), "READ-ACK");
        assert_eq!(msg_descr(7), "UNKNOWN-DATAID");
        assert_eq!(msg_descr(300), "!LAME!");
    }

    #[test]
    fn test_opcode_acks() {
        assert_eq!(Opcode::Read.command_code(), 2);
        assert_eq!(Opcode::Write.command_code(), 3);
        assert_eq!(Opcode::Read.ack(), MsgType::ReadAck);
        assert_eq!(Opcode::Write.ack(), MsgType::WriteAck);
    }
}

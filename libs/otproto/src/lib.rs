//! OpenTherm protocol data model
//!
//! Message-type constants, the 16-bit data-value codec, the compiled-in
//! data-id dictionary and the human-readable response decoder. This crate is
//! transport-agnostic: it never talks to a gateway, it only turns raw words
//! into text and back.

pub mod codec;
pub mod describe;
pub mod dictionary;
pub mod msg;

pub use codec::{decode_value, encode_value, CodecError, DataFormat};
pub use describe::{describe_data_id, describe_param, DescribeError, Direction};
pub use dictionary::{lookup, member_name, readable_ids, DataPoint};
pub use msg::MsgType;

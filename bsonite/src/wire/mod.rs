//! Legacy wire protocol framing.
//!
//! Supports the request opcodes a test double needs (`OP_QUERY`,
//! `OP_INSERT`, `OP_DELETE`, `OP_UPDATE`) and `OP_REPLY` for answers.
//! Documents travel as BSON and are converted to and from [Document](crate::collection::Document).

mod codec;
mod convert;
mod header;
mod message;

pub use codec::WireCodec;
pub use convert::{from_bson, from_bson_document, to_bson, to_bson_document};
pub use header::{MessageHeader, OpCode, HEADER_LENGTH, REPLY_HEADER_LENGTH};
pub use message::*;

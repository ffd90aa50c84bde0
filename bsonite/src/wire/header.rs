use bytes::{Buf, BufMut, BytesMut};

/// Size of the standard message header.
pub const HEADER_LENGTH: usize = 16;

/// Size of an `OP_REPLY` header: the standard header plus response flags,
/// cursor id, starting position and document count.
pub const REPLY_HEADER_LENGTH: usize = 36;

/// Legacy operation codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    Reply,
    Update,
    Insert,
    Query,
    Delete,
    /// Any code this codec does not decode.
    Other(i32),
}

impl From<i32> for OpCode {
    fn from(code: i32) -> Self {
        match code {
            1 => OpCode::Reply,
            2001 => OpCode::Update,
            2002 => OpCode::Insert,
            2004 => OpCode::Query,
            2006 => OpCode::Delete,
            other => OpCode::Other(other),
        }
    }
}

impl From<OpCode> for i32 {
    fn from(op_code: OpCode) -> Self {
        match op_code {
            OpCode::Reply => 1,
            OpCode::Update => 2001,
            OpCode::Insert => 2002,
            OpCode::Query => 2004,
            OpCode::Delete => 2006,
            OpCode::Other(code) => code,
        }
    }
}

/// The 16-byte header in front of every message. All fields are
/// little-endian int32 on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    pub message_length: i32,
    pub request_id: i32,
    pub response_to: i32,
    pub op_code: OpCode,
}

impl MessageHeader {
    pub fn new(request_id: i32, response_to: i32, op_code: OpCode) -> Self {
        MessageHeader {
            message_length: 0,
            request_id,
            response_to,
            op_code,
        }
    }

    /// Reads a header. The caller checks that 16 bytes are available.
    pub(crate) fn read(buf: &mut impl Buf) -> Self {
        MessageHeader {
            message_length: buf.get_i32_le(),
            request_id: buf.get_i32_le(),
            response_to: buf.get_i32_le(),
            op_code: OpCode::from(buf.get_i32_le()),
        }
    }

    pub(crate) fn write(&self, buf: &mut BytesMut) {
        buf.put_i32_le(self.message_length);
        buf.put_i32_le(self.request_id);
        buf.put_i32_le(self.response_to);
        buf.put_i32_le(i32::from(self.op_code));
    }
}

/// Peeks the declared length of the message at the start of `buf`.
pub(crate) fn peek_length(buf: &[u8]) -> Option<i32> {
    let bytes: [u8; 4] = buf.get(..4)?.try_into().ok()?;
    Some(i32::from_le_bytes(bytes))
}

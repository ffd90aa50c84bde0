use bytes::{Buf, BufMut, BytesMut};

use crate::collection::Document;
use crate::common::DEFAULT_MAX_MESSAGE_SIZE;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

use super::convert::{from_bson_document, to_bson_document};
use super::header::{peek_length, MessageHeader, OpCode, HEADER_LENGTH, REPLY_HEADER_LENGTH};
use super::message::{
    DeleteMessage, InsertMessage, Namespace, QueryMessage, Reply, Request, RequestMessage,
    UpdateMessage,
};

/// Encoder and decoder for the legacy request/reply framing.
///
/// Decoding is incremental: a buffer holding a partial message yields
/// `Ok(None)` and can be retried once more bytes arrive. A buffer holding
/// several messages is consumed one message at a time.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::wire::{Reply, WireCodec};
///
/// let codec = WireCodec::default();
/// while let Some((message, consumed)) = codec.decode(&buffer)? {
///     buffer.advance(consumed);
///     let bytes = codec.encode_reply(next_id(), message.header.request_id, &Reply::new(docs))?;
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireCodec {
    max_message_size: usize,
}

impl Default for WireCodec {
    fn default() -> Self {
        WireCodec::new(DEFAULT_MAX_MESSAGE_SIZE)
    }
}

impl WireCodec {
    pub fn new(max_message_size: usize) -> Self {
        WireCodec { max_message_size }
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Decodes the request at the start of `src`.
    ///
    /// Returns the request and the number of bytes it occupied, or `None`
    /// when `src` does not hold a complete message yet.
    pub fn decode(&self, src: &[u8]) -> BsoniteResult<Option<(RequestMessage, usize)>> {
        let Some(length) = self.complete_length(src)? else {
            return Ok(None);
        };

        let mut buf = &src[..length];
        let header = MessageHeader::read(&mut buf);
        log::trace!(
            "Decoding {:?} request {} of {} bytes",
            header.op_code,
            header.request_id,
            length
        );

        let mut body = BodyReader::new(buf);
        let request = match header.op_code {
            OpCode::Query => Request::Query(decode_query(&mut body)?),
            OpCode::Insert => Request::Insert(decode_insert(&mut body)?),
            OpCode::Delete => Request::Delete(decode_delete(&mut body)?),
            OpCode::Update => Request::Update(decode_update(&mut body)?),
            other => {
                log::warn!("Skipping message with unsupported opcode {:?}", other);
                return Ok(Some((
                    RequestMessage {
                        header,
                        request: Request::Unsupported {
                            op_code: i32::from(other),
                        },
                    },
                    length,
                )));
            }
        };
        body.finish()?;

        Ok(Some((RequestMessage { header, request }, length)))
    }

    /// Decodes one request from `buf` and advances past it.
    pub fn decode_buf(&self, buf: &mut BytesMut) -> BsoniteResult<Option<RequestMessage>> {
        match self.decode(buf)? {
            Some((message, consumed)) => {
                buf.advance(consumed);
                Ok(Some(message))
            }
            None => Ok(None),
        }
    }

    /// Encodes an `OP_REPLY` answering `response_to`.
    pub fn encode_reply(&self, request_id: i32, response_to: i32, reply: &Reply) -> BsoniteResult<BytesMut> {
        let mut buf = BytesMut::with_capacity(REPLY_HEADER_LENGTH);
        MessageHeader::new(request_id, response_to, OpCode::Reply).write(&mut buf);
        buf.put_i32_le(reply.response_flags);
        buf.put_i64_le(reply.cursor_id);
        buf.put_i32_le(reply.starting_from);
        buf.put_i32_le(reply.number_returned());
        for doc in &reply.documents {
            write_document(&mut buf, doc)?;
        }
        patch_length(&mut buf);
        Ok(buf)
    }

    /// Decodes an `OP_REPLY`, as a driver would.
    pub fn decode_reply(&self, src: &[u8]) -> BsoniteResult<Option<(MessageHeader, Reply, usize)>> {
        let Some(length) = self.complete_length(src)? else {
            return Ok(None);
        };

        let mut buf = &src[..length];
        let header = MessageHeader::read(&mut buf);
        if header.op_code != OpCode::Reply {
            log::error!("Expected a reply but found {:?}", header.op_code);
            return Err(BsoniteError::new(
                &format!("expected OP_REPLY but found opcode {}", i32::from(header.op_code)),
                ErrorKind::EncodingError,
            ));
        }

        let mut body = BodyReader::new(buf);
        let response_flags = body.read_i32()?;
        let cursor_id = body.read_i64()?;
        let starting_from = body.read_i32()?;
        let number_returned = body.read_i32()?;
        let mut documents = Vec::new();
        for _ in 0..number_returned {
            documents.push(body.read_document()?);
        }
        body.finish()?;

        let reply = Reply {
            response_flags,
            cursor_id,
            starting_from,
            documents,
        };
        Ok(Some((header, reply, length)))
    }

    /// Encodes a request, as a driver would.
    pub fn encode_request(&self, request_id: i32, request: &Request) -> BsoniteResult<BytesMut> {
        let op_code = match request {
            Request::Query(_) => OpCode::Query,
            Request::Insert(_) => OpCode::Insert,
            Request::Delete(_) => OpCode::Delete,
            Request::Update(_) => OpCode::Update,
            Request::Unsupported { op_code } => OpCode::Other(*op_code),
        };

        let mut buf = BytesMut::with_capacity(HEADER_LENGTH);
        MessageHeader::new(request_id, 0, op_code).write(&mut buf);
        match request {
            Request::Query(message) => {
                buf.put_i32_le(message.flags);
                write_cstring(&mut buf, &message.namespace.full_name());
                buf.put_i32_le(message.skip);
                buf.put_i32_le(message.number_to_return);
                write_document(&mut buf, &message.query)?;
                if let Some(fields) = &message.return_fields {
                    write_document(&mut buf, fields)?;
                }
            }
            Request::Insert(message) => {
                buf.put_i32_le(message.flags);
                write_cstring(&mut buf, &message.namespace.full_name());
                for doc in &message.documents {
                    write_document(&mut buf, doc)?;
                }
            }
            Request::Delete(message) => {
                write_cstring(&mut buf, &message.namespace.full_name());
                buf.put_i32_le(0);
                buf.put_i32_le(message.flags);
                write_document(&mut buf, &message.selector)?;
            }
            Request::Update(message) => {
                write_cstring(&mut buf, &message.namespace.full_name());
                buf.put_i32_le(0);
                buf.put_i32_le(message.flags);
                write_document(&mut buf, &message.selector)?;
                write_document(&mut buf, &message.update)?;
            }
            Request::Unsupported { .. } => {}
        }
        patch_length(&mut buf);
        Ok(buf)
    }

    /// The length of the complete message at the start of `src`, if any.
    fn complete_length(&self, src: &[u8]) -> BsoniteResult<Option<usize>> {
        let Some(declared) = peek_length(src) else {
            return Ok(None);
        };

        if declared < HEADER_LENGTH as i32 {
            log::error!("Message length {} is shorter than the header", declared);
            return Err(BsoniteError::new(
                &format!("message length {} is shorter than the header", declared),
                ErrorKind::EncodingError,
            ));
        }
        let length = declared as usize;
        if length > self.max_message_size {
            log::error!("Message of {} bytes exceeds limit of {}", length, self.max_message_size);
            return Err(BsoniteError::new(
                &format!(
                    "message of {} bytes exceeds the maximum of {} bytes",
                    length, self.max_message_size
                ),
                ErrorKind::EncodingError,
            ));
        }

        if src.len() < length {
            Ok(None)
        } else {
            Ok(Some(length))
        }
    }
}

fn decode_query(body: &mut BodyReader) -> BsoniteResult<QueryMessage> {
    let flags = body.read_i32()?;
    let namespace = Namespace::parse(&body.read_cstring()?)?;
    let skip = body.read_i32()?;
    let number_to_return = body.read_i32()?;
    let query = body.read_document()?;
    let return_fields = if body.has_remaining() {
        Some(body.read_document()?)
    } else {
        None
    };
    Ok(QueryMessage {
        flags,
        namespace,
        skip,
        number_to_return,
        query,
        return_fields,
    })
}

fn decode_insert(body: &mut BodyReader) -> BsoniteResult<InsertMessage> {
    let flags = body.read_i32()?;
    let namespace = Namespace::parse(&body.read_cstring()?)?;
    let mut documents = Vec::new();
    while body.has_remaining() {
        documents.push(body.read_document()?);
    }
    if documents.is_empty() {
        log::error!("Insert into {} carries no documents", namespace);
        return Err(BsoniteError::new(
            "insert message carries no documents",
            ErrorKind::EncodingError,
        ));
    }
    Ok(InsertMessage {
        flags,
        namespace,
        documents,
    })
}

fn decode_delete(body: &mut BodyReader) -> BsoniteResult<DeleteMessage> {
    let namespace = Namespace::parse(&body.read_cstring()?)?;
    let _reserved = body.read_i32()?;
    let flags = body.read_i32()?;
    let selector = body.read_document()?;
    Ok(DeleteMessage {
        namespace,
        flags,
        selector,
    })
}

fn decode_update(body: &mut BodyReader) -> BsoniteResult<UpdateMessage> {
    let namespace = Namespace::parse(&body.read_cstring()?)?;
    let _reserved = body.read_i32()?;
    let flags = body.read_i32()?;
    let selector = body.read_document()?;
    let update = body.read_document()?;
    Ok(UpdateMessage {
        namespace,
        flags,
        selector,
        update,
    })
}

fn write_cstring(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
}

fn write_document(buf: &mut BytesMut, doc: &Document) -> BsoniteResult<()> {
    let mut bytes = Vec::new();
    to_bson_document(doc).to_writer(&mut bytes)?;
    buf.extend_from_slice(&bytes);
    Ok(())
}

fn patch_length(buf: &mut BytesMut) {
    let length = buf.len() as i32;
    buf[..4].copy_from_slice(&length.to_le_bytes());
}

/// Bounds-checked reads over a message body.
struct BodyReader<'a> {
    buf: &'a [u8],
}

impl<'a> BodyReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        BodyReader { buf }
    }

    fn has_remaining(&self) -> bool {
        self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize, what: &str) -> BsoniteResult<()> {
        if self.buf.remaining() < needed {
            log::error!("Message body ends inside {}", what);
            return Err(BsoniteError::new(
                &format!("message body ends inside {}", what),
                ErrorKind::EncodingError,
            ));
        }
        Ok(())
    }

    fn read_i32(&mut self) -> BsoniteResult<i32> {
        self.ensure(4, "an int32")?;
        Ok(self.buf.get_i32_le())
    }

    fn read_i64(&mut self) -> BsoniteResult<i64> {
        self.ensure(8, "an int64")?;
        Ok(self.buf.get_i64_le())
    }

    fn read_cstring(&mut self) -> BsoniteResult<String> {
        let Some(end) = self.buf.iter().position(|b| *b == 0) else {
            log::error!("Unterminated cstring in message body");
            return Err(BsoniteError::new(
                "unterminated cstring in message body",
                ErrorKind::EncodingError,
            ));
        };
        let value = String::from_utf8(self.buf[..end].to_vec())?;
        self.buf.advance(end + 1);
        Ok(value)
    }

    fn read_document(&mut self) -> BsoniteResult<Document> {
        self.ensure(4, "a document length")?;
        let declared = i32::from_le_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]);
        if declared < 5 {
            log::error!("Invalid BSON document length {}", declared);
            return Err(BsoniteError::new(
                &format!("invalid BSON document length {}", declared),
                ErrorKind::EncodingError,
            ));
        }
        let length = declared as usize;
        self.ensure(length, "a document")?;

        let mut raw = &self.buf[..length];
        let doc = bson::Document::from_reader(&mut raw)?;
        self.buf.advance(length);
        from_bson_document(&doc)
    }

    fn finish(&self) -> BsoniteResult<()> {
        if self.has_remaining() {
            log::error!("{} unexpected trailing bytes in message", self.buf.remaining());
            return Err(BsoniteError::new(
                &format!("{} unexpected trailing bytes in message", self.buf.remaining()),
                ErrorKind::EncodingError,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn codec() -> WireCodec {
        WireCodec::default()
    }

    fn query(query: Document, return_fields: Option<Document>) -> Request {
        Request::Query(QueryMessage {
            flags: 1 << 2,
            namespace: Namespace::new("test", "users"),
            skip: 2,
            number_to_return: 10,
            query,
            return_fields,
        })
    }

    #[test]
    fn query_round_trip() {
        let request = query(doc! { age: { "$gt": 5 } }, Some(doc! { name: 1 }));
        let bytes = codec().encode_request(42, &request).unwrap();

        let (message, consumed) = codec().decode(&bytes).unwrap().unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(message.header.request_id, 42);
        assert_eq!(message.header.message_length as usize, bytes.len());
        assert_eq!(message.request, request);
    }

    #[test]
    fn query_without_return_fields() {
        let request = query(doc! {}, None);
        let bytes = codec().encode_request(1, &request).unwrap();
        let (message, _) = codec().decode(&bytes).unwrap().unwrap();
        assert_eq!(message.request, request);
    }

    #[test]
    fn insert_delete_update_layouts() {
        let requests = vec![
            Request::Insert(InsertMessage {
                flags: 1 << 1,
                namespace: Namespace::new("db", "c"),
                documents: vec![doc! { a: 1 }, doc! { a: 2 }],
            }),
            Request::Delete(DeleteMessage {
                namespace: Namespace::new("db", "c"),
                flags: 1 << 1,
                selector: doc! { a: 1 },
            }),
            Request::Update(UpdateMessage {
                namespace: Namespace::new("db", "c"),
                flags: 3,
                selector: doc! { a: 1 },
                update: doc! { "$set": { b: 2 } },
            }),
        ];
        for request in requests {
            let bytes = codec().encode_request(9, &request).unwrap();
            let (message, _) = codec().decode(&bytes).unwrap().unwrap();
            assert_eq!(message.request, request);
        }
    }

    #[test]
    fn delete_namespace_precedes_reserved_word() {
        let request = Request::Delete(DeleteMessage {
            namespace: Namespace::new("db", "c"),
            flags: 1 << 1,
            selector: doc! {},
        });
        let bytes = codec().encode_request(1, &request).unwrap();
        assert_eq!(&bytes[16..21], b"db.c\0");
        assert_eq!(&bytes[21..25], &[0, 0, 0, 0]);
        assert_eq!(&bytes[25..29], &[2, 0, 0, 0]);

        let (message, _) = codec().decode(&bytes).unwrap().unwrap();
        let Request::Delete(delete) = message.request else {
            panic!("expected a delete");
        };
        assert!(delete.single_remove());
    }

    #[test]
    fn update_namespace_precedes_reserved_word() {
        let request = Request::Update(UpdateMessage {
            namespace: Namespace::new("db", "c"),
            flags: 1,
            selector: doc! {},
            update: doc! {},
        });
        let bytes = codec().encode_request(1, &request).unwrap();
        assert_eq!(&bytes[16..21], b"db.c\0");
        assert_eq!(&bytes[21..25], &[0, 0, 0, 0]);
        assert_eq!(&bytes[25..29], &[1, 0, 0, 0]);
    }

    #[test]
    fn insert_continue_on_error_is_bit_one() {
        let request = Request::Insert(InsertMessage {
            flags: 1 << 1,
            namespace: Namespace::new("db", "c"),
            documents: vec![doc! { a: 1 }],
        });
        let bytes = codec().encode_request(1, &request).unwrap();
        assert_eq!(&bytes[16..20], &[2, 0, 0, 0]);

        let (message, _) = codec().decode(&bytes).unwrap().unwrap();
        let Request::Insert(insert) = message.request else {
            panic!("expected an insert");
        };
        assert!(insert.continue_on_error());
    }

    #[test]
    fn partial_message_needs_more_bytes() {
        let bytes = codec().encode_request(1, &query(doc! { a: 1 }, None)).unwrap();
        for cut in [0, 3, 16, bytes.len() - 1] {
            assert!(codec().decode(&bytes[..cut]).unwrap().is_none());
        }
    }

    #[test]
    fn consumes_one_message_at_a_time() {
        let first = codec().encode_request(1, &query(doc! { a: 1 }, None)).unwrap();
        let second = codec().encode_request(2, &query(doc! { b: 2 }, None)).unwrap();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&first);
        buf.extend_from_slice(&second);
        buf.extend_from_slice(&second[..5]);

        let one = codec().decode_buf(&mut buf).unwrap().unwrap();
        let two = codec().decode_buf(&mut buf).unwrap().unwrap();
        assert_eq!(one.header.request_id, 1);
        assert_eq!(two.header.request_id, 2);
        assert!(codec().decode_buf(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn unsupported_opcode_is_skipped() {
        let bytes = codec()
            .encode_request(5, &Request::Unsupported { op_code: 2013 })
            .unwrap();
        let mut padded = bytes.to_vec();
        padded.extend_from_slice(&[1, 2, 3]);
        padded[..4].copy_from_slice(&19i32.to_le_bytes());

        let (message, consumed) = codec().decode(&padded).unwrap().unwrap();
        assert_eq!(consumed, 19);
        assert_eq!(message.request, Request::Unsupported { op_code: 2013 });
    }

    #[test]
    fn oversized_and_undersized_lengths_fail() {
        let small = WireCodec::new(64);
        let bytes = small
            .encode_request(1, &query(doc! { text: "a long enough string to pass sixty four bytes" }, None))
            .unwrap();
        assert_eq!(small.decode(&bytes).err().unwrap().kind(), &ErrorKind::EncodingError);

        let bogus = 8i32.to_le_bytes();
        assert_eq!(codec().decode(&bogus).err().unwrap().kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn truncated_body_is_encoding_error() {
        let bytes = codec().encode_request(1, &query(doc! { a: 1 }, None)).unwrap();
        let mut broken = bytes[..bytes.len() - 3].to_vec();
        let length = broken.len() as i32;
        broken[..4].copy_from_slice(&length.to_le_bytes());
        assert_eq!(codec().decode(&broken).err().unwrap().kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn reply_round_trip() {
        let reply = Reply::new(vec![doc! { ok: 1, n: 2 }, doc! { x: "y" }]);
        let bytes = codec().encode_reply(7, 42, &reply).unwrap();
        assert_eq!(&bytes[12..16], &1i32.to_le_bytes());
        assert_eq!(&bytes[32..36], &2i32.to_le_bytes());

        let (header, decoded, consumed) = codec().decode_reply(&bytes).unwrap().unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(header.message_length as usize, bytes.len());
        assert_eq!(header.request_id, 7);
        assert_eq!(header.response_to, 42);
        assert_eq!(decoded, reply);
    }

    #[test]
    fn empty_reply_is_header_only() {
        let bytes = codec().encode_reply(1, 1, &Reply::default()).unwrap();
        assert_eq!(bytes.len(), REPLY_HEADER_LENGTH);
    }
}

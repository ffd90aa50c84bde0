use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};
use crate::ID_GENERATOR;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::{Debug, Display, Write};

/// A 12-byte document identifier.
///
/// Generated ids are roughly ordered by creation time: the first four bytes
/// hold the creation second. Equality and ordering are by raw bytes.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::collection::ObjectId;
///
/// let id = ObjectId::new();
/// let parsed = ObjectId::parse_str(&id.to_hex())?;
/// assert_eq!(id, parsed);
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    /// Generates a new unique `ObjectId`.
    pub fn new() -> Self {
        ObjectId {
            bytes: ID_GENERATOR.next_bytes(),
        }
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId { bytes }
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Parses the 24 hex digit form.
    pub fn parse_str(hex: &str) -> BsoniteResult<ObjectId> {
        if hex.len() != 24 || !hex.is_ascii() {
            log::error!("Invalid object id string: {}", hex);
            return Err(BsoniteError::new(
                &format!("invalid ObjectId string, expected 24 hex digits: {}", hex),
                ErrorKind::BadValue,
            ));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &hex[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| {
                log::error!("Invalid hex digits '{}' in object id {}", pair, hex);
                BsoniteError::new(
                    &format!("invalid ObjectId string, bad hex digits: {}", hex),
                    ErrorKind::BadValue,
                )
            })?;
        }
        Ok(ObjectId { bytes })
    }

    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(24);
        for byte in self.bytes.iter() {
            // writing into a String cannot fail
            let _ = write!(hex, "{:02x}", byte);
        }
        hex
    }

    /// The creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds =
            u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
        Utc.timestamp_opt(seconds as i64, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

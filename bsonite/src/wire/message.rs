use std::fmt::Display;

use crate::collection::Document;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

use super::header::MessageHeader;

/// A `database.collection` namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Namespace {
    database: String,
    collection: String,
}

impl Namespace {
    pub fn new(database: &str, collection: &str) -> Self {
        Namespace {
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }

    /// Splits a full name at its first dot. Both parts must be non-empty.
    pub fn parse(full_name: &str) -> BsoniteResult<Namespace> {
        match full_name.split_once('.') {
            Some((database, collection)) if !database.is_empty() && !collection.is_empty() => {
                Ok(Namespace::new(database, collection))
            }
            _ => {
                log::error!("Invalid namespace '{}'", full_name);
                Err(BsoniteError::new(
                    &format!("Invalid namespace specified '{}'", full_name),
                    ErrorKind::BadValue,
                ))
            }
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

macro_rules! flag_accessors {
    ($($(#[$meta:meta])* $name:ident => $bit:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(&self) -> bool {
                self.flags & (1 << $bit) != 0
            }
        )*
    };
}

/// An `OP_QUERY` request.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryMessage {
    pub flags: i32,
    pub namespace: Namespace,
    pub skip: i32,
    pub number_to_return: i32,
    pub query: Document,
    pub return_fields: Option<Document>,
}

impl QueryMessage {
    flag_accessors! {
        tailable => 1,
        slave_ok => 2,
        oplog_replay => 3,
        no_cursor_timeout => 4,
        await_data => 5,
        exhaust => 6,
        partial => 7,
    }
}

/// An `OP_INSERT` request.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertMessage {
    pub flags: i32,
    pub namespace: Namespace,
    pub documents: Vec<Document>,
}

impl InsertMessage {
    flag_accessors! {
        continue_on_error => 1,
    }
}

/// An `OP_DELETE` request.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteMessage {
    pub namespace: Namespace,
    pub flags: i32,
    pub selector: Document,
}

impl DeleteMessage {
    flag_accessors! {
        single_remove => 1,
    }
}

/// An `OP_UPDATE` request.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateMessage {
    pub namespace: Namespace,
    pub flags: i32,
    pub selector: Document,
    pub update: Document,
}

impl UpdateMessage {
    flag_accessors! {
        upsert => 0,
        multi_update => 1,
    }
}

/// A decoded client request.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Query(QueryMessage),
    Insert(InsertMessage),
    Delete(DeleteMessage),
    Update(UpdateMessage),
    /// A message with an opcode this codec does not decode; its body is skipped.
    Unsupported { op_code: i32 },
}

impl Request {
    pub fn namespace(&self) -> Option<&Namespace> {
        match self {
            Request::Query(message) => Some(&message.namespace),
            Request::Insert(message) => Some(&message.namespace),
            Request::Delete(message) => Some(&message.namespace),
            Request::Update(message) => Some(&message.namespace),
            Request::Unsupported { .. } => None,
        }
    }
}

/// A request together with its header.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestMessage {
    pub header: MessageHeader,
    pub request: Request,
}

/// An `OP_REPLY` body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reply {
    pub response_flags: i32,
    pub cursor_id: i64,
    pub starting_from: i32,
    pub documents: Vec<Document>,
}

impl Reply {
    /// A reply carrying `documents` with no cursor.
    pub fn new(documents: Vec<Document>) -> Self {
        Reply {
            documents,
            ..Reply::default()
        }
    }

    pub fn number_returned(&self) -> i32 {
        self.documents.len() as i32
    }
}

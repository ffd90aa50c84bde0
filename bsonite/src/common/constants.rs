// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: char = '.';

// index constants
pub const ID_INDEX_NAME: &str = "_id_";
pub const HASHED_INDEX: &str = "hashed";
pub const INDEX_VERSION: i32 = 1;

// config defaults
pub const DEFAULT_DATABASE: &str = "test";
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 48 * 1024 * 1024;

// type names reported in error messages
pub const MISSING_TYPE_NAME: &str = "missing";

pub const BSONITE_VERSION: &str = env!("CARGO_PKG_VERSION");

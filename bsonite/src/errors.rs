use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::collection::Document;
use crate::common::{atomic, Atomic};

/// Error kinds for bsonite operations.
///
/// The first four kinds mirror the failure classes of the query, update and
/// aggregation engines. The remaining kinds cover pipeline structure, index
/// metadata and the wire codec.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::errors::{BsoniteError, ErrorKind, BsoniteResult};
///
/// fn example() -> BsoniteResult<()> {
///     Err(BsoniteError::new("unknown operator: $foo", ErrorKind::BadValue))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Engine errors
    /// A dotted path crossed an atomic value or used a non-numeric array segment
    TraversalError,
    /// A query, update, projection or pipeline spec is malformed
    BadValue,
    /// An expression received a value of the wrong runtime type
    TypeMismatch,
    /// An update operator was applied to data it cannot handle
    InputDataError,

    // Aggregation errors
    /// The pipeline, a stage or an expression failed structural validation
    PipelineError,

    // Index metadata errors
    /// An index with the same keys but different options already exists
    IndexOptionsConflict,
    /// An index with the same name but different keys already exists
    IndexKeySpecsConflict,
    /// The index specification can never be created
    CannotCreateIndex,
    /// The named index does not exist
    IndexNotFound,

    // Wire errors
    /// Error encoding or decoding wire bytes or BSON documents
    EncodingError,
    /// Generic IO error
    IOError,

    // Generic/Internal Errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl ErrorKind {
    /// The driver-facing code reported for this kind when the raise site
    /// did not attach a more specific one.
    pub fn default_code(&self) -> Option<i32> {
        match self {
            ErrorKind::BadValue => Some(2),
            ErrorKind::TypeMismatch => Some(14),
            ErrorKind::IndexNotFound => Some(27),
            ErrorKind::CannotCreateIndex => Some(67),
            ErrorKind::IndexOptionsConflict => Some(85),
            ErrorKind::IndexKeySpecsConflict => Some(86),
            _ => None,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::TraversalError => write!(f, "Traversal error"),
            ErrorKind::BadValue => write!(f, "Bad value"),
            ErrorKind::TypeMismatch => write!(f, "Type mismatch"),
            ErrorKind::InputDataError => write!(f, "Input data error"),
            ErrorKind::PipelineError => write!(f, "Pipeline error"),
            ErrorKind::IndexOptionsConflict => write!(f, "Index options conflict"),
            ErrorKind::IndexKeySpecsConflict => write!(f, "Index key specs conflict"),
            ErrorKind::CannotCreateIndex => write!(f, "Cannot create index"),
            ErrorKind::IndexNotFound => write!(f, "Index not found"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom bsonite error type.
///
/// `BsoniteError` carries a message, a kind, an optional driver-compatible
/// numeric code and an optional cause. The backtrace is captured unresolved and
/// only symbolized when the error is debug-printed.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::errors::{BsoniteError, ErrorKind};
///
/// let err = BsoniteError::new("a group specification must include an _id", ErrorKind::PipelineError)
///     .with_code(15955);
/// assert_eq!(err.code(), Some(15955));
/// ```
#[derive(Clone)]
pub struct BsoniteError {
    message: String,
    error_kind: ErrorKind,
    code: Option<i32>,
    cause: Option<Box<BsoniteError>>,
    backtrace: Atomic<Backtrace>,
}

impl BsoniteError {
    /// Creates a new `BsoniteError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        BsoniteError {
            message: message.to_string(),
            error_kind,
            code: None,
            cause: None,
            backtrace: atomic(Backtrace::new_unresolved()),
        }
    }

    /// Creates a new `BsoniteError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: BsoniteError) -> Self {
        BsoniteError {
            message: message.to_string(),
            error_kind,
            code: None,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new_unresolved()),
        }
    }

    /// Attaches a driver-compatible numeric code.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    /// The numeric code a reply should carry, falling back to the kind's default.
    pub fn code(&self) -> Option<i32> {
        self.code.or_else(|| self.error_kind.default_code())
    }

    pub fn cause(&self) -> Option<&BsoniteError> {
        self.cause.as_deref()
    }

    /// Builds the `{ok: 0, errmsg, code}` document a command reply carries.
    pub fn to_reply_document(&self) -> Document {
        let mut reply = Document::new();
        reply.put("ok", 0);
        reply.put("errmsg", self.message.as_str());
        if let Some(code) = self.code() {
            reply.put("code", code);
        }
        reply
    }
}

impl Display for BsoniteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for BsoniteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.write();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, *backtrace)
            }
        }
    }
}

impl Error for BsoniteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for bsonite operations.
pub type BsoniteResult<T> = Result<T, BsoniteError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for BsoniteError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData => {
                ErrorKind::EncodingError
            }
            _ => ErrorKind::IOError,
        };
        BsoniteError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<std::string::FromUtf8Error> for BsoniteError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        BsoniteError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<bson::de::Error> for BsoniteError {
    fn from(err: bson::de::Error) -> Self {
        BsoniteError::new(
            &format!("BSON decoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<bson::ser::Error> for BsoniteError {
    fn from(err: bson::ser::Error) -> Self {
        BsoniteError::new(
            &format!("BSON encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<regex::Error> for BsoniteError {
    fn from(err: regex::Error) -> Self {
        BsoniteError::new(
            &format!("Invalid regular expression: {}", err),
            ErrorKind::BadValue,
        )
    }
}

impl From<std::fmt::Error> for BsoniteError {
    fn from(err: std::fmt::Error) -> Self {
        BsoniteError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;

    #[test]
    fn bsonite_error_new_creates_error() {
        let error = BsoniteError::new("An error occurred", ErrorKind::BadValue);
        assert_eq!(error.message, "An error occurred");
        assert_eq!(error.error_kind, ErrorKind::BadValue);
        assert!(error.cause.is_none());
    }

    #[test]
    fn bsonite_error_new_with_cause_creates_error() {
        let error = BsoniteError::new_with_cause(
            "Failed to decode OP_QUERY",
            ErrorKind::EncodingError,
            BsoniteError::new("unexpected end of document", ErrorKind::EncodingError),
        );
        assert_eq!(error.kind(), &ErrorKind::EncodingError);
        assert!(error.cause().is_some());
        assert!(error.source().is_some());
    }

    #[test]
    fn bsonite_error_display_formats_message_only() {
        let error = BsoniteError::new("An error occurred", ErrorKind::BadValue);
        assert_eq!(format!("{}", error), "An error occurred");
    }

    #[test]
    fn bsonite_error_debug_formats_with_cause() {
        let error = BsoniteError::new_with_cause(
            "outer",
            ErrorKind::InternalError,
            BsoniteError::new("inner", ErrorKind::IOError),
        );
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("outer"));
        assert!(formatted.contains("Caused by:"));
        assert!(formatted.contains("inner"));
    }

    #[test]
    fn explicit_code_wins_over_kind_default() {
        let error = BsoniteError::new("bad", ErrorKind::TypeMismatch).with_code(17124);
        assert_eq!(error.code(), Some(17124));

        let error = BsoniteError::new("bad", ErrorKind::TypeMismatch);
        assert_eq!(error.code(), Some(14));
    }

    #[test]
    fn input_data_error_has_no_default_code() {
        let error = BsoniteError::new("Cannot apply $pull to a non-array value", ErrorKind::InputDataError);
        assert_eq!(error.code(), None);
    }

    #[test]
    fn index_kinds_map_to_driver_codes() {
        assert_eq!(ErrorKind::IndexOptionsConflict.default_code(), Some(85));
        assert_eq!(ErrorKind::IndexKeySpecsConflict.default_code(), Some(86));
        assert_eq!(ErrorKind::IndexNotFound.default_code(), Some(27));
    }

    #[test]
    fn reply_document_carries_message_and_code() {
        let error = BsoniteError::new("unknown group operator '$foo'", ErrorKind::PipelineError)
            .with_code(15952);
        let reply = error.to_reply_document();
        assert_eq!(reply.get("ok"), Some(&Value::Number(0.0)));
        assert_eq!(
            reply.get("errmsg"),
            Some(&Value::String("unknown group operator '$foo'".to_string()))
        );
        assert_eq!(reply.get("code"), Some(&Value::Number(15952.0)));
    }

    #[test]
    fn reply_document_omits_missing_code() {
        let error = BsoniteError::new("boom", ErrorKind::InternalError);
        assert!(!error.to_reply_document().contains_key("code"));
    }

    #[test]
    fn test_from_io_error_eof_is_encoding_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: BsoniteError = io_err.into();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
        assert!(err.message().contains("IO error"));
    }

    #[test]
    fn test_from_io_error_other() {
        let io_err = std::io::Error::other("unknown io error");
        let err: BsoniteError = io_err.into();
        assert_eq!(err.kind(), &ErrorKind::IOError);
    }

    #[test]
    fn test_from_utf8_error() {
        let utf8_err = String::from_utf8(vec![0xFF, 0xFE]).unwrap_err();
        let err: BsoniteError = utf8_err.into();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
        assert!(err.message().contains("UTF-8"));
    }

    #[test]
    fn test_from_regex_error_is_bad_value() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: BsoniteError = regex_err.into();
        assert_eq!(err.kind(), &ErrorKind::BadValue);
    }

    #[test]
    fn test_question_mark_operator_with_from() {
        fn parse_name() -> BsoniteResult<String> {
            let name = String::from_utf8(vec![b'd', b'b'])?;
            Ok(name)
        }
        assert_eq!(parse_name().unwrap(), "db");
    }
}

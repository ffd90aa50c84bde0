use std::fmt::Display;

use regex::Regex;

use crate::common::{RegexValue, Value};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

/// A compiled `$regex` condition.
///
/// Keeps the source literal next to the compiled matcher so the condition can
/// be displayed and compared. Only string values can match.
#[derive(Clone)]
pub(crate) struct RegexMatcher {
    source: RegexValue,
    regex: Regex,
}

impl RegexMatcher {
    pub(crate) fn new(source: RegexValue) -> BsoniteResult<Self> {
        let regex = source.compile()?;
        Ok(RegexMatcher { source, regex })
    }

    /// Builds a matcher from the `$regex` and optional `$options` operands.
    ///
    /// The pattern may be a string or a regex literal. Explicit `$options`
    /// replace the flags of a literal.
    pub(crate) fn from_operands(pattern: &Value, options: Option<&Value>) -> BsoniteResult<Self> {
        let options = match options {
            None => None,
            Some(Value::String(options)) => Some(options.as_str()),
            Some(other) => {
                log::error!("$options must be a string, found {}", other.type_name());
                return Err(BsoniteError::new(
                    "$options has to be a string",
                    ErrorKind::BadValue,
                ));
            }
        };

        let source = match pattern {
            Value::String(pattern) => RegexValue::new(pattern, options.unwrap_or("")),
            Value::Regex(literal) => {
                RegexValue::new(literal.pattern(), options.unwrap_or(literal.options()))
            }
            other => {
                log::error!("$regex must be a string, found {}", other.type_name());
                return Err(BsoniteError::new(
                    "$regex has to be a string",
                    ErrorKind::BadValue,
                ));
            }
        };
        RegexMatcher::new(source)
    }

    pub(crate) fn is_match(&self, value: &Value) -> bool {
        match value {
            Value::String(text) => self.regex.is_match(text),
            _ => false,
        }
    }

    pub(crate) fn source(&self) -> &RegexValue {
        &self.source
    }
}

impl Display for RegexMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

use std::fmt::Display;

use itertools::Itertools;

use crate::collection::Document;
use crate::common::{Value, DOC_ID, HASHED_INDEX, ID_INDEX_NAME, INDEX_VERSION};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

use super::IndexOptions;

/// Describes one index of a collection: its name, its ordered key
/// specification and the options it was created with.
///
/// Descriptors are pure metadata. Matching never consults them.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexDescriptor {
    name: String,
    keys: Document,
    options: IndexOptions,
    namespace: String,
}

impl IndexDescriptor {
    /// Creates a descriptor for `keys` in `namespace`.
    ///
    /// # Arguments
    /// * `keys` - ordered field to direction mapping; a direction is a
    ///   non-zero number or `"hashed"`
    /// * `options` - the creation options; when they carry no name the
    ///   name is derived from the keys
    /// * `namespace` - the `database.collection` the index belongs to
    ///
    /// # Errors
    /// `CannotCreateIndex` when the key specification is empty or holds an
    /// unsupported direction, with code 16763 when a hashed key is combined
    /// with other fields.
    pub fn new(keys: Document, options: &IndexOptions, namespace: &str) -> BsoniteResult<Self> {
        validate_keys(&keys)?;
        let name = match options.get_name() {
            Some(name) => name.to_string(),
            None => default_name(&keys),
        };
        Ok(IndexDescriptor {
            name,
            keys,
            options: options.clone(),
            namespace: namespace.to_string(),
        })
    }

    /// The implicit `_id_` index every collection carries.
    pub(crate) fn id_index(namespace: &str) -> Self {
        let mut keys = Document::new();
        keys.put(DOC_ID, 1);
        IndexDescriptor {
            name: ID_INDEX_NAME.to_string(),
            keys,
            options: IndexOptions::new(),
            namespace: namespace.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &Document {
        &self.keys
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_hashed(&self) -> bool {
        self.keys.values().any(is_hashed)
    }

    /// Renders the descriptor the way index listings report it:
    /// `{v, key, name, ns}` plus `unique`/`sparse` when set.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.put("v", INDEX_VERSION);
        doc.put("key", self.keys.clone());
        doc.put("name", self.name.as_str());
        doc.put("ns", self.namespace.as_str());
        if self.options.is_unique() {
            doc.put("unique", true);
        }
        if self.options.is_sparse() {
            doc.put("sparse", true);
        }
        doc
    }
}

impl Display for IndexDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}", self.name, self.namespace)
    }
}

/// Joins `field_direction` pairs with `_`, e.g. `a_1_b_-1`.
pub fn default_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, direction)| format!("{}_{}", field, direction_text(direction)))
        .join("_")
}

fn direction_text(direction: &Value) -> String {
    if let Some(n) = direction.as_integer() {
        n.to_string()
    } else if let Some(s) = direction.as_str() {
        s.to_string()
    } else {
        direction.to_string()
    }
}

fn is_hashed(direction: &Value) -> bool {
    direction.as_str() == Some(HASHED_INDEX)
}

fn validate_keys(keys: &Document) -> BsoniteResult<()> {
    if keys.is_empty() {
        log::error!("Index key specification is empty");
        return Err(BsoniteError::new(
            "Index keys cannot be empty.",
            ErrorKind::CannotCreateIndex,
        ));
    }

    for (field, direction) in keys.iter() {
        let supported = match direction {
            Value::Number(n) => *n != 0.0,
            _ => is_hashed(direction),
        };
        if !supported {
            log::error!("Unsupported index direction {} for '{}'", direction, field);
            return Err(BsoniteError::new(
                &format!("Unsupported index key value for field '{}'", field),
                ErrorKind::CannotCreateIndex,
            ));
        }
    }

    if keys.size() > 1 && keys.values().any(is_hashed) {
        log::error!("Hashed index combined with other fields: {:?}", keys);
        return Err(BsoniteError::new(
            "Currently only single field hashed index supported.",
            ErrorKind::CannotCreateIndex,
        )
        .with_code(16763));
    }
    Ok(())
}

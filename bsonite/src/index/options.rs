use crate::collection::Document;
use crate::common::Value;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

/// Options accepted when creating an index.
///
/// Two index definitions on the same keys conflict when their options differ,
/// so the options take part in the equality check the registry performs.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::index::IndexOptions;
///
/// let options = IndexOptions::new().name("by_email").unique(true);
/// collection.create_index(doc! { email: 1 }, &options)?;
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexOptions {
    name: Option<String>,
    unique: bool,
    sparse: bool,
}

impl IndexOptions {
    pub fn new() -> Self {
        IndexOptions::default()
    }

    /// Sets an explicit index name instead of the one derived from the keys.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    /// Reads options from an index specification document such as
    /// `{key: {a: 1}, name: "a_1", unique: true}`.
    ///
    /// `key`, `v` and `ns` are ignored; unknown options are tolerated.
    /// `name` must be a string.
    pub fn from_document(spec: &Document) -> BsoniteResult<IndexOptions> {
        let name = match spec.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                log::error!("Index name given as {}", other.type_name());
                return Err(BsoniteError::new(
                    "The index name must be a string",
                    ErrorKind::BadValue,
                ));
            }
        };
        Ok(IndexOptions {
            name,
            unique: spec.get("unique").is_some_and(Value::is_truthy),
            sparse: spec.get("sparse").is_some_and(Value::is_truthy),
        })
    }

    /// Whether `self` and `other` describe the same index behavior.
    /// Names are not compared.
    pub(crate) fn same_behavior(&self, other: &IndexOptions) -> bool {
        self.unique == other.unique && self.sparse == other.sparse
    }
}

/// Options for a unique index.
pub fn unique_index() -> IndexOptions {
    IndexOptions::new().unique(true)
}

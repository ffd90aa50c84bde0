use crate::common::Value;

/// The result of an insert or remove.
///
/// `affected` is the number of documents written or removed; `ids` holds the
/// `_id` values of inserted documents (empty for removals).
///
/// # Examples
///
/// ```rust,ignore
/// let result = collection.insert(doc!{ name: "Alice" })?;
/// for id in result.ids() {
///     println!("Inserted document with ID: {}", id);
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteResult {
    affected: usize,
    ids: Vec<Value>,
}

impl WriteResult {
    pub fn new(affected: usize, ids: Vec<Value>) -> Self {
        Self { affected, ids }
    }

    /// Number of documents written or removed.
    pub fn affected(&self) -> usize {
        self.affected
    }

    /// `_id` values of inserted documents, in insertion order.
    pub fn ids(&self) -> &[Value] {
        &self.ids
    }
}

/// The result of an update.
///
/// `matched` counts documents selected by the query (after the `multi` cut),
/// `modified` those whose content actually changed, and `upserted_id` is set
/// when a document was synthesized because nothing matched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateResult {
    matched: usize,
    modified: usize,
    upserted_id: Option<Value>,
}

impl UpdateResult {
    pub fn new(matched: usize, modified: usize, upserted_id: Option<Value>) -> Self {
        Self {
            matched,
            modified,
            upserted_id,
        }
    }

    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn modified(&self) -> usize {
        self.modified
    }

    pub fn upserted_id(&self) -> Option<&Value> {
        self.upserted_id.as_ref()
    }

    /// The `n` of a legacy write reply: modified documents, or 1 for an upsert.
    pub fn affected(&self) -> usize {
        if self.upserted_id.is_some() {
            1
        } else {
            self.modified
        }
    }
}

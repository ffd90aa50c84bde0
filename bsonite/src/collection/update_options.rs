/// Options for controlling update operations on documents.
///
/// `UpdateOptions` mirrors the two flags of a legacy update request: whether a
/// document is synthesized when nothing matches, and whether every match is
/// updated or only the first one.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::collection::{multi, upsert, UpdateOptions};
///
/// // Update every match
/// let options = multi();
///
/// // Insert a document built from the query when nothing matches
/// let options = upsert();
///
/// // Both
/// let options = UpdateOptions::new(true, true);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    upsert: bool,
    multi: bool,
}

impl UpdateOptions {
    /// Creates a new `UpdateOptions` with specified behavior.
    ///
    /// # Arguments
    ///
    /// * `upsert` - If true, insert a synthesized document when no document matches
    /// * `multi` - If true, update every matching document instead of the first one
    pub fn new(upsert: bool, multi: bool) -> Self {
        Self { upsert, multi }
    }

    /// Returns whether a document is inserted when nothing matches.
    pub fn is_upsert(&self) -> bool {
        self.upsert
    }

    /// Returns whether every matching document is updated.
    pub fn is_multi(&self) -> bool {
        self.multi
    }
}

/// Creates `UpdateOptions` with upsert behavior, updating only the first match.
pub fn upsert() -> UpdateOptions {
    UpdateOptions::new(true, false)
}

/// Creates `UpdateOptions` that updates every matching document.
pub fn multi() -> UpdateOptions {
    UpdateOptions::new(false, true)
}

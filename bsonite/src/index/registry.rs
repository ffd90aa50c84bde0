use crate::collection::Document;
use crate::common::ID_INDEX_NAME;
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};

use super::{IndexDescriptor, IndexOptions};

/// The indexes defined on one collection, in creation order.
///
/// The registry always holds the `_id_` index first.
#[derive(Clone, Debug)]
pub struct IndexRegistry {
    namespace: String,
    indexes: Vec<IndexDescriptor>,
}

impl IndexRegistry {
    pub fn new(namespace: &str) -> Self {
        IndexRegistry {
            namespace: namespace.to_string(),
            indexes: vec![IndexDescriptor::id_index(namespace)],
        }
    }

    /// Registers an index on `keys`.
    ///
    /// # Returns
    /// * `Ok(true)` when the index was added
    /// * `Ok(false)` when an identical index already exists
    ///
    /// # Errors
    /// * `IndexKeySpecsConflict` (86) when the name is taken by different keys
    /// * `IndexOptionsConflict` (85) when the keys are indexed already with
    ///   different options or under a different name
    /// * `CannotCreateIndex` for an invalid key specification
    pub fn create(&mut self, keys: Document, options: &IndexOptions) -> BsoniteResult<bool> {
        let candidate = IndexDescriptor::new(keys, options, &self.namespace)?;

        if let Some(existing) = self.get(candidate.name()) {
            if existing.keys() != candidate.keys() {
                log::error!(
                    "Index '{}' already exists with keys {:?}",
                    existing.name(),
                    existing.keys()
                );
                return Err(BsoniteError::new(
                    &format!(
                        "Index with name: {} already exists with different options",
                        existing.name()
                    ),
                    ErrorKind::IndexKeySpecsConflict,
                ));
            }
            if !existing.options().same_behavior(candidate.options()) {
                log::error!("Index '{}' already exists with other options", existing.name());
                return Err(BsoniteError::new(
                    &format!(
                        "Index with name: {} already exists with different options",
                        existing.name()
                    ),
                    ErrorKind::IndexOptionsConflict,
                ));
            }
            return Ok(false);
        }

        if let Some(existing) = self.indexes.iter().find(|index| index.keys() == candidate.keys()) {
            log::error!(
                "Keys {:?} already indexed as '{}'",
                candidate.keys(),
                existing.name()
            );
            return Err(BsoniteError::new(
                &format!(
                    "Index with name: {} already exists with a different name",
                    existing.name()
                ),
                ErrorKind::IndexOptionsConflict,
            ));
        }

        log::debug!("Creating index {}", candidate);
        self.indexes.push(candidate);
        Ok(true)
    }

    /// Removes the index called `name`.
    ///
    /// # Errors
    /// * `BadValue` for the `_id_` index
    /// * `IndexNotFound` (27) when no index has that name
    pub fn drop(&mut self, name: &str) -> BsoniteResult<IndexDescriptor> {
        if name == ID_INDEX_NAME {
            log::error!("Attempt to drop the _id_ index of {}", self.namespace);
            return Err(BsoniteError::new(
                "cannot drop _id index",
                ErrorKind::BadValue,
            ));
        }
        match self.indexes.iter().position(|index| index.name() == name) {
            Some(position) => {
                log::debug!("Dropping index {} on {}", name, self.namespace);
                Ok(self.indexes.remove(position))
            }
            None => {
                log::error!("Index '{}' not found on {}", name, self.namespace);
                Err(BsoniteError::new(
                    &format!("index not found with name [{}]", name),
                    ErrorKind::IndexNotFound,
                ))
            }
        }
    }

    /// Removes every index except `_id_` and returns how many were dropped.
    pub fn drop_all(&mut self) -> usize {
        let before = self.indexes.len();
        self.indexes.retain(|index| index.name() == ID_INDEX_NAME);
        before - self.indexes.len()
    }

    pub fn get(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indexes.iter().find(|index| index.name() == name)
    }

    pub fn descriptors(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// The index listing as documents, `_id_` first.
    pub fn list(&self) -> Vec<Document> {
        self.indexes.iter().map(IndexDescriptor::to_document).collect()
    }
}

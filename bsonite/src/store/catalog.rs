use std::ops::Deref;
use std::sync::Arc;

use dashmap::DashMap;
use itertools::Itertools;

use crate::bsonite_config::{validate_collection_name, validate_database_name, BsoniteConfig};
use crate::collection::Collection;
use crate::errors::BsoniteResult;

/// The in-memory registry of collections, keyed by database and name.
///
/// Handles are created on first request and kept for the life of the
/// catalog, so every caller asking for the same namespace shares one
/// collection. Only collections that have been created by a write are
/// reported by the listing methods.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

impl Catalog {
    pub fn new(config: BsoniteConfig) -> Self {
        Catalog {
            inner: Arc::new(CatalogInner {
                collections: DashMap::new(),
                config,
            }),
        }
    }
}

impl Deref for Catalog {
    type Target = CatalogInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct CatalogInner {
    collections: DashMap<(String, String), Collection>,
    config: BsoniteConfig,
}

impl CatalogInner {
    /// Returns the collection `database.name`, registering an empty handle
    /// on first use.
    ///
    /// # Errors
    /// `BadValue` for an invalid database or collection name.
    pub fn collection(&self, database: &str, name: &str) -> BsoniteResult<Collection> {
        validate_database_name(database)?;
        validate_collection_name(name)?;

        let entry = self
            .collections
            .entry((database.to_string(), name.to_string()))
            .or_insert_with(|| Collection::new(database, name, self.config.clone()));
        Ok(entry.value().clone())
    }

    /// Returns the collection only if it has been created.
    pub fn get_collection(&self, database: &str, name: &str) -> Option<Collection> {
        self.collections
            .get(&(database.to_string(), name.to_string()))
            .map(|entry| entry.value().clone())
            .filter(Collection::is_created)
    }

    pub fn has_collection(&self, database: &str, name: &str) -> bool {
        self.get_collection(database, name).is_some()
    }

    /// Drops a collection's documents and indexes. Existing handles stay
    /// usable and see an empty, uncreated collection.
    ///
    /// Returns whether a created collection was dropped.
    pub fn drop_collection(&self, database: &str, name: &str) -> bool {
        match self.get_collection(database, name) {
            Some(collection) => {
                collection.reset();
                true
            }
            None => false,
        }
    }

    /// Drops every collection of `database`; returns how many were dropped.
    pub fn drop_database(&self, database: &str) -> usize {
        self.collection_names(database)
            .iter()
            .filter(|name| self.drop_collection(database, name))
            .count()
    }

    /// Names of the created collections of `database`, sorted.
    pub fn collection_names(&self, database: &str) -> Vec<String> {
        self.collections
            .iter()
            .filter(|entry| entry.key().0 == database && entry.value().is_created())
            .map(|entry| entry.key().1.clone())
            .sorted()
            .collect()
    }

    /// Databases holding at least one created collection, sorted.
    pub fn database_names(&self) -> Vec<String> {
        self.collections
            .iter()
            .filter(|entry| entry.value().is_created())
            .map(|entry| entry.key().0.clone())
            .sorted()
            .dedup()
            .collect()
    }
}

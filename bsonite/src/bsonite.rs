use std::ops::Deref;
use std::sync::Arc;

use crate::bsonite_builder::BsoniteBuilder;
use crate::bsonite_config::BsoniteConfig;
use crate::collection::Collection;
use crate::errors::BsoniteResult;
use crate::store::Catalog;
use crate::wire::WireCodec;

/// An in-memory document store instance.
///
/// `Bsonite` owns a configuration and a catalog of collections. Clones share
/// both. Nothing outlives the last clone.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::bsonite::Bsonite;
/// use bsonite::collection::FindOptions;
/// use bsonite::doc;
///
/// let db = Bsonite::builder().open()?;
/// let users = db.collection("app", "users")?;
/// users.insert(doc! { name: "Ada" })?;
/// assert_eq!(db.collection_names("app"), vec!["users".to_string()]);
/// ```
#[derive(Clone)]
pub struct Bsonite {
    inner: Arc<BsoniteInner>,
}

impl Bsonite {
    pub fn builder() -> BsoniteBuilder {
        BsoniteBuilder::new()
    }

    pub(crate) fn new(config: BsoniteConfig) -> Self {
        log::debug!(
            "Opening bsonite {} with default database '{}'",
            crate::common::BSONITE_VERSION,
            config.default_database()
        );
        Bsonite {
            inner: Arc::new(BsoniteInner {
                catalog: Catalog::new(config.clone()),
                config,
            }),
        }
    }
}

impl Deref for Bsonite {
    type Target = BsoniteInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct BsoniteInner {
    config: BsoniteConfig,
    catalog: Catalog,
}

impl BsoniteInner {
    /// Returns the collection `database.name`, creating the handle if needed.
    /// The collection itself is created by its first write.
    pub fn collection(&self, database: &str, name: &str) -> BsoniteResult<Collection> {
        self.catalog.collection(database, name)
    }

    /// Like [BsoniteInner::collection] in the default database.
    pub fn default_collection(&self, name: &str) -> BsoniteResult<Collection> {
        self.catalog.collection(&self.config.default_database(), name)
    }

    /// Returns the collection only if it exists.
    pub fn get_collection(&self, database: &str, name: &str) -> Option<Collection> {
        self.catalog.get_collection(database, name)
    }

    pub fn has_collection(&self, database: &str, name: &str) -> bool {
        self.catalog.has_collection(database, name)
    }

    /// Drops a collection; returns whether it existed.
    pub fn drop_collection(&self, database: &str, name: &str) -> bool {
        self.catalog.drop_collection(database, name)
    }

    /// Drops every collection of `database`; returns how many were dropped.
    pub fn drop_database(&self, database: &str) -> usize {
        self.catalog.drop_database(database)
    }

    pub fn collection_names(&self, database: &str) -> Vec<String> {
        self.catalog.collection_names(database)
    }

    pub fn database_names(&self) -> Vec<String> {
        self.catalog.database_names()
    }

    pub fn config(&self) -> &BsoniteConfig {
        &self.config
    }

    /// A wire codec honouring the configured message size limit.
    pub fn wire_codec(&self) -> WireCodec {
        self.config.wire_codec()
    }
}

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::aggregate::Pipeline;
use crate::bsonite_config::BsoniteConfig;
use crate::common::{atomic, Atomic, ReadExecutor, Value, WriteExecutor, DOC_ID};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};
use crate::filter::Filter;
use crate::index::{IndexOptions, IndexRegistry};
use crate::projection::Projection;
use crate::update::Updater;

use super::{Document, FindOptions, ObjectId, UpdateOptions, UpdateResult, WriteResult};

/// A named, in-memory collection of documents.
///
/// `Collection` is a cheap handle: clones share the same documents. Reads
/// take the collection's read lock, writes hold its write lock for the whole
/// operation, so a multi-document update is never observed half-applied.
///
/// A collection comes into existence on its first insert, upsert or index
/// creation. Until then it reads as empty and is not listed by the catalog.
///
/// # Examples
///
/// ```rust,ignore
/// let users = db.collection("app", "users")?;
/// users.insert(doc! { name: "Ada", age: 36 })?;
///
/// let adults = users.find(&doc! { age: { "$gte": 18 } }, &FindOptions::new())?;
/// users.update(&doc! { name: "Ada" }, &doc! { "$inc": { age: 1 } }, &UpdateOptions::default())?;
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    database: String,
    name: String,
    documents: Atomic<Vec<Document>>,
    indexes: Atomic<IndexRegistry>,
    created: AtomicBool,
    config: BsoniteConfig,
}

impl Collection {
    pub(crate) fn new(database: &str, name: &str, config: BsoniteConfig) -> Self {
        let namespace = format!("{}.{}", database, name);
        Collection {
            inner: Arc::new(CollectionInner {
                database: database.to_string(),
                name: name.to_string(),
                documents: atomic(Vec::new()),
                indexes: atomic(IndexRegistry::new(&namespace)),
                created: AtomicBool::from(false),
                config,
            }),
        }
    }

    pub fn database(&self) -> &str {
        &self.inner.database
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The `database.collection` full name.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.inner.database, self.inner.name)
    }

    /// Whether the collection has been created by an insert, upsert or index.
    pub fn is_created(&self) -> bool {
        self.inner.created.load(Ordering::Acquire)
    }

    pub fn size(&self) -> usize {
        self.inner.documents.read_with(|docs| docs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Inserts one document. See [Collection::insert_many].
    pub fn insert(&self, document: Document) -> BsoniteResult<WriteResult> {
        self.insert_many(vec![document])
    }

    /// Appends documents in order.
    ///
    /// Documents without `_id` get a generated ObjectId placed first, unless
    /// id generation is disabled in the config. Top-level field names may not
    /// start with `$`; a violation rejects the whole batch before anything
    /// is stored.
    pub fn insert_many(&self, mut documents: Vec<Document>) -> BsoniteResult<WriteResult> {
        for doc in &documents {
            validate_for_insert(doc)?;
        }

        let generate = self.inner.config.auto_generate_ids();
        let mut ids = Vec::with_capacity(documents.len());
        for doc in documents.iter_mut() {
            if !doc.has_id() && generate {
                doc.put_first(DOC_ID, ObjectId::new());
            }
            if let Some(id) = doc.id() {
                ids.push(id.clone());
            }
        }

        let count = documents.len();
        self.inner.documents.write_with(|docs| docs.extend(documents));
        self.mark_created();
        Ok(WriteResult::new(count, ids))
    }

    /// Returns copies of the documents matching `query`, in insertion order,
    /// after applying the skip, limit and projection of `options`.
    pub fn find(&self, query: &Document, options: &FindOptions) -> BsoniteResult<Vec<Document>> {
        let filter = Filter::parse(query)?;
        let projection = Projection::parse_optional(options.get_projection())?;
        let skip = options.get_skip().unwrap_or(0) as usize;
        let limit = match options.get_limit() {
            None | Some(0) => usize::MAX,
            Some(limit) => limit as usize,
        };

        let matched = self.inner.documents.read_with(|docs| -> BsoniteResult<Vec<Document>> {
            let mut matched = Vec::new();
            let mut skipped = 0;
            for doc in docs.iter() {
                if matched.len() >= limit {
                    break;
                }
                if filter.apply(doc)? {
                    if skipped < skip {
                        skipped += 1;
                    } else {
                        matched.push(doc.clone());
                    }
                }
            }
            Ok(matched)
        })?;

        projection.apply_all(matched)
    }

    /// The first document matching `query`, if any.
    pub fn find_one(&self, query: &Document) -> BsoniteResult<Option<Document>> {
        let mut found = self.find(query, &FindOptions::new().limit(1))?;
        Ok(found.pop())
    }

    pub fn count(&self, query: &Document) -> BsoniteResult<usize> {
        let filter = Filter::parse(query)?;
        self.inner.documents.read_with(|docs| -> BsoniteResult<usize> {
            let mut count = 0;
            for doc in docs.iter() {
                if filter.apply(doc)? {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    /// Applies `update` to the documents matching `query`.
    ///
    /// The update document is validated before anything changes. A failure
    /// on one document of a multi-update stops there and leaves the earlier
    /// documents updated.
    pub fn update(
        &self,
        query: &Document,
        update: &Document,
        options: &UpdateOptions,
    ) -> BsoniteResult<UpdateResult> {
        let updater = Updater::parse(update)?;
        let result = self
            .inner
            .documents
            .write_with(|docs| updater.apply(docs, query, options))?;
        if result.upserted_id().is_some() {
            self.mark_created();
        }
        Ok(result)
    }

    /// Removes the documents matching `query`, or only the first one when
    /// `just_one` is set. Returns the removed count and their ids.
    pub fn remove(&self, query: &Document, just_one: bool) -> BsoniteResult<WriteResult> {
        let filter = Filter::parse(query)?;
        self.inner.documents.write_with(|docs| -> BsoniteResult<WriteResult> {
            let mut targets = Vec::new();
            for (index, doc) in docs.iter().enumerate() {
                if filter.apply(doc)? {
                    targets.push(index);
                    if just_one {
                        break;
                    }
                }
            }

            let mut ids = Vec::with_capacity(targets.len());
            for index in targets.iter().rev() {
                let removed = docs.remove(*index);
                if let Some(id) = removed.id() {
                    ids.push(id.clone());
                }
            }
            ids.reverse();
            Ok(WriteResult::new(targets.len(), ids))
        })
    }

    /// Removes every document, keeping indexes.
    pub fn clear(&self) {
        self.inner.documents.write_with(|docs| docs.clear());
    }

    /// Runs an aggregation pipeline over a snapshot of the collection.
    ///
    /// The whole pipeline is parsed before any stage runs.
    pub fn aggregate(&self, stages: &[Value]) -> BsoniteResult<Vec<Document>> {
        let pipeline = Pipeline::parse(stages)?;
        let snapshot = self.inner.documents.read_with(|docs| docs.clone());
        pipeline.run(snapshot)
    }

    /// Records an index. Returns whether a new index was added.
    pub fn create_index(&self, keys: Document, options: &IndexOptions) -> BsoniteResult<bool> {
        let created = self
            .inner
            .indexes
            .write_with(|indexes| indexes.create(keys, options))?;
        self.mark_created();
        Ok(created)
    }

    /// Index descriptions, `_id_` first.
    pub fn list_indexes(&self) -> Vec<Document> {
        self.inner.indexes.read_with(|indexes| indexes.list())
    }

    pub fn drop_index(&self, name: &str) -> BsoniteResult<()> {
        self.inner
            .indexes
            .write_with(|indexes| indexes.drop(name))
            .map(|_| ())
    }

    /// Drops every index but `_id_`; returns how many were dropped.
    pub fn drop_indexes(&self) -> usize {
        self.inner.indexes.write_with(|indexes| indexes.drop_all())
    }

    /// Resets the collection to its uncreated state.
    pub(crate) fn reset(&self) {
        let namespace = self.namespace();
        self.inner.documents.write_with(|docs| docs.clear());
        self.inner
            .indexes
            .write_with(|indexes| *indexes = IndexRegistry::new(&namespace));
        self.inner.created.store(false, Ordering::Release);
        log::debug!("Collection {} dropped", namespace);
    }

    fn mark_created(&self) {
        if !self.inner.created.swap(true, Ordering::AcqRel) {
            log::debug!("Collection {} created", self.namespace());
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.inner.database, self.inner.name)
    }
}

fn validate_for_insert(doc: &Document) -> BsoniteResult<()> {
    if let Some(key) = doc.keys().find(|key| key.starts_with('$')) {
        log::error!("Insert of document with top-level field '{}'", key);
        return Err(BsoniteError::new(
            &format!("Document can't have $ prefixed field names: {}", key),
            ErrorKind::BadValue,
        ));
    }
    Ok(())
}

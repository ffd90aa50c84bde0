//! Configuration of a [Bsonite](crate::bsonite::Bsonite) instance.

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor, DEFAULT_DATABASE, DEFAULT_MAX_MESSAGE_SIZE};
use crate::errors::{BsoniteError, BsoniteResult, ErrorKind};
use crate::wire::{WireCodec, REPLY_HEADER_LENGTH};

/// Settings shared by every collection of an instance.
///
/// Settings can be changed until the instance is opened; afterwards they
/// are frozen and setters fail.
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::bsonite_builder::BsoniteBuilder;
///
/// let db = BsoniteBuilder::new()
///     .default_database("app")
///     .max_message_size(1024 * 1024)
///     .open()?;
/// assert_eq!(db.config().default_database(), "app");
/// ```
#[derive(Clone)]
pub struct BsoniteConfig {
    inner: Arc<BsoniteConfigInner>,
}

impl Default for BsoniteConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BsoniteConfig {
    pub fn new() -> Self {
        BsoniteConfig {
            inner: Arc::new(BsoniteConfigInner::new()),
        }
    }
}

impl Deref for BsoniteConfig {
    type Target = BsoniteConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct BsoniteConfigInner {
    configured: AtomicBool,
    max_message_size: AtomicUsize,
    default_database: Atomic<String>,
    auto_generate_ids: AtomicBool,
}

impl BsoniteConfigInner {
    fn new() -> Self {
        BsoniteConfigInner {
            configured: AtomicBool::from(false),
            max_message_size: AtomicUsize::new(DEFAULT_MAX_MESSAGE_SIZE),
            default_database: atomic(DEFAULT_DATABASE.to_string()),
            auto_generate_ids: AtomicBool::from(true),
        }
    }

    /// Largest wire message the codec accepts, in bytes.
    pub fn max_message_size(&self) -> usize {
        self.max_message_size.load(Ordering::Relaxed)
    }

    /// Sets the largest accepted wire message. It must hold at least a reply header.
    pub fn set_max_message_size(&self, size: usize) -> BsoniteResult<()> {
        self.ensure_not_configured("Maximum message size")?;
        if size < REPLY_HEADER_LENGTH {
            log::error!("Maximum message size {} is below {}", size, REPLY_HEADER_LENGTH);
            return Err(BsoniteError::new(
                &format!("Maximum message size must be at least {} bytes", REPLY_HEADER_LENGTH),
                ErrorKind::BadValue,
            ));
        }
        self.max_message_size.store(size, Ordering::Relaxed);
        Ok(())
    }

    /// Database used when a caller does not name one.
    pub fn default_database(&self) -> String {
        self.default_database.read_with(|name| name.clone())
    }

    pub fn set_default_database(&self, name: &str) -> BsoniteResult<()> {
        self.ensure_not_configured("Default database")?;
        validate_database_name(name)?;
        self.default_database.write_with(|it| *it = name.to_string());
        Ok(())
    }

    /// Whether inserts give documents without `_id` a generated ObjectId.
    pub fn auto_generate_ids(&self) -> bool {
        self.auto_generate_ids.load(Ordering::Relaxed)
    }

    pub fn set_auto_generate_ids(&self, enabled: bool) -> BsoniteResult<()> {
        self.ensure_not_configured("Id generation")?;
        self.auto_generate_ids.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// A codec honouring the configured message size limit.
    pub fn wire_codec(&self) -> WireCodec {
        WireCodec::new(self.max_message_size())
    }

    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    pub(crate) fn initialize(&self) {
        self.configured.store(true, Ordering::Relaxed);
    }

    fn ensure_not_configured(&self, setting: &str) -> BsoniteResult<()> {
        if self.is_configured() {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(BsoniteError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::BadValue,
            ));
        }
        Ok(())
    }
}

/// Checks a database name: non-empty and free of `/\. "$` and NUL.
pub fn validate_database_name(name: &str) -> BsoniteResult<()> {
    if name.is_empty() || name.contains(['/', '\\', '.', ' ', '"', '$', '\0']) {
        log::error!("Invalid database name '{}'", name);
        return Err(BsoniteError::new(
            &format!("Invalid database name: '{}'", name),
            ErrorKind::BadValue,
        ));
    }
    Ok(())
}

/// Checks a collection name: non-empty, free of `$` and NUL.
pub fn validate_collection_name(name: &str) -> BsoniteResult<()> {
    if name.is_empty() || name.contains(['$', '\0']) {
        log::error!("Invalid collection name '{}'", name);
        return Err(BsoniteError::new(
            &format!("Invalid collection name: '{}'", name),
            ErrorKind::BadValue,
        ));
    }
    Ok(())
}

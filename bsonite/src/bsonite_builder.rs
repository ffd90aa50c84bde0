use crate::bsonite::Bsonite;
use crate::bsonite_config::BsoniteConfig;
use crate::errors::{BsoniteError, BsoniteResult};

/// Builder for a [Bsonite] instance.
///
/// Setters never fail on the spot: the first configuration error is kept
/// and returned by [BsoniteBuilder::open].
///
/// # Examples
///
/// ```rust,ignore
/// use bsonite::bsonite_builder::BsoniteBuilder;
///
/// let db = BsoniteBuilder::new()
///     .default_database("app")
///     .auto_generate_ids(true)
///     .open()?;
/// ```
#[derive(Default)]
pub struct BsoniteBuilder {
    error: Option<BsoniteError>,
    config: BsoniteConfig,
}

impl BsoniteBuilder {
    pub fn new() -> Self {
        BsoniteBuilder {
            error: None,
            config: BsoniteConfig::new(),
        }
    }

    /// Sets the largest wire message accepted by the instance's codec.
    pub fn max_message_size(mut self, size: usize) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_max_message_size(size) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the database used when callers do not name one.
    pub fn default_database(mut self, name: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_default_database(name) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Enables or disables `_id` generation for inserted documents.
    pub fn auto_generate_ids(mut self, enabled: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_auto_generate_ids(enabled) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Freezes the configuration and opens the instance.
    ///
    /// # Errors
    ///
    /// The first error captured by a setter.
    pub fn open(self) -> BsoniteResult<Bsonite> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.initialize();
        Ok(Bsonite::new(self.config))
    }
}

//! # Bsonite - an in-memory document store for driver tests
//!
//! Bsonite emulates the query language, update semantics, aggregation
//! pipeline and legacy wire framing of a MongoDB-style server closely enough
//! to stand in for one when testing client drivers. Everything lives in
//! process memory.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bsonite::bsonite::Bsonite;
//! use bsonite::collection::{FindOptions, UpdateOptions};
//! use bsonite::doc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Bsonite::builder().open()?;
//! let users = db.collection("app", "users")?;
//!
//! users.insert(doc! { name: "Ada", langs: ["en", "fr"] })?;
//! users.update(
//!     &doc! { name: "Ada" },
//!     &doc! { "$push": { langs: "de" } },
//!     &UpdateOptions::default(),
//! )?;
//!
//! let found = users.find(&doc! { langs: "de" }, &FindOptions::new())?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - the [Value](common::Value) model and the full-order comparator
//! - [`collection`] - documents, field paths and the collection facade
//! - [`filter`] - query matching
//! - [`update`] - operator and replacement updates, upserts
//! - [`projection`] - field inclusion and exclusion
//! - [`aggregate`] - the aggregation pipeline
//! - [`index`] - index metadata
//! - [`wire`] - the legacy request/reply codec
//! - [`store`] - the collection catalog
//! - [`bsonite`], [`bsonite_builder`], [`bsonite_config`] - the instance and its configuration
//! - [`errors`] - error kinds and driver error codes

use crate::collection::id_generator::ObjectIdGenerator;
use std::sync::LazyLock;

pub mod aggregate;
pub mod bsonite;
pub mod bsonite_builder;
pub mod bsonite_config;
pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod index;
pub mod projection;
pub mod store;
pub mod update;
pub mod wire;

pub(crate) static ID_GENERATOR: LazyLock<ObjectIdGenerator> = LazyLock::new(ObjectIdGenerator::new);

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}

//! The in-memory collection catalog.
//!
//! Nothing is persisted: a [Catalog] lives as long as the
//! [Bsonite](crate::bsonite::Bsonite) instance that owns it.

mod catalog;

pub use catalog::*;

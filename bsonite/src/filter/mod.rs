//! Query filters for selecting documents from collections.
//!
//! A query document is parsed once into a [Filter], a typed tree of
//! [FilterProvider]s, and then applied to each candidate document.
//!
//! # Examples
//!
//! ```rust,ignore
//! use bsonite::doc;
//! use bsonite::filter::{matches, Filter};
//!
//! let filter = Filter::parse(&doc!{ tags: { "$all": ["a", "b"] } })?;
//! assert!(filter.apply(&doc!{ tags: ["a", "b", "c"] })?);
//!
//! assert!(matches(&doc!{ a: [1, 2] }, &doc!{ a: 2 })?);
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `$eq`, `$ne`, implicit equality
//! - **Comparison**: `$gt`, `$gte`, `$lt`, `$lte`
//! - **Membership**: `$in`, `$nin`, `$all`
//! - **Pattern**: `$regex` with `$options`, regex literals
//! - **Element**: `$exists`
//! - **Logical**: `$and`, `$or`, `$nor`, `$not`

mod basic_filters;
mod condition;
mod context;
mod filter;
mod logical_filters;
mod pattern_filters;

pub(crate) use condition::{is_operator_document, Condition};
pub use context::MatchContext;
pub use filter::*;

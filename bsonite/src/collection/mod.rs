//! Documents, identifiers and the collection facade.
//!
//! A [Document] is an insertion-ordered map of field names to
//! [Value](crate::common::Value)s. Dotted paths such as `a.b.0` address nested
//! fields through [FieldPath].
//!
//! ```rust,ignore
//! use bsonite::collection::{FindOptions, UpdateOptions};
//! use bsonite::doc;
//!
//! let users = db.collection("app", "users")?;
//! users.insert(doc! { name: "Ada", address: { city: "London" } })?;
//!
//! let found = users.find(&doc! { "address.city": "London" }, &FindOptions::new())?;
//! users.update(&doc! { name: "Ada" }, &doc! { "$set": { active: true } }, &UpdateOptions::default())?;
//! ```
//!
//! Inserted documents without an `_id` receive a generated [ObjectId] as
//! their first field.

mod collection;
mod document;
mod field_path;
mod find_options;
pub(crate) mod id_generator;
mod object_id;
mod update_options;
mod write_result;

pub use collection::*;
pub use document::*;
pub use field_path::*;
pub use find_options::*;
pub use object_id::*;
pub use update_options::*;
pub use write_result::*;

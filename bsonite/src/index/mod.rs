//! Index metadata.
//!
//! Collections record the indexes clients create so that index listings and
//! the conflict rules behave like a real server. Indexes are never used to
//! answer queries; every `find` scans the collection.
//!
//! ```rust,ignore
//! use bsonite::index::{unique_index, IndexOptions};
//!
//! collection.create_index(doc! { email: 1 }, &unique_index())?;
//! collection.create_index(doc! { name: 1, age: (-1) }, &IndexOptions::new())?;
//! collection.drop_index("name_1_age_-1")?;
//! ```

mod descriptor;
mod options;
mod registry;

pub use descriptor::*;
pub use options::*;
pub use registry::*;

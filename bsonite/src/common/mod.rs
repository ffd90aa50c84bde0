//! Shared building blocks: the [Value] model, the full-order comparator,
//! lock helpers and constants.

mod compare;
mod constants;
mod lock;
mod value;

pub use compare::*;
pub use constants::*;
pub use lock::*;
pub use value::*;

//! The update engine.
//!
//! An update document is either a replacement (only literal keys) or a set of
//! modifiers (`$set`, `$inc`, `$push`, ...). [Updater::parse] validates it and
//! [Updater::apply] runs it against the documents of a collection, including
//! upsert synthesis.

mod modifier;
mod updater;
mod upsert;

pub use updater::Updater;

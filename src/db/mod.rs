//! Local batch journal: entity model and SQL repository.
//!
//! This module is split into two submodules:
//! - `model`: the journal entry returned by repositories.
//! - `repo`: SQL-only functions that map rows into entries.
//!
//! The journal remembers which batches this console submitted so that a
//! progress lookup answering 404 can be told apart as pending, expired or
//! unknown, and so that polling can resume after a restart.

pub mod model;
pub mod repo;

pub use repo::*;

pub use model::JournalEntry;

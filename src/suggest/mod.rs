//! Guard ranking against a derived intent query.

pub mod catalog;
pub mod matcher;
pub mod query;
pub mod tokenize;
pub mod types;

pub use catalog::{GuardCatalog, InMemoryGuardCatalog};
pub use matcher::{usage_boost, SuggestionMatcher};
pub use query::{query_from_summary, query_from_trigger};
pub use types::*;

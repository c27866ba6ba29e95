//! Core of the news digest: stage-typed article records and the pure
//! filter, merge and categorize passes that run between ingestion and
//! rendering.

pub mod categorize;
pub mod defs;
pub mod digest;
pub mod filter;
pub mod merge;

pub use categorize::Categorizer;
pub use defs::*;
pub use digest::{Digest, DigestSection};
pub use filter::{filter_articles, FilterOutcome};
pub use merge::deduplicate_and_merge;

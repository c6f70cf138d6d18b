//! Search surface for the biblion access layer.
//!
//! This crate provides:
//! - A boolean tag-filter algebra in conjunctive normal form
//! - The serializable query data model and wire enums
//! - The immutable query builder and query snapshots
//!
//! Everything here is pure data: executing a query against the remote
//! service lives in `biblion-client`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod filter;
pub mod query;

// Re-export commonly used types
pub use builder::{ItemQuery, ItemQueryBuilder};
pub use filter::{AndClause, OrClause, TagFilter};
pub use query::{
    ItemQueryData, QueryMode, SortDirection, SortField, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};

//! Paginated, searchable, sorted listing over the country collection.
//!
//! The store has no sort, no offset and no text index: everything after the
//! scan happens in memory, which bounds this to small collections.

pub mod query;
pub mod service;

pub use query::{ListParams, RawListQuery, SortKey};
pub use service::ListingService;

//! Service layer for the country catalogue.
//! - Store adapters own access to the `countries` and `neighbors` collections.
//! - Services hold the business rules (existence checks, neighbor idempotence, listing).
//! - The persistence engine is injected once as `Arc<dyn KvEngine>`.

pub mod errors;
pub mod storage;
pub mod pagination;
pub mod countries;
pub mod neighbors;
pub mod listing;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

pub use runtime::Services;

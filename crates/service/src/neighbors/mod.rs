//! Neighbor relation: directed (country, neighbor) pairs and the service that
//! validates and lists them.

pub mod repository;
pub mod service;

pub use repository::{NeighborLink, NeighborRepository};
pub use service::{AddNeighborsOutcome, NeighborService};

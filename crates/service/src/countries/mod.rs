//! Country records: domain types, the record store adapter and the CRUD service.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{Country, CountryInput, NeighborCountry};
pub use repository::CountryRepository;
pub use service::CountryService;

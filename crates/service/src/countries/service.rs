use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::countries::domain::{Country, CountryInput};
use crate::countries::repository::CountryRepository;
use crate::errors::{ensure_id, ServiceError};
use crate::neighbors::repository::NeighborRepository;

/// Create/read/update/delete over the country collection.
/// Every mutation re-reads the record first; nothing is cached between calls.
#[derive(Clone)]
pub struct CountryService {
    countries: CountryRepository,
    links: NeighborRepository,
}

impl CountryService {
    pub fn new(countries: CountryRepository, links: NeighborRepository) -> Self { Self { countries, links } }

    /// Assign ids and timestamps, then write the batch.
    ///
    /// Items are written independently. If any item fails the records already
    /// written stay in place and the call returns `PartialWrite` naming both sides.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn create(&self, inputs: Vec<CountryInput>) -> Result<Vec<Country>, ServiceError> {
        if inputs.is_empty() {
            return Err(ServiceError::invalid("at least one country is required"));
        }
        let failures: Vec<String> = inputs
            .iter()
            .enumerate()
            .flat_map(|(idx, input)| input.field_errors().into_iter().map(move |e| format!("[{idx}] {e}")))
            .collect();
        if !failures.is_empty() {
            return Err(ServiceError::Validation(failures));
        }

        let now = Utc::now();
        let countries: Vec<Country> = inputs
            .into_iter()
            .map(|input| input.into_country(Uuid::new_v4().to_string(), now, now))
            .collect();

        let results = self.countries.batch_put(&countries).await?;
        let mut written = Vec::with_capacity(countries.len());
        let mut failed = Vec::new();
        for (country, result) in countries.iter().zip(results) {
            match result {
                Ok(()) => written.push(country.id.clone()),
                Err(e) => {
                    error!(id = %country.id, err = %e, "country_batch_item_failed");
                    failed.push(country.id.clone());
                }
            }
        }
        if !failed.is_empty() {
            return Err(ServiceError::PartialWrite { written, failed });
        }

        info!(count = countries.len(), "countries_created");
        Ok(countries)
    }

    pub async fn get(&self, id: &str) -> Result<Country, ServiceError> {
        let id = ensure_id(id, "country")?;
        self.countries
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format_args!("country {id}")))
    }

    /// Full replace from a raw body: every field comes from `body`; id and
    /// `created_at` are kept. The record must exist before the body is parsed.
    #[instrument(skip(self, body))]
    pub async fn update(&self, id: &str, body: Value) -> Result<Country, ServiceError> {
        let existing = self.get(id).await?;
        let input = CountryInput::from_json(body)?;
        let updated = input.into_country(existing.id, existing.created_at, Utc::now());
        self.countries.put(&updated).await?;
        info!(id = %updated.id, "country_updated");
        Ok(updated)
    }

    /// Remove the record and its own neighbor pairs.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        self.countries.delete(&existing.id).await?;
        let links = self.links.remove_all_for(&existing.id).await?;
        info!(id = %existing.id, links_removed = links, "country_deleted");
        Ok(())
    }

    /// Unordered full scan. Unbounded; meant for small collections.
    pub async fn list(&self) -> Result<Vec<Country>, ServiceError> {
        Ok(self.countries.scan_all().await?)
    }
}

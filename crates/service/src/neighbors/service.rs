use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::countries::{domain::NeighborCountry, repository::CountryRepository};
use crate::errors::{ensure_id, ServiceError};
use crate::neighbors::repository::NeighborRepository;

/// Result of an add-neighbors call. Partial success is a normal outcome.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AddNeighborsOutcome {
    pub added: Vec<String>,
    pub errors: Vec<String>,
}

impl AddNeighborsOutcome {
    /// Nothing was added: the request as a whole is a client error.
    pub fn is_rejected(&self) -> bool { self.added.is_empty() }
}

/// Maintains the directed neighbor relation. Adding A→B never inserts B→A.
#[derive(Clone)]
pub struct NeighborService {
    countries: CountryRepository,
    links: NeighborRepository,
}

impl NeighborService {
    pub fn new(countries: CountryRepository, links: NeighborRepository) -> Self { Self { countries, links } }

    async fn require_country(&self, country_id: &str) -> Result<(), ServiceError> {
        match self.countries.get(country_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found(format_args!("country {country_id}"))),
        }
    }

    /// Validate each candidate against the country collection and insert the
    /// missing pairs, in input order. Per-item problems land in `errors`.
    #[instrument(skip(self, neighbor_ids), fields(candidates = neighbor_ids.len()))]
    pub async fn add_neighbors(&self, country_id: &str, neighbor_ids: Vec<String>) -> Result<AddNeighborsOutcome, ServiceError> {
        let country_id = ensure_id(country_id, "country")?;
        if neighbor_ids.is_empty() {
            return Err(ServiceError::invalid("neighbor_ids must contain at least one id"));
        }
        self.require_country(country_id).await?;

        let valid_ids = self.countries.scan_ids().await?;
        let mut outcome = AddNeighborsOutcome::default();
        for neighbor_id in neighbor_ids {
            if !valid_ids.contains(&neighbor_id) {
                outcome.errors.push(format!("Invalid neighbor country ID: {neighbor_id}"));
                continue;
            }
            // check-and-insert is a single conditional write
            if self.links.insert_if_absent(country_id, &neighbor_id).await? {
                outcome.added.push(neighbor_id);
            } else {
                outcome.errors.push(format!("Neighbor with ID {neighbor_id} already exists for this country"));
            }
        }

        info!(added = outcome.added.len(), errors = outcome.errors.len(), "neighbors_added");
        Ok(outcome)
    }

    /// Neighbors of `country_id`, projected, in relation-query order.
    ///
    /// Pairs whose neighbor record no longer exists are skipped with a warning.
    #[instrument(skip(self))]
    pub async fn get_neighbors(&self, country_id: &str) -> Result<Vec<NeighborCountry>, ServiceError> {
        let country_id = ensure_id(country_id, "country")?;
        self.require_country(country_id).await?;

        let links = self.links.list_for(country_id).await?;
        // try_join_all keeps output position == input position
        let records = try_join_all(links.iter().map(|l| self.countries.get(&l.neighbor_id))).await?;

        let mut neighbors = Vec::with_capacity(records.len());
        for (link, record) in links.iter().zip(records) {
            match record {
                Some(country) => neighbors.push(NeighborCountry::from(country)),
                None => warn!(country_id, neighbor_id = %link.neighbor_id, "orphaned_neighbor_link_skipped"),
            }
        }
        Ok(neighbors)
    }

    /// Drop one directed pair. `NotFound` when the country or the pair is absent.
    #[instrument(skip(self))]
    pub async fn remove_neighbor(&self, country_id: &str, neighbor_id: &str) -> Result<(), ServiceError> {
        let country_id = ensure_id(country_id, "country")?;
        let neighbor_id = ensure_id(neighbor_id, "neighbor")?;
        self.require_country(country_id).await?;
        if !self.links.remove(country_id, neighbor_id).await? {
            return Err(ServiceError::not_found(format_args!("neighbor {neighbor_id} of country {country_id}")));
        }
        info!(country_id, neighbor_id, "neighbor_removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::Country;
    use crate::test_support::{failing_services, memory_services, sample_input, TestServices};

    async fn seed(svc: &TestServices, names: &[&str]) -> Vec<Country> {
        let inputs = names.iter().map(|n| sample_input(n, "Europe", 1, 1.0)).collect();
        svc.countries.create(inputs).await.expect("seed countries")
    }

    #[tokio::test]
    async fn unknown_neighbor_is_reported_and_rejected() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Spain"]).await;
        let out = svc.neighbors.add_neighbors(&c[0].id, vec!["ghost".into()]).await?;
        assert!(out.added.is_empty());
        assert_eq!(out.errors, vec!["Invalid neighbor country ID: ghost".to_string()]);
        assert!(out.is_rejected());
        Ok(())
    }

    #[tokio::test]
    async fn adding_twice_reports_duplicate_without_new_pair() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Spain", "France"]).await;
        let (spain, france) = (&c[0].id, &c[1].id);

        let first = svc.neighbors.add_neighbors(spain, vec![france.clone()]).await?;
        assert_eq!(first.added, vec![france.clone()]);
        assert!(first.errors.is_empty());

        let second = svc.neighbors.add_neighbors(spain, vec![france.clone()]).await?;
        assert!(second.added.is_empty());
        assert_eq!(second.errors, vec![format!("Neighbor with ID {france} already exists for this country")]);
        assert!(second.is_rejected());
        assert_eq!(svc.links.list_for(spain).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn mixed_batch_is_partial_success_in_input_order() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Spain", "France", "Portugal"]).await;
        let out = svc
            .neighbors
            .add_neighbors(&c[0].id, vec![c[1].id.clone(), "bogus".into(), c[2].id.clone(), c[1].id.clone()])
            .await?;
        assert_eq!(out.added, vec![c[1].id.clone(), c[2].id.clone()]);
        assert_eq!(out.errors.len(), 2);
        assert!(out.errors[0].starts_with("Invalid neighbor country ID"));
        assert!(out.errors[1].contains("already exists"));
        assert!(!out.is_rejected());
        Ok(())
    }

    #[tokio::test]
    async fn relation_stays_directed() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Spain", "France"]).await;
        svc.neighbors.add_neighbors(&c[0].id, vec![c[1].id.clone()]).await?;
        assert!(svc.neighbors.get_neighbors(&c[1].id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_country_is_not_found() {
        let svc = memory_services();
        let err = svc.neighbors.add_neighbors("nope", vec!["x".into()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(matches!(svc.neighbors.get_neighbors("nope").await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_candidate_list_is_invalid_input() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Spain"]).await;
        let err = svc.neighbors.add_neighbors(&c[0].id, Vec::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        Ok(())
    }

    #[tokio::test]
    async fn get_neighbors_follows_insertion_order() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Germany", "Poland", "Austria"]).await;
        svc.neighbors.add_neighbors(&c[0].id, vec![c[2].id.clone()]).await?;
        svc.neighbors.add_neighbors(&c[0].id, vec![c[1].id.clone()]).await?;

        let got = svc.neighbors.get_neighbors(&c[0].id).await?;
        let names: Vec<_> = got.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Austria", "Poland"]);
        Ok(())
    }

    #[tokio::test]
    async fn get_neighbors_of_isolated_country_is_empty() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Iceland"]).await;
        assert!(svc.neighbors.get_neighbors(&c[0].id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn orphaned_pairs_are_skipped() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Germany", "Poland", "Austria"]).await;
        svc.neighbors.add_neighbors(&c[0].id, vec![c[1].id.clone(), c[2].id.clone()]).await?;
        svc.countries.delete(&c[1].id).await?;

        let got = svc.neighbors.get_neighbors(&c[0].id).await?;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, c[2].id);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_adds_of_same_pair_insert_once() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Spain", "France"]).await;
        let calls = (0..8).map(|_| svc.neighbors.add_neighbors(&c[0].id, vec![c[1].id.clone()]));
        let outcomes = try_join_all(calls).await?;
        let added: usize = outcomes.iter().map(|o| o.added.len()).sum();
        assert_eq!(added, 1);
        assert_eq!(svc.links.list_for(&c[0].id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn remove_neighbor_then_not_found() -> Result<(), anyhow::Error> {
        let svc = memory_services();
        let c = seed(&svc, &["Spain", "France"]).await;
        svc.neighbors.add_neighbors(&c[0].id, vec![c[1].id.clone()]).await?;
        svc.neighbors.remove_neighbor(&c[0].id, &c[1].id).await?;
        assert!(svc.neighbors.get_neighbors(&c[0].id).await?.is_empty());
        assert!(matches!(
            svc.neighbors.remove_neighbor(&c[0].id, &c[1].id).await,
            Err(ServiceError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_fatal() {
        let svc = failing_services();
        assert!(matches!(
            svc.neighbors.add_neighbors("a", vec!["b".into()]).await,
            Err(ServiceError::Store(_))
        ));
    }
}

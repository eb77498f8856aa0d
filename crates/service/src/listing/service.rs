use tracing::{debug, instrument};

use crate::countries::{Country, CountryRepository};
use crate::errors::ServiceError;
use crate::listing::query::{ListParams, RawListQuery};
use crate::pagination::PageEnvelope;

#[derive(Clone)]
pub struct ListingService {
    countries: CountryRepository,
    default_limit: u32,
    max_limit: u32,
}

impl ListingService {
    pub fn new(countries: CountryRepository, default_limit: u32, max_limit: u32) -> Self {
        Self { countries, default_limit, max_limit }
    }

    pub fn parse_params(&self, raw: &RawListQuery) -> Result<ListParams, ServiceError> {
        ListParams::parse(raw, self.default_limit, self.max_limit)
    }

    /// Retrieve (optionally searching), sort in memory, then cut the page window.
    #[instrument(skip(self), fields(page = params.page, limit = params.limit, sort = params.sort.as_str()))]
    pub async fn list_paginated(&self, params: &ListParams) -> Result<PageEnvelope<Country>, ServiceError> {
        let mut items = match &params.search {
            Some(text) => self.countries.search(text).await?,
            None => self.countries.scan_all().await?,
        };
        params.sort.sort(&mut items);
        let envelope = PageEnvelope::paginate(items, params.pagination());
        debug!(total = envelope.total, returned = envelope.list.len(), "listing_page_built");
        Ok(envelope)
    }

    /// Parse and list in one step.
    pub async fn list_raw(&self, raw: &RawListQuery) -> Result<PageEnvelope<Country>, ServiceError> {
        let params = self.parse_params(raw)?;
        self.list_paginated(&params).await
    }
}

use std::cmp::Ordering;

use serde::Deserialize;

use crate::countries::Country;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Query string as received, before validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub search: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    PopulationDesc,
    PopulationAsc,
    AreaDesc,
    AreaAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::PopulationDesc,
        SortKey::PopulationAsc,
        SortKey::AreaDesc,
        SortKey::AreaAsc,
    ];

    /// Unrecognized or missing values fall back to `NameAsc`.
    pub fn from_param(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim) else { return Self::default() };
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(value))
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::NameAsc => "name_asc",
            SortKey::NameDesc => "name_desc",
            SortKey::PopulationDesc => "population_high_to_low",
            SortKey::PopulationAsc => "population_low_to_high",
            SortKey::AreaDesc => "area_high_to_low",
            SortKey::AreaAsc => "area_low_to_high",
        }
    }

    pub fn compare(self, a: &Country, b: &Country) -> Ordering {
        match self {
            SortKey::NameAsc => cmp_name(a, b),
            SortKey::NameDesc => cmp_name(b, a),
            SortKey::PopulationDesc => b.population.cmp(&a.population),
            SortKey::PopulationAsc => a.population.cmp(&b.population),
            SortKey::AreaDesc => b.area.total_cmp(&a.area),
            SortKey::AreaAsc => a.area.total_cmp(&b.area),
        }
    }

    /// Stable: ties keep scan order.
    pub fn sort(self, items: &mut [Country]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

fn cmp_name(a: &Country, b: &Country) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Validated listing parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub sort: SortKey,
    /// Trimmed search text; `None` when absent or blank.
    pub search: Option<String>,
}

impl ListParams {
    pub fn parse(raw: &RawListQuery, default_limit: u32, max_limit: u32) -> Result<Self, ServiceError> {
        let page = parse_positive("page", raw.page.as_deref(), 1)?;
        let limit = parse_positive("limit", raw.limit.as_deref(), default_limit)?;
        if limit > max_limit {
            return Err(ServiceError::invalid(format!("`limit` must not exceed {max_limit}, got {limit}")));
        }
        let search = raw
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Ok(Self { page, limit, sort: SortKey::from_param(raw.sort_by.as_deref()), search })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination { page: self.page, per_page: self.limit }
    }
}

/// Missing or blank means `default`; anything else must be an integer >= 1.
fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> Result<u32, ServiceError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ServiceError::invalid(format!("`{name}` must be a positive integer, got `{raw}`"))),
    }
}

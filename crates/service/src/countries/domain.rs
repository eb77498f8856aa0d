use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;

/// Stored country record. `id` is assigned by the service at creation and never changes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub country_code: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    pub capital: String,
    pub region: String,
    #[serde(default)]
    pub subregion: String,
    pub area: f64,
    pub population: u64,
    #[serde(default)]
    pub map_url: Option<String>,
    #[serde(default)]
    pub flag: String,
    /// Denormalized hint supplied by callers; the relation store is authoritative.
    #[serde(default)]
    pub neighbors: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建/更新输入模型：不包含 id/时间戳，由服务端生成
///
/// Unknown keys (including a caller-supplied `id`) are ignored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CountryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub country_code: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    pub capital: String,
    pub region: String,
    #[serde(default)]
    pub subregion: String,
    pub area: f64,
    pub population: u64,
    #[serde(default)]
    pub map_url: Option<String>,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub neighbors: Option<Vec<String>>,
}

impl CountryInput {
    /// Every field-level failure, in field order.
    pub fn field_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("currency", &self.currency),
            ("capital", &self.capital),
            ("region", &self.region),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{field} is required"));
            }
        }
        if !self.area.is_finite() || self.area < 0.0 {
            errors.push("area must be a non-negative number".to_string());
        }
        if let Some(code) = &self.country_code {
            if code.trim().is_empty() {
                errors.push("country_code must not be blank when present".to_string());
            }
        }
        errors
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        let errors = self.field_errors();
        if errors.is_empty() { Ok(()) } else { Err(ServiceError::Validation(errors)) }
    }

    /// Parse and validate a single record body. Shape and field failures both
    /// surface as `Validation`.
    pub fn from_json(body: Value) -> Result<CountryInput, ServiceError> {
        let input = serde_json::from_value::<CountryInput>(body)
            .map_err(|e| ServiceError::Validation(vec![e.to_string()]))?;
        input.validate()?;
        Ok(input)
    }

    /// Parse a create-batch body. The body must be a non-empty JSON array; every
    /// element failure is reported with its index.
    pub fn batch_from_json(body: Value) -> Result<Vec<CountryInput>, ServiceError> {
        let Value::Array(items) = body else {
            return Err(ServiceError::invalid("request body must be a JSON array of countries"));
        };
        if items.is_empty() {
            return Err(ServiceError::invalid("request body must contain at least one country"));
        }

        let mut inputs = Vec::with_capacity(items.len());
        let mut failures = Vec::new();
        for (idx, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<CountryInput>(item) {
                Ok(input) => {
                    let errors = input.field_errors();
                    if errors.is_empty() {
                        inputs.push(input);
                    } else {
                        failures.extend(errors.into_iter().map(|e| format!("[{idx}] {e}")));
                    }
                }
                Err(e) => failures.push(format!("[{idx}] {e}")),
            }
        }
        if !failures.is_empty() {
            return Err(ServiceError::Validation(failures));
        }
        Ok(inputs)
    }

    /// Build the stored record: caller fields plus service-owned id and timestamps.
    pub fn into_country(self, id: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Country {
        Country {
            id,
            name: self.name,
            description: self.description,
            country_code: self.country_code,
            currency: self.currency,
            currency_code: self.currency_code,
            currency_symbol: self.currency_symbol,
            capital: self.capital,
            region: self.region,
            subregion: self.subregion,
            area: self.area,
            population: self.population,
            map_url: self.map_url,
            flag: self.flag,
            neighbors: self.neighbors,
            created_at,
            updated_at,
        }
    }
}

/// Public projection of a country used in neighbor listings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NeighborCountry {
    pub id: String,
    pub name: String,
    pub country_code: Option<String>,
    pub currency: String,
    pub currency_code: Option<String>,
    pub currency_symbol: Option<String>,
    pub capital: String,
    pub region: String,
    pub subregion: String,
    pub area: f64,
    pub map_url: Option<String>,
    pub population: u64,
    pub flag: String,
}

impl From<Country> for NeighborCountry {
    fn from(c: Country) -> Self {
        Self {
            id: c.id,
            name: c.name,
            country_code: c.country_code,
            currency: c.currency,
            currency_code: c.currency_code,
            currency_symbol: c.currency_symbol,
            capital: c.capital,
            region: c.region,
            subregion: c.subregion,
            area: c.area,
            map_url: c.map_url,
            population: c.population,
            flag: c.flag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(name: &str) -> Value {
        json!({
            "name": name, "currency": "Euro", "capital": "Paris", "region": "Europe",
            "subregion": "Western Europe", "area": 551695.0, "population": 67391582u64
        })
    }

    #[test]
    fn batch_requires_array() {
        let err = CountryInput::batch_from_json(body("France")).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        let err = CountryInput::batch_from_json(json!([])).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn batch_collects_every_failure_with_index() {
        let mut bad = body("");
        bad["area"] = json!(-1.0);
        let err = CountryInput::batch_from_json(json!([body("France"), bad, {"name": "x"}])).unwrap_err();
        let ServiceError::Validation(errors) = err else { panic!("expected validation error") };
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], "[1] name is required");
        assert_eq!(errors[1], "[1] area must be a non-negative number");
        assert!(errors[2].starts_with("[2] missing field"));
    }

    #[test]
    fn single_body_reports_shape_and_field_failures() {
        assert!(CountryInput::from_json(body("France")).is_ok());
        let Err(ServiceError::Validation(errors)) = CountryInput::from_json(json!({"name": "x"})) else {
            panic!("expected validation error")
        };
        assert!(errors[0].starts_with("missing field"));
        let Err(ServiceError::Validation(errors)) = CountryInput::from_json(body(" ")) else {
            panic!("expected validation error")
        };
        assert_eq!(errors, vec!["name is required"]);
    }

    #[test]
    fn caller_supplied_id_is_ignored() {
        let mut b = body("France");
        b["id"] = json!("chosen-by-caller");
        let inputs = CountryInput::batch_from_json(json!([b])).unwrap();
        let country = inputs[0].clone().into_country("generated".into(), Utc::now(), Utc::now());
        assert_eq!(country.id, "generated");
    }

    #[test]
    fn negative_population_is_a_parse_failure() {
        let mut b = body("France");
        b["population"] = json!(-5);
        assert!(matches!(CountryInput::batch_from_json(json!([b])), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn projection_drops_private_fields() {
        let input: CountryInput = serde_json::from_value(body("France")).unwrap();
        let c = input.into_country("id-1".into(), Utc::now(), Utc::now());
        let n = NeighborCountry::from(c);
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["id"], "id-1");
        assert!(v.get("description").is_none());
        assert!(v.get("created_at").is_none());
        assert!(v.get("neighbors").is_none());
    }
}

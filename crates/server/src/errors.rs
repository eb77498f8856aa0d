use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

use crate::observability::STORE_ERRORS_TOTAL;

/// JSON error body: `{"error": title, "detail": ..., "errors": [...]}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
    pub errors: Vec<String>,
    pub data: Option<Value>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, detail: Option<String>) -> Self {
        Self { status, error: error.to_string(), detail, errors: Vec::new(), data: None }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.error });
        if let Some(detail) = self.detail {
            body["detail"] = Value::String(detail);
        }
        if !self.errors.is_empty() {
            body["errors"] = json!(self.errors);
        }
        if let Some(data) = self.data {
            body["data"] = data;
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let code = e.code();
        match e {
            ServiceError::InvalidInput(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid Input", Some(msg)),
            ServiceError::Validation(errors) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(format!("{} field error(s)", errors.len())))
                    .with_errors(errors)
            }
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::PartialWrite { written, failed } => {
                STORE_ERRORS_TOTAL.inc();
                error!(written = written.len(), failed = failed.len(), code, "batch write incomplete");
                JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Partial Write",
                    Some(format!("{} record(s) written, {} failed", written.len(), failed.len())),
                )
                .with_data(json!({ "written": written, "failed": failed }))
            }
            ServiceError::Store(e) => {
                STORE_ERRORS_TOTAL.inc();
                error!(err = %e, code, "store failure");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string()))
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(err = %rejection.body_text(), "json body rejected");
        match rejection {
            // well-formed JSON with the wrong shape/fields
            JsonRejection::JsonDataError(e) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.body_text()))
            }
            other => JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid JSON", Some(other.body_text())),
        }
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid Input", Some(rejection.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(rejection: PathRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid Input", Some(rejection.body_text()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::errors::StoreError;

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Validation(vec!["a".into()]), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Store(StoreError::Backend("down".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ServiceError::PartialWrite { written: vec!["a".into()], failed: vec!["b".into()] },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn validation_keeps_every_field_error() {
        let e = JsonApiError::from(ServiceError::Validation(vec!["a".into(), "b".into()]));
        assert_eq!(e.error, "Validation Error");
        assert_eq!(e.errors, vec!["a".to_string(), "b".to_string()]);
    }
}

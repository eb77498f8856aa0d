use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "country_api_requests_total",
        "Total API requests by response status class",
        &["status"]
    )
    .expect("register requests_total")
});

pub static NEIGHBORS_ADDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "country_api_neighbors_added_total",
        "Total neighbor pairs inserted"
    )
    .expect("register neighbors_added_total")
});

pub static NEIGHBOR_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "country_api_neighbor_errors_total",
        "Total per-item neighbor addition errors (invalid or duplicate)"
    )
    .expect("register neighbor_errors_total")
});

pub static STORE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "country_api_store_errors_total",
        "Total requests failed by the persistence engine"
    )
    .expect("register store_errors_total")
});

/// Middleware: count API responses by status class.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let class = match response.status().as_u16() {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    REQUESTS_TOTAL.with_label_values(&[class]).inc();
    response
}

pub fn encode_metrics() -> (StatusCode, String) {
    // touch lazies so every family is exported even before first use
    Lazy::force(&REQUESTS_TOTAL);
    Lazy::force(&NEIGHBORS_ADDED_TOTAL);
    Lazy::force(&NEIGHBOR_ERRORS_TOTAL);
    Lazy::force(&STORE_ERRORS_TOTAL);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_exported() {
        NEIGHBORS_ADDED_TOTAL.inc();
        let (status, text) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("country_api_neighbors_added_total"));
        assert!(text.contains("country_api_store_errors_total"));
    }
}

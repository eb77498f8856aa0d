use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::{observability, openapi::ApiDoc, state::AppState};

pub mod countries;
pub mod neighbors;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> impl IntoResponse {
    observability::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: operational endpoints plus the country API.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // Operational routes (health, metrics, docs)
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    // Country and neighbor API
    let api = Router::new()
        .route("/countries", get(countries::list).post(countries::create))
        .route("/countries/paginated", get(countries::list_paginated))
        .route(
            "/countries/:id",
            get(countries::get).put(countries::update).delete(countries::delete),
        )
        .route("/countries/:id/neighbors", get(neighbors::list).post(neighbors::add))
        .route("/countries/:id/neighbors/:neighbor_id", delete(neighbors::remove))
        .route_layer(middleware::from_fn(observability::track_requests));

    public
        .merge(api)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        // one INFO span per request with method and path
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        // status and latency
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        // 5xx at ERROR
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}

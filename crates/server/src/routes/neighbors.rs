use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use service::countries::NeighborCountry;
use service::neighbors::AddNeighborsOutcome;
use tracing::info;

use crate::observability::{NEIGHBORS_ADDED_TOTAL, NEIGHBOR_ERRORS_TOTAL};
use crate::{errors::JsonApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AddNeighborsRequest {
    pub neighbor_ids: Vec<String>,
}

#[utoipa::path(
    post, path = "/countries/{id}/neighbors", tag = "neighbors",
    params(("id" = String, Path, description = "Country ID")),
    request_body = crate::openapi::AddNeighborsRequestDoc,
    responses(
        (status = 200, description = "At least one neighbor added", body = crate::openapi::AddNeighborsResponseDoc),
        (status = 400, description = "Nothing added", body = crate::openapi::AddNeighborsResponseDoc),
        (status = 404, description = "Country not found")
    )
)]
pub async fn add(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, JsonApiError>,
    WithRejection(Json(req), _): WithRejection<Json<AddNeighborsRequest>, JsonApiError>,
) -> Result<(StatusCode, Json<AddNeighborsOutcome>), JsonApiError> {
    let outcome = state.services.neighbors.add_neighbors(&id, req.neighbor_ids).await?;
    NEIGHBORS_ADDED_TOTAL.inc_by(outcome.added.len() as u64);
    NEIGHBOR_ERRORS_TOTAL.inc_by(outcome.errors.len() as u64);

    let status = if outcome.is_rejected() { StatusCode::BAD_REQUEST } else { StatusCode::OK };
    info!(country_id = %id, added = outcome.added.len(), errors = outcome.errors.len(), %status, "add neighbors");
    Ok((status, Json(outcome)))
}

#[utoipa::path(
    get, path = "/countries/{id}/neighbors", tag = "neighbors",
    params(("id" = String, Path, description = "Country ID")),
    responses(
        (status = 200, description = "Denormalized neighbor records"),
        (status = 404, description = "Country not found")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, JsonApiError>,
) -> Result<Json<Vec<NeighborCountry>>, JsonApiError> {
    Ok(Json(state.services.neighbors.get_neighbors(&id).await?))
}

#[utoipa::path(
    delete, path = "/countries/{id}/neighbors/{neighbor_id}", tag = "neighbors",
    params(
        ("id" = String, Path, description = "Country ID"),
        ("neighbor_id" = String, Path, description = "Neighbor country ID")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Country or pair not found")
    )
)]
pub async fn remove(
    State(state): State<AppState>,
    WithRejection(Path((id, neighbor_id)), _): WithRejection<Path<(String, String)>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    state.services.neighbors.remove_neighbor(&id, &neighbor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

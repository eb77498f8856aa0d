use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;
use service::countries::{Country, CountryInput};
use service::listing::RawListQuery;
use service::pagination::PageEnvelope;
use tracing::info;

use crate::{errors::JsonApiError, state::AppState};

#[utoipa::path(
    post, path = "/countries", tag = "countries",
    request_body = [crate::openapi::CountryInputDoc],
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Invalid Input / Validation Error"),
        (status = 500, description = "Store failure or partial write")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, JsonApiError>,
) -> Result<(StatusCode, Json<Vec<Country>>), JsonApiError> {
    let inputs = CountryInput::batch_from_json(body)?;
    let created = state.services.countries.create(inputs).await?;
    info!(count = created.len(), "create countries");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/countries", tag = "countries", responses((status = 200, description = "Unordered full list")))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Country>>, JsonApiError> {
    let list = state.services.countries.list().await?;
    info!(count = list.len(), "list countries");
    Ok(Json(list))
}

#[utoipa::path(
    get, path = "/countries/paginated", tag = "countries",
    params(
        ("page" = Option<u32>, Query, description = "1-based page, default 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 10"),
        ("sort_by" = Option<String>, Query, description = "name_asc | name_desc | population_high_to_low | population_low_to_high | area_high_to_low | area_low_to_high"),
        ("search" = Option<String>, Query, description = "Case-insensitive substring of name, region or subregion")
    ),
    responses(
        (status = 200, description = "Page envelope"),
        (status = 400, description = "Invalid query parameters")
    )
)]
pub async fn list_paginated(
    State(state): State<AppState>,
    WithRejection(Query(raw), _): WithRejection<Query<RawListQuery>, JsonApiError>,
) -> Result<Json<PageEnvelope<Country>>, JsonApiError> {
    let envelope = state.services.listing.list_raw(&raw).await?;
    Ok(Json(envelope))
}

#[utoipa::path(
    get, path = "/countries/{id}", tag = "countries",
    params(("id" = String, Path, description = "Country ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, JsonApiError>,
) -> Result<Json<Country>, JsonApiError> {
    Ok(Json(state.services.countries.get(&id).await?))
}

#[utoipa::path(
    put, path = "/countries/{id}", tag = "countries",
    params(("id" = String, Path, description = "Country ID")),
    request_body = crate::openapi::CountryInputDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, JsonApiError>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, JsonApiError>,
) -> Result<Json<Country>, JsonApiError> {
    // existence is checked before the body is parsed
    let updated = state.services.countries.update(&id, body).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/countries/{id}", tag = "countries",
    params(("id" = String, Path, description = "Country ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    state.services.countries.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

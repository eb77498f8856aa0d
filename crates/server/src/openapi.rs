use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CountryInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub country_code: Option<String>,
    pub currency: String,
    pub currency_code: Option<String>,
    pub currency_symbol: Option<String>,
    pub capital: String,
    pub region: String,
    pub subregion: Option<String>,
    pub area: f64,
    pub population: u64,
    pub map_url: Option<String>,
    pub flag: Option<String>,
    pub neighbors: Option<Vec<String>>,
}

#[derive(ToSchema)]
pub struct AddNeighborsRequestDoc { pub neighbor_ids: Vec<String> }

#[derive(ToSchema)]
pub struct AddNeighborsResponseDoc { pub added: Vec<String>, pub errors: Vec<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::countries::create,
        crate::routes::countries::list,
        crate::routes::countries::list_paginated,
        crate::routes::countries::get,
        crate::routes::countries::update,
        crate::routes::countries::delete,
        crate::routes::neighbors::add,
        crate::routes::neighbors::list,
        crate::routes::neighbors::remove,
    ),
    components(
        schemas(
            HealthResponse,
            CountryInputDoc,
            AddNeighborsRequestDoc,
            AddNeighborsResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "countries"),
        (name = "neighbors")
    )
)]
pub struct ApiDoc;

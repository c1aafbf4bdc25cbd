//! PSGC lookups: regions, then provinces, cities and barangays by parent id.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    errors::Error,
    locations::{Barangay, City, LocationDirectory, Province, Region},
};

fn directory(state: &AppState) -> Result<&Arc<LocationDirectory>, Error> {
    state.locations.as_ref().ok_or_else(|| Error::Internal {
        operation: "load location reference data".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/locations/regions",
    tag = "locations",
    responses(
        (status = 200, description = "All regions", body = [Region]),
        (status = 500, description = "Location data unavailable"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_regions(State(state): State<AppState>) -> Result<Json<Vec<Region>>, Error> {
    Ok(Json(directory(&state)?.regions().to_vec()))
}

#[utoipa::path(
    get,
    path = "/api/locations/regions/{id}/provinces",
    params(("id" = u32, Path, description = "Region id")),
    tag = "locations",
    responses(
        (status = 200, description = "Provinces in the region; empty for an unknown region", body = [Province]),
        (status = 500, description = "Location data unavailable"),
    )
)]
#[tracing::instrument(skip_all, fields(reg_id = id))]
pub async fn list_provinces(State(state): State<AppState>, Path(id): Path<u32>) -> Result<Json<Vec<Province>>, Error> {
    Ok(Json(directory(&state)?.provinces_by_region(id).into_iter().cloned().collect()))
}

#[utoipa::path(
    get,
    path = "/api/locations/provinces/{id}/cities",
    params(("id" = u32, Path, description = "Province id")),
    tag = "locations",
    responses(
        (status = 200, description = "Cities and municipalities in the province", body = [City]),
        (status = 500, description = "Location data unavailable"),
    )
)]
#[tracing::instrument(skip_all, fields(prov_id = id))]
pub async fn list_cities(State(state): State<AppState>, Path(id): Path<u32>) -> Result<Json<Vec<City>>, Error> {
    Ok(Json(directory(&state)?.cities_by_province(id).into_iter().cloned().collect()))
}

#[utoipa::path(
    get,
    path = "/api/locations/cities/{id}/barangays",
    params(("id" = u32, Path, description = "City id")),
    tag = "locations",
    responses(
        (status = 200, description = "Barangays in the city", body = [Barangay]),
        (status = 500, description = "Location data unavailable"),
    )
)]
#[tracing::instrument(skip_all, fields(city_id = id))]
pub async fn list_barangays(State(state): State<AppState>, Path(id): Path<u32>) -> Result<Json<Vec<Barangay>>, Error> {
    Ok(Json(directory(&state)?.barangays_by_city(id).into_iter().cloned().collect()))
}

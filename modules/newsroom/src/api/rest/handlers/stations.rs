use super::listed;
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::{NewStation, StationFilter, StationPatch};
use crate::domain::Service;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_stations(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<StationListQuery>,
) -> Result<Json<ListResponse<StationDto>>, Problem> {
    let filter = StationFilter::try_from(&query)?;
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let stations = service
        .list_stations(&user.principal, &filter, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(stations.into()))
}

pub async fn create_station(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateStationRequest>,
) -> Result<(StatusCode, Json<StationDto>), Problem> {
    let new = NewStation::try_from(req)?;
    let station = service
        .create_station(&user.principal, new)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(station.into())))
}

pub async fn get_station(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StationDto>, Problem> {
    let station = service
        .get_station(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(station.into()))
}

pub async fn update_station(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateStationRequest>,
) -> Result<Json<StationDto>, Problem> {
    let patch = StationPatch::try_from(req)?;
    let station = service
        .update_station(&user.principal, id, patch)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(station.into()))
}

/// Deactivates the station together with all of its users
pub async fn delete_station(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .deactivate_station(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_station_users(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ListResponse<UserDto>>, Problem> {
    let users = service
        .list_station_users(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(users)))
}

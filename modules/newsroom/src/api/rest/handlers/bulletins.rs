use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::NewBulletin;
use crate::domain::Service;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_bulletins(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<BulletinListQuery>,
) -> Result<Json<ListResponse<BulletinDto>>, Problem> {
    let status = query.status()?;
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let bulletins = service
        .list_bulletins(&user.principal, status, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(bulletins.into()))
}

pub async fn create_bulletin(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateBulletinRequest>,
) -> Result<(StatusCode, Json<BulletinDto>), Problem> {
    let bulletin = service
        .create_bulletin(&user.principal, NewBulletin::from(req))
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(bulletin.into())))
}

pub async fn get_bulletin(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<BulletinDto>, Problem> {
    let bulletin = service
        .get_bulletin(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(bulletin.into()))
}

pub async fn update_bulletin(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateBulletinRequest>,
) -> Result<Json<BulletinDto>, Problem> {
    let bulletin = service
        .update_bulletin(&user.principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(bulletin.into()))
}

pub async fn delete_bulletin(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_bulletin(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the running order
pub async fn set_stories(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<BulletinStoriesRequest>,
) -> Result<Json<BulletinDto>, Problem> {
    let bulletin = service
        .set_bulletin_stories(&user.principal, id, &req.story_ids)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(bulletin.into()))
}

pub async fn change_status(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<BulletinStatusRequest>,
) -> Result<Json<BulletinDto>, Problem> {
    let to = req.target()?;
    let bulletin = service
        .change_bulletin_status(&user.principal, id, to)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(bulletin.into()))
}

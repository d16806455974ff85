use super::listed;
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, CurrentUser, ValidJson};
use crate::contract::{AnnouncementPatch, NewAnnouncement};
use crate::domain::Service;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

/// Active announcements for the caller's audience, with their dismissal state
pub async fn list_announcements(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
) -> Result<Json<ListResponse<AnnouncementViewDto>>, Problem> {
    let views = service
        .list_announcements_for(&user.principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(views)))
}

pub async fn create_announcement(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementDto>), Problem> {
    let new = NewAnnouncement::try_from(req)?;
    let announcement = service
        .create_announcement(&user.principal, new)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(announcement.into())))
}

pub async fn update_announcement(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateAnnouncementRequest>,
) -> Result<Json<AnnouncementDto>, Problem> {
    let patch = AnnouncementPatch::try_from(req)?;
    let announcement = service
        .update_announcement(&user.principal, id, patch)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(announcement.into()))
}

pub async fn delete_announcement(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_announcement(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dismiss_announcement(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .dismiss_announcement(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

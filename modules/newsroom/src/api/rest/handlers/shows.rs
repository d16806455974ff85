//! Shows and their episodes

use super::{listed, read_upload};
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::{EpisodePatch, NewEpisode, NewShow};
use crate::domain::Service;
use axum::extract::Multipart;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

// ===== Shows =====

pub async fn list_shows(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ShowListQuery>,
) -> Result<Json<ListResponse<ShowDto>>, Problem> {
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let shows = service
        .list_shows(&user.principal, query.active_only, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(shows.into()))
}

pub async fn create_show(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateShowRequest>,
) -> Result<(StatusCode, Json<ShowDto>), Problem> {
    let show = service
        .create_show(&user.principal, NewShow::from(req))
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(show.into())))
}

pub async fn get_show(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ShowDto>, Problem> {
    let show = service
        .get_show(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(show.into()))
}

pub async fn update_show(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateShowRequest>,
) -> Result<Json<ShowDto>, Problem> {
    let show = service
        .update_show(&user.principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(show.into()))
}

pub async fn delete_show(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_show(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Episodes =====

pub async fn list_episodes(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(show_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<EpisodeListQuery>,
) -> Result<Json<ListResponse<EpisodeDto>>, Problem> {
    let status = query.status()?;
    let episodes = service
        .list_episodes(&user.principal, show_id, status)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(episodes)))
}

/// Episode numbers are assigned per show in creation order
pub async fn create_episode(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(show_id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<CreateEpisodeRequest>,
) -> Result<(StatusCode, Json<EpisodeDto>), Problem> {
    let episode = service
        .create_episode(&user.principal, show_id, NewEpisode::from(req))
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(episode.into())))
}

pub async fn update_episode(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateEpisodeRequest>,
) -> Result<Json<EpisodeDto>, Problem> {
    let patch = EpisodePatch::try_from(req)?;
    let episode = service
        .update_episode(&user.principal, id, patch)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(episode.into()))
}

pub async fn delete_episode(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_episode(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replaces any audio already attached to the episode
pub async fn upload_episode_audio(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<EpisodeDto>, Problem> {
    let upload = read_upload(multipart).await?;
    let episode = service
        .upload_episode_audio(&user.principal, id, upload)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(episode.into()))
}

pub async fn publish_episode(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<EpisodeDto>, Problem> {
    let episode = service
        .publish_episode(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(episode.into()))
}

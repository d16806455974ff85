//! Stories, workflow moves, translations and audio

use super::read_upload;
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::{NewStory, StatusChange, StoryFilter};
use crate::domain::Service;
use axum::extract::Multipart;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_stories(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<StoryListQuery>,
) -> Result<Json<ListResponse<StoryDto>>, Problem> {
    let mut filter = StoryFilter::try_from(&query)?;
    if query.mine {
        filter.author_id = Some(user.principal.user_id);
    }
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let stories = service
        .list_stories(&user.principal, &filter, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(stories.into()))
}

pub async fn create_story(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateStoryRequest>,
) -> Result<(StatusCode, Json<StoryDto>), Problem> {
    let story = service
        .create_story(&user.principal, NewStory::from(req))
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(story.into())))
}

pub async fn get_story(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StoryDetailsDto>, Problem> {
    let details = service
        .get_story(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(details.into()))
}

pub async fn get_story_by_slug(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<StoryDetailsDto>, Problem> {
    let details = service
        .get_story_by_slug(&user.principal, &slug)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(details.into()))
}

pub async fn update_story(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateStoryRequest>,
) -> Result<Json<StoryDto>, Problem> {
    let story = service
        .update_story(&user.principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(story.into()))
}

pub async fn delete_story(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_story(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_status(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<StatusChangeRequest>,
) -> Result<Json<StoryDto>, Problem> {
    let change = StatusChange::try_from(req)?;
    let story = service
        .change_status(&user.principal, id, change)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(story.into()))
}

pub async fn create_translation(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<TranslationRequest>,
) -> Result<(StatusCode, Json<StoryDto>), Problem> {
    let translation = service
        .create_translation(&user.principal, id, req.language_id)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(translation.into())))
}

/// `multipart/form-data` with a `file` part
pub async fn upload_audio(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AudioClipDto>), Problem> {
    let upload = read_upload(multipart).await?;
    let clip = service
        .attach_audio(&user.principal, id, upload)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(clip.into())))
}

pub async fn delete_audio(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath((id, clip_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, Problem> {
    service
        .remove_audio(&user.principal, id, clip_id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

use super::listed;
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, CurrentUser, ValidJson};
use crate::contract::NewComment;
use crate::domain::Service;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_comments(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(story_id): ApiPath<Uuid>,
) -> Result<Json<ListResponse<CommentDto>>, Problem> {
    let comments = service
        .list_comments(&user.principal, story_id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(comments)))
}

pub async fn add_comment(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(story_id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentDto>), Problem> {
    let new = NewComment::try_from(req)?;
    let comment = service
        .add_comment(&user.principal, story_id, new)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

pub async fn update_comment(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateCommentRequest>,
) -> Result<Json<CommentDto>, Problem> {
    let comment = service
        .update_comment(&user.principal, id, &req.content)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(comment.into()))
}

pub async fn delete_comment(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_comment(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn resolve_comment(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CommentDto>, Problem> {
    let comment = service
        .resolve_comment(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(comment.into()))
}

use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::{NewUser, UserFilter, UserPatch};
use crate::domain::Service;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_users(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<ListResponse<UserDto>>, Problem> {
    let filter = UserFilter::try_from(&query)?;
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let users = service
        .list_users(&user.principal, &filter, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(users.into()))
}

/// Create a user; a welcome email with a set-password link is sent
pub async fn create_user(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), Problem> {
    let new = NewUser::try_from(req)?;
    let created = service
        .create_user(&user.principal, new)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn get_user(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<UserDto>, Problem> {
    let found = service
        .get_user(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(found.into()))
}

pub async fn update_user(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, Problem> {
    let patch = UserPatch::try_from(req)?;
    let updated = service
        .update_user(&user.principal, id, patch)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(updated.into()))
}

/// Soft delete: the user is deactivated and signed out
pub async fn delete_user(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .deactivate_user(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

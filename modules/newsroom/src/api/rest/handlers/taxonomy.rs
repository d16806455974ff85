//! Categories, classifications and tags

use super::listed;
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::{NewClassification, NewCategory};
use crate::domain::Service;
use axum::response::{IntoResponse, Response};
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

// ===== Categories =====

/// Flat list, or the nested tree with `?tree=true`
pub async fn list_categories(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<CategoryListQuery>,
) -> Result<Response, Problem> {
    if query.tree {
        let tree = service
            .category_tree(&user.principal)
            .await
            .map_err(map_domain_error)?;
        let body: ListResponse<CategoryNodeDto> = listed(tree);
        return Ok(Json(body).into_response());
    }

    let categories = service
        .list_categories(&user.principal)
        .await
        .map_err(map_domain_error)?;
    let body: ListResponse<CategoryDto> = listed(categories);
    Ok(Json(body).into_response())
}

pub async fn create_category(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>), Problem> {
    let category = service
        .create_category(&user.principal, NewCategory::from(req))
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn update_category(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryDto>, Problem> {
    let category = service
        .update_category(&user.principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(category.into()))
}

pub async fn delete_category(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_category(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Classifications =====

pub async fn list_classifications(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<ClassificationListQuery>,
) -> Result<Json<ListResponse<ClassificationDto>>, Problem> {
    let kind = query.kind()?;
    let classifications = service
        .list_classifications(&user.principal, kind)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(classifications)))
}

pub async fn create_classification(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateClassificationRequest>,
) -> Result<(StatusCode, Json<ClassificationDto>), Problem> {
    let new = NewClassification::try_from(req)?;
    let classification = service
        .create_classification(&user.principal, new)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(classification.into())))
}

pub async fn update_classification(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateClassificationRequest>,
) -> Result<Json<ClassificationDto>, Problem> {
    let classification = service
        .update_classification(&user.principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(classification.into()))
}

pub async fn delete_classification(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_classification(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Tags =====

pub async fn list_tags(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<TagListQuery>,
) -> Result<Json<ListResponse<TagDto>>, Problem> {
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let tags = service
        .list_tags(&user.principal, query.search.as_deref(), page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(tags.into()))
}

pub async fn create_tag(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<TagRequest>,
) -> Result<(StatusCode, Json<TagDto>), Problem> {
    let tag = service
        .create_tag(&user.principal, &req.name)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}

pub async fn update_tag(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<TagRequest>,
) -> Result<Json<TagDto>, Problem> {
    let tag = service
        .update_tag(&user.principal, id, &req.name)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(tag.into()))
}

pub async fn delete_tag(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_tag(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

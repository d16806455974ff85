use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::{NewTask, TaskFilter, TaskPatch};
use crate::domain::Service;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

/// Ordered by due date (unset last), then priority, then age
pub async fn list_tasks(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<ListResponse<TaskDto>>, Problem> {
    let mut filter = TaskFilter::try_from(&query)?;
    if query.mine {
        filter.assigned_to_id = Some(user.principal.user_id);
    }
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let tasks = service
        .list_tasks(&user.principal, &filter, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(tasks.into()))
}

pub async fn create_task(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskDto>), Problem> {
    let new = NewTask::try_from(req)?;
    let task = service
        .create_task(&user.principal, new)
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

pub async fn get_task(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<TaskDto>, Problem> {
    let task = service
        .get_task(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(task.into()))
}

pub async fn update_task(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> Result<Json<TaskDto>, Problem> {
    let patch = TaskPatch::try_from(req)?;
    let task = service
        .update_task(&user.principal, id, patch)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(task.into()))
}

pub async fn delete_task(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_task(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

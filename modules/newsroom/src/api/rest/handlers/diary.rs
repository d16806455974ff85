use super::listed;
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser, ValidJson};
use crate::contract::{DiaryQuery, NewDiaryEntry};
use crate::domain::Service;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use uuid::Uuid;

pub async fn list_entries(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<DiaryListQuery>,
) -> Result<Json<ListResponse<DiaryEntryDto>>, Problem> {
    let assigned_to = if query.mine {
        Some(user.principal.user_id)
    } else {
        query.assigned_to
    };
    let diary_query = DiaryQuery {
        from: query.from,
        to: query.to,
        assigned_to,
    };
    let entries = service
        .list_diary_entries(&user.principal, &diary_query)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(entries)))
}

pub async fn create_entry(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<CreateDiaryEntryRequest>,
) -> Result<(StatusCode, Json<DiaryEntryDto>), Problem> {
    let entry = service
        .create_diary_entry(&user.principal, NewDiaryEntry::from(req))
        .await
        .map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

pub async fn update_entry(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(req): ValidJson<UpdateDiaryEntryRequest>,
) -> Result<Json<DiaryEntryDto>, Problem> {
    let entry = service
        .update_diary_entry(&user.principal, id, req.into())
        .await
        .map_err(map_domain_error)?;
    Ok(Json(entry.into()))
}

pub async fn delete_entry(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, Problem> {
    service
        .delete_diary_entry(&user.principal, id)
        .await
        .map_err(map_domain_error)?;
    Ok(StatusCode::NO_CONTENT)
}

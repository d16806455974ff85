//! Audit trail and super-admin diagnostics

use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiQuery, CurrentUser};
use crate::contract::AuditFilter;
use crate::domain::Service;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn list_audit_logs(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<AuditListQuery>,
) -> Result<Json<ListResponse<AuditEntryDto>>, Problem> {
    let filter = AuditFilter::from(&query);
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let entries = service
        .list_audit_logs(&user.principal, &filter, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(entries.into()))
}

/// Always 200 for a super admin; failing checks are reported in the body
pub async fn run_diagnostics(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
) -> Result<Json<DiagnosticsResponse>, Problem> {
    let checks = service
        .run_diagnostics(&user.principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(checks.into()))
}

use crate::api::rest::dto::HealthResponse;
use crate::api::rest::openapi::ApiDoc;
use axum::Json;
use utoipa::OpenApi;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

//! HTTP request handlers - thin layer that delegates to domain service

pub mod admin;
pub mod announcements;
pub mod auth;
pub mod bulletins;
pub mod comments;
pub mod diary;
pub mod events;
pub mod radio;
pub mod shows;
pub mod stations;
pub mod stories;
pub mod system;
pub mod tasks;
pub mod taxonomy;
pub mod users;

use super::dto::ListResponse;
use super::error::Problem;
use crate::contract::{NewsroomError, Upload};
use axum::extract::Multipart;

/// Wrap an unpaged result in the list envelope
pub(crate) fn listed<T, U: From<T>>(items: Vec<T>) -> ListResponse<U> {
    ListResponse::single_page(items.into_iter().map(U::from).collect())
}

/// Read the `file` part of a multipart upload
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<Upload, Problem> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Problem::new(e.status(), "Invalid Upload").with_detail(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Problem::new(e.status(), "Invalid Upload").with_detail(e.body_text()))?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(NewsroomError::invalid_field("file", "a multipart field named 'file' is required").into())
}

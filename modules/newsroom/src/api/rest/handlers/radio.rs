//! Content feed for radio station users

use super::listed;
use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{ApiPath, ApiQuery, CurrentUser};
use crate::contract::FeedQuery;
use crate::domain::Service;
use axum::{Extension, Json};
use std::sync::Arc;

/// Published stories the caller's station may receive
pub async fn list_stories(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<FeedQueryParams>,
) -> Result<Json<ListResponse<StoryDto>>, Problem> {
    let feed = FeedQuery::from(&query);
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let stories = service
        .radio_stories(&user.principal, &feed, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(stories.into()))
}

pub async fn get_story(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<StoryDetailsDto>, Problem> {
    let details = service
        .radio_story(&user.principal, &slug)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(details.into()))
}

pub async fn list_shows(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
) -> Result<Json<ListResponse<ShowDto>>, Problem> {
    let shows = service
        .radio_shows(&user.principal)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(shows)))
}

pub async fn list_episodes(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<ListResponse<EpisodeDto>>, Problem> {
    let episodes = service
        .radio_episodes(&user.principal, &slug)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(listed(episodes)))
}

pub async fn list_bulletins(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<ListResponse<BulletinDto>>, Problem> {
    let page = service
        .checked_page_request(query.page, query.per_page)
        .map_err(map_domain_error)?;
    let bulletins = service
        .radio_bulletins(&user.principal, page)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(bulletins.into()))
}

//! Domain service - business logic orchestration
//!
//! `Service` is the single entry point for every newsroom operation. Each
//! submodule adds one `impl Service` block for its area.

mod announcements;
mod audit;
mod auth;
mod bulletins;
mod comments;
mod diagnostics;
mod diary;
mod radio;
mod shows;
mod stations;
mod stories;
mod taxonomy;
mod tasks;
mod users;

use super::collaborators::{BlobStore, Mailer};
use super::events::{Channel, ContentEvent, EventKind, EventPublisher};
use super::repository::Repositories;
use super::slug::{next_free_slug, slugify};
use crate::config::Config;
use crate::contract::{AuditEntry, FieldError, NewsroomError, PageRequest, User, UserType};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Domain service for the newsroom
pub struct Service {
    repos: Repositories,
    events: Arc<dyn EventPublisher>,
    blobs: Arc<dyn BlobStore>,
    mailer: Arc<dyn Mailer>,
    config: Arc<Config>,
}

/// Which table a slug must be unique in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlugScope {
    Story,
    Category,
    Classification,
    Tag,
    Show,
    /// Episode slugs are unique per show
    Episode(Uuid),
    Bulletin,
}

/// Log an infrastructure failure and hide it behind `Internal`
pub(crate) fn internal(err: anyhow::Error) -> NewsroomError {
    tracing::error!(error = ?err, "newsroom storage failure");
    NewsroomError::Internal
}

impl Service {
    pub fn new(
        repos: Repositories,
        events: Arc<dyn EventPublisher>,
        blobs: Arc<dyn BlobStore>,
        mailer: Arc<dyn Mailer>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            repos,
            events,
            blobs,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Page request with the configured default and maximum page size
    pub fn page_request(&self, page: Option<u64>, per_page: Option<u64>) -> PageRequest {
        PageRequest::clamped(
            page,
            per_page,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    /// Like `page_request`, but refuses page numbers past `PageRequest::MAX_PAGE`
    pub fn checked_page_request(
        &self,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> Result<PageRequest, NewsroomError> {
        if page.is_some_and(|p| p > PageRequest::MAX_PAGE) {
            return Err(NewsroomError::invalid_field(
                "page",
                format!("must not exceed {}", PageRequest::MAX_PAGE),
            ));
        }
        Ok(self.page_request(page, per_page))
    }

    /// Publish an event; failures are logged and swallowed
    pub(crate) async fn publish(
        &self,
        channel: Channel,
        kind: EventKind,
        entity_id: Uuid,
        payload: serde_json::Value,
    ) {
        let event = ContentEvent::new(kind, entity_id, payload);
        if let Err(e) = self.events.publish(channel, event).await {
            tracing::warn!(
                error = %e,
                %channel,
                event = kind.as_str(),
                "failed to publish content event"
            );
        }
    }

    /// Write an audit entry; failures are logged and swallowed
    pub(crate) async fn record_audit(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Option<String>,
        details: serde_json::Value,
    ) {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            user_id,
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            details,
            created_at: Utc::now(),
        };
        if let Err(e) = self.repos.audit.insert(&entry).await {
            tracing::warn!(error = %e, action, "failed to write audit entry");
        }
    }

    /// Remove a stored file; failures are logged and swallowed
    pub(crate) async fn discard_blob(&self, url: &str) {
        if let Err(e) = self.blobs.delete(url).await {
            tracing::warn!(error = %e, url, "failed to delete stored file");
        }
    }

    /// Slug for `text` that is free in `scope`, ignoring the row `exclude`
    pub(crate) async fn unique_slug(
        &self,
        scope: SlugScope,
        text: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, NewsroomError> {
        let base = slugify(text);
        let taken = match scope {
            SlugScope::Story => self.repos.stories.slugs_with_prefix(&base).await,
            SlugScope::Category => self.repos.categories.slugs_with_prefix(&base).await,
            SlugScope::Classification => self.repos.classifications.slugs_with_prefix(&base).await,
            SlugScope::Tag => self.repos.tags.slugs_with_prefix(&base).await,
            SlugScope::Show => self.repos.shows.show_slugs_with_prefix(&base).await,
            SlugScope::Episode(show_id) => {
                self.repos
                    .shows
                    .episode_slugs_with_prefix(show_id, &base)
                    .await
            }
            SlugScope::Bulletin => self.repos.bulletins.slugs_with_prefix(&base).await,
        }
        .map_err(internal)?;

        let existing: Vec<String> = taken
            .into_iter()
            .filter(|(id, _)| Some(*id) != exclude)
            .map(|(_, slug)| slug)
            .collect();
        Ok(next_free_slug(&base, &existing))
    }

    /// Active staff users among `ids`, failing with the ids that are not
    pub(crate) async fn require_active_staff(
        &self,
        field: &str,
        ids: &[Uuid],
    ) -> Result<Vec<User>, NewsroomError> {
        let found = self.repos.users.find_many(ids).await.map_err(internal)?;
        let valid: HashSet<Uuid> = found
            .iter()
            .filter(|u| u.is_active && u.user_type == UserType::Staff)
            .map(|u| u.id)
            .collect();

        let invalid: Vec<Uuid> = ids.iter().copied().filter(|id| !valid.contains(id)).collect();
        if !invalid.is_empty() {
            let listed: Vec<String> = invalid.iter().map(Uuid::to_string).collect();
            return Err(NewsroomError::Validation {
                message: format!("not active staff users: {}", listed.join(", ")),
                details: listed
                    .into_iter()
                    .map(|id| FieldError::new(field, format!("{} is not an active staff user", id)))
                    .collect(),
            });
        }
        Ok(found.into_iter().filter(|u| valid.contains(&u.id)).collect())
    }

    /// Purge expired sessions; returns how many were removed
    pub async fn purge_expired_sessions(&self) -> Result<u64, NewsroomError> {
        self.repos
            .auth
            .purge_expired_sessions(Utc::now())
            .await
            .map_err(internal)
    }
}

/// Collapse duplicates while keeping first-seen order
pub(crate) fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(&[b, a, b, a]), vec![b, a]);
    }
}

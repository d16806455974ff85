//! Audio shows and their episodes

use super::{internal, Service, SlugScope};
use crate::contract::{
    Episode, EpisodePatch, EpisodeStatus, NewEpisode, NewShow, NewsroomError, Page, PageRequest,
    Principal, Show, ShowPatch, Upload,
};
use crate::domain::collaborators::UploadRequest;
use crate::domain::events::{Channel, EventKind};
use crate::domain::permissions::{require, CrudAction, Resource};
use crate::domain::validation::{required_text, validate_audio};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Service {
    pub(crate) async fn load_show(&self, id: Uuid) -> Result<Show, NewsroomError> {
        self.repos
            .shows
            .find_show(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("show", id))
    }

    async fn load_episode(&self, id: Uuid) -> Result<Episode, NewsroomError> {
        self.repos
            .shows
            .find_episode(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("episode", id))
    }

    async fn check_show_category(&self, category_id: Option<Uuid>) -> Result<(), NewsroomError> {
        if let Some(id) = category_id {
            if self.repos.categories.find_by_id(id).await.map_err(internal)?.is_none() {
                return Err(NewsroomError::invalid_field(
                    "category_id",
                    format!("category {} does not exist", id),
                ));
            }
        }
        Ok(())
    }

    // ===== Shows =====

    pub async fn create_show(&self, principal: &Principal, new: NewShow) -> Result<Show, NewsroomError> {
        require(principal, Resource::Show, CrudAction::Create)?;
        let title = required_text("title", &new.title)?;
        self.check_show_category(new.category_id).await?;

        let now = Utc::now();
        let show = Show {
            id: Uuid::new_v4(),
            slug: self.unique_slug(SlugScope::Show, &title, None).await?,
            title,
            description: clean(new.description),
            category_id: new.category_id,
            cover_image_url: clean(new.cover_image_url),
            is_active: true,
            created_by: principal.user_id,
            created_at: now,
            updated_at: now,
        };
        let created = self.repos.shows.insert_show(&show).await.map_err(internal)?;
        tracing::info!(show_id = %created.id, "show created");
        Ok(created)
    }

    pub async fn get_show(&self, principal: &Principal, id: Uuid) -> Result<Show, NewsroomError> {
        require(principal, Resource::Show, CrudAction::Read)?;
        self.load_show(id).await
    }

    pub async fn list_shows(
        &self,
        principal: &Principal,
        active_only: bool,
        page: PageRequest,
    ) -> Result<Page<Show>, NewsroomError> {
        require(principal, Resource::Show, CrudAction::Read)?;
        self.repos
            .shows
            .list_shows(active_only, page)
            .await
            .map_err(internal)
    }

    pub async fn update_show(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: ShowPatch,
    ) -> Result<Show, NewsroomError> {
        require(principal, Resource::Show, CrudAction::Update)?;
        let mut show = self.load_show(id).await?;

        if let Some(title) = patch.title {
            let title = required_text("title", &title)?;
            if title != show.title {
                show.slug = self.unique_slug(SlugScope::Show, &title, Some(id)).await?;
                show.title = title;
            }
        }
        if let Some(description) = patch.description {
            show.description = clean(description);
        }
        if let Some(category_id) = patch.category_id {
            self.check_show_category(category_id).await?;
            show.category_id = category_id;
        }
        if let Some(cover) = patch.cover_image_url {
            show.cover_image_url = clean(cover);
        }
        if let Some(active) = patch.is_active {
            show.is_active = active;
        }
        show.updated_at = Utc::now();
        self.repos.shows.update_show(&show).await.map_err(internal)
    }

    /// Refused while the show still has episodes
    pub async fn delete_show(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        require(principal, Resource::Show, CrudAction::Delete)?;
        let show = self.load_show(id).await?;
        let episodes = self.repos.shows.count_episodes(id).await.map_err(internal)?;
        if episodes > 0 {
            return Err(NewsroomError::conflict(format!(
                "show {} still has {} episodes",
                show.title, episodes
            )));
        }
        self.repos.shows.delete_show(id).await.map_err(internal)
    }

    // ===== Episodes =====

    pub async fn create_episode(
        &self,
        principal: &Principal,
        show_id: Uuid,
        new: NewEpisode,
    ) -> Result<Episode, NewsroomError> {
        require(principal, Resource::Episode, CrudAction::Create)?;
        let show = self.load_show(show_id).await?;
        let title = required_text("title", &new.title)?;
        if new.duration_seconds.is_some_and(|d| d < 0) {
            return Err(NewsroomError::invalid_field(
                "duration_seconds",
                "duration cannot be negative",
            ));
        }

        let number = self
            .repos
            .shows
            .max_episode_number(show.id)
            .await
            .map_err(internal)?
            + 1;
        let now = Utc::now();
        let episode = Episode {
            id: Uuid::new_v4(),
            show_id: show.id,
            slug: self
                .unique_slug(SlugScope::Episode(show.id), &title, None)
                .await?,
            title,
            description: clean(new.description),
            episode_number: number,
            status: EpisodeStatus::Draft,
            audio_url: None,
            audio_pathname: None,
            file_size: None,
            duration_seconds: new.duration_seconds,
            published_at: None,
            created_by: principal.user_id,
            created_at: now,
            updated_at: now,
        };
        self.repos
            .shows
            .insert_episode(&episode)
            .await
            .map_err(internal)
    }

    pub async fn list_episodes(
        &self,
        principal: &Principal,
        show_id: Uuid,
        status: Option<EpisodeStatus>,
    ) -> Result<Vec<Episode>, NewsroomError> {
        require(principal, Resource::Episode, CrudAction::Read)?;
        self.load_show(show_id).await?;
        self.repos
            .shows
            .list_episodes(show_id, status)
            .await
            .map_err(internal)
    }

    pub async fn update_episode(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: EpisodePatch,
    ) -> Result<Episode, NewsroomError> {
        require(principal, Resource::Episode, CrudAction::Update)?;
        let mut episode = self.load_episode(id).await?;

        if let Some(title) = patch.title {
            let title = required_text("title", &title)?;
            if title != episode.title {
                episode.slug = self
                    .unique_slug(SlugScope::Episode(episode.show_id), &title, Some(id))
                    .await?;
                episode.title = title;
            }
        }
        if let Some(description) = patch.description {
            episode.description = clean(description);
        }
        if let Some(duration) = patch.duration_seconds {
            if duration.is_some_and(|d| d < 0) {
                return Err(NewsroomError::invalid_field(
                    "duration_seconds",
                    "duration cannot be negative",
                ));
            }
            episode.duration_seconds = duration;
        }
        if let Some(status) = patch.status {
            if status == EpisodeStatus::Published && episode.status != EpisodeStatus::Published {
                return Err(NewsroomError::invalid_field(
                    "status",
                    "use the publish operation to publish an episode",
                ));
            }
            episode.status = status;
        }
        episode.updated_at = Utc::now();
        self.repos
            .shows
            .update_episode(&episode)
            .await
            .map_err(internal)
    }

    /// Delete an episode and its audio file
    pub async fn delete_episode(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        require(principal, Resource::Episode, CrudAction::Delete)?;
        let episode = self.load_episode(id).await?;
        self.repos.shows.delete_episode(id).await.map_err(internal)?;
        if let Some(url) = &episode.audio_url {
            self.discard_blob(url).await;
        }
        Ok(())
    }

    /// Store new audio for an episode, replacing any previous file
    pub async fn upload_episode_audio(
        &self,
        principal: &Principal,
        id: Uuid,
        upload: Upload,
    ) -> Result<Episode, NewsroomError> {
        require(principal, Resource::Episode, CrudAction::Update)?;
        let mut episode = self.load_episode(id).await?;
        validate_audio(&upload, &self.config)?;

        let stored = self
            .blobs
            .upload(UploadRequest {
                file_name: upload.file_name,
                content_type: upload.content_type,
                bytes: upload.bytes,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, episode_id = %id, "episode audio upload failed");
                NewsroomError::delivery("audio storage rejected the upload")
            })?;

        let previous = episode.audio_url.replace(stored.url.clone());
        episode.audio_pathname = Some(stored.pathname);
        episode.file_size = Some(i64::try_from(stored.size).unwrap_or(i64::MAX));
        episode.updated_at = Utc::now();

        match self.repos.shows.update_episode(&episode).await {
            Ok(updated) => {
                if let Some(old) = previous {
                    self.discard_blob(&old).await;
                }
                Ok(updated)
            }
            Err(e) => {
                self.discard_blob(&stored.url).await;
                Err(internal(e))
            }
        }
    }

    pub async fn publish_episode(&self, principal: &Principal, id: Uuid) -> Result<Episode, NewsroomError> {
        require(principal, Resource::Episode, CrudAction::Update)?;
        let mut episode = self.load_episode(id).await?;
        let show = self.load_show(episode.show_id).await?;

        if episode.audio_url.is_none() {
            return Err(NewsroomError::validation(
                "an episode needs audio before it can be published",
            ));
        }
        if !show.is_active {
            return Err(NewsroomError::validation(format!(
                "show {} is inactive",
                show.title
            )));
        }
        if episode.status == EpisodeStatus::Published {
            return Ok(episode);
        }

        let now = Utc::now();
        episode.status = EpisodeStatus::Published;
        episode.published_at = Some(now);
        episode.updated_at = now;
        let published = self
            .repos
            .shows
            .update_episode(&episode)
            .await
            .map_err(internal)?;

        self.publish(
            Channel::Radio,
            EventKind::EpisodePublished,
            published.id,
            json!({
                "show_slug": show.slug,
                "episode_slug": published.slug,
                "episode_number": published.episode_number,
            }),
        )
        .await;
        tracing::info!(episode_id = %published.id, show_id = %show.id, "episode published");
        Ok(published)
    }
}

//! News bulletins: running orders of published stories

use super::{dedup_ids, internal, Service, SlugScope};
use crate::contract::{
    Bulletin, BulletinPatch, BulletinStatus, ClassificationType, NewBulletin, NewsroomError, Page,
    PageRequest, Principal, StaffRole, StoryStatus,
};
use crate::domain::events::{Channel, EventKind};
use crate::domain::permissions::{require, CrudAction, Resource};
use crate::domain::validation::required_text;
use crate::domain::workflow::check_bulletin_transition;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

impl Service {
    pub(crate) async fn load_bulletin(&self, id: Uuid) -> Result<Bulletin, NewsroomError> {
        self.repos
            .bulletins
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("bulletin", id))
    }

    async fn check_language(&self, id: Uuid) -> Result<(), NewsroomError> {
        let language = self
            .repos
            .classifications
            .find_by_id(id)
            .await
            .map_err(internal)?;
        match language {
            Some(c) if c.kind == ClassificationType::Language => Ok(()),
            _ => Err(NewsroomError::invalid_field(
                "language_id",
                format!("{} is not a language classification", id),
            )),
        }
    }

    pub async fn create_bulletin(
        &self,
        principal: &Principal,
        new: NewBulletin,
    ) -> Result<Bulletin, NewsroomError> {
        require(principal, Resource::Bulletin, CrudAction::Create)?;
        let title = required_text("title", &new.title)?;
        self.check_language(new.language_id).await?;

        let now = Utc::now();
        let bulletin = Bulletin {
            id: Uuid::new_v4(),
            slug: self.unique_slug(SlugScope::Bulletin, &title, None).await?,
            title,
            intro: new.intro.filter(|s| !s.trim().is_empty()),
            outro: new.outro.filter(|s| !s.trim().is_empty()),
            language_id: new.language_id,
            status: BulletinStatus::Draft,
            scheduled_for: new.scheduled_for,
            author_id: principal.user_id,
            reviewer_id: None,
            published_at: None,
            story_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.repos.bulletins.insert(&bulletin).await.map_err(internal)
    }

    pub async fn get_bulletin(&self, principal: &Principal, id: Uuid) -> Result<Bulletin, NewsroomError> {
        require(principal, Resource::Bulletin, CrudAction::Read)?;
        self.load_bulletin(id).await
    }

    pub async fn list_bulletins(
        &self,
        principal: &Principal,
        status: Option<BulletinStatus>,
        page: PageRequest,
    ) -> Result<Page<Bulletin>, NewsroomError> {
        require(principal, Resource::Bulletin, CrudAction::Read)?;
        self.repos
            .bulletins
            .list(status, None, page)
            .await
            .map_err(internal)
    }

    /// Drafts only; by the author or a sub-editor
    fn ensure_bulletin_editable(
        role: StaffRole,
        principal: &Principal,
        bulletin: &Bulletin,
    ) -> Result<(), NewsroomError> {
        if bulletin.status != BulletinStatus::Draft {
            return Err(NewsroomError::validation(format!(
                "bulletin is {} and can no longer be edited",
                bulletin.status
            )));
        }
        if bulletin.author_id != principal.user_id && role < StaffRole::SubEditor {
            return Err(NewsroomError::forbidden(
                "only the author or a sub-editor may edit this bulletin",
            ));
        }
        Ok(())
    }

    pub async fn update_bulletin(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: BulletinPatch,
    ) -> Result<Bulletin, NewsroomError> {
        let role = require(principal, Resource::Bulletin, CrudAction::Update)?;
        let mut bulletin = self.load_bulletin(id).await?;
        Self::ensure_bulletin_editable(role, principal, &bulletin)?;

        if let Some(title) = patch.title {
            let title = required_text("title", &title)?;
            if title != bulletin.title {
                bulletin.slug = self
                    .unique_slug(SlugScope::Bulletin, &title, Some(id))
                    .await?;
                bulletin.title = title;
            }
        }
        if let Some(intro) = patch.intro {
            bulletin.intro = intro.filter(|s| !s.trim().is_empty());
        }
        if let Some(outro) = patch.outro {
            bulletin.outro = outro.filter(|s| !s.trim().is_empty());
        }
        if let Some(language_id) = patch.language_id {
            self.check_language(language_id).await?;
            bulletin.language_id = language_id;
        }
        if let Some(scheduled) = patch.scheduled_for {
            bulletin.scheduled_for = scheduled;
        }
        bulletin.updated_at = Utc::now();
        self.repos.bulletins.update(&bulletin).await.map_err(internal)
    }

    /// Replace the running order; every story must be published
    pub async fn set_bulletin_stories(
        &self,
        principal: &Principal,
        id: Uuid,
        story_ids: &[Uuid],
    ) -> Result<Bulletin, NewsroomError> {
        let role = require(principal, Resource::Bulletin, CrudAction::Update)?;
        let mut bulletin = self.load_bulletin(id).await?;
        Self::ensure_bulletin_editable(role, principal, &bulletin)?;

        let ids = dedup_ids(story_ids);
        if ids.len() != story_ids.len() {
            return Err(NewsroomError::invalid_field(
                "story_ids",
                "a story may appear only once in a bulletin",
            ));
        }
        let stories = self.repos.stories.find_many(&ids).await.map_err(internal)?;
        for story_id in &ids {
            let published = stories.iter().any(|s| {
                s.id == *story_id && s.status == StoryStatus::Published && s.deleted_at.is_none()
            });
            if !published {
                return Err(NewsroomError::invalid_field(
                    "story_ids",
                    format!("story {} is not published", story_id),
                ));
            }
        }

        bulletin.story_ids = ids;
        bulletin.updated_at = Utc::now();
        self.repos.bulletins.update(&bulletin).await.map_err(internal)
    }

    pub async fn change_bulletin_status(
        &self,
        principal: &Principal,
        id: Uuid,
        to: BulletinStatus,
    ) -> Result<Bulletin, NewsroomError> {
        let role = require(principal, Resource::Bulletin, CrudAction::Update)?;
        let mut bulletin = self.load_bulletin(id).await?;
        let from = bulletin.status;
        check_bulletin_transition(role, bulletin.author_id == principal.user_id, from, to)?;

        if to == BulletinStatus::Published && bulletin.story_ids.is_empty() {
            return Err(NewsroomError::validation(
                "a bulletin needs at least one story before it can be published",
            ));
        }

        let now = Utc::now();
        if to == BulletinStatus::Approved {
            bulletin.reviewer_id = Some(principal.user_id);
        }
        if to == BulletinStatus::Published {
            bulletin.published_at = Some(now);
        }
        bulletin.status = to;
        bulletin.updated_at = now;
        let updated = self.repos.bulletins.update(&bulletin).await.map_err(internal)?;

        if to == BulletinStatus::Published {
            self.publish(
                Channel::Radio,
                EventKind::BulletinPublished,
                updated.id,
                json!({ "slug": updated.slug, "language_id": updated.language_id }),
            )
            .await;
        }
        tracing::info!(bulletin_id = %id, from = %from, to = %to, "bulletin status changed");
        Ok(updated)
    }

    pub async fn delete_bulletin(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        require(principal, Resource::Bulletin, CrudAction::Delete)?;
        self.load_bulletin(id).await?;
        self.repos.bulletins.delete(id).await.map_err(internal)
    }
}

//! Stories: authoring, workflow, translations and audio

use super::{dedup_ids, internal, Service, SlugScope};
use crate::contract::{
    AudioClip, ClassificationType, Comment, CommentType, NewStory, NewsroomError, Page, PageRequest,
    Principal, StaffRole, StatusChange, Story, StoryDetails, StoryFilter, StoryPatch, StoryStatus,
    Task, TaskPriority, TaskStatus, TaskType, Upload,
};
use crate::domain::collaborators::UploadRequest;
use crate::domain::events::{Channel, EventKind};
use crate::domain::permissions::{has_story_permission, require_story, StoryAction};
use crate::domain::validation::{required_text, validate_audio};
use crate::domain::workflow::{can_delete_story, can_edit_story, check_transition};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

/// Task type that tracks a story waiting in `status`
fn task_type_for(status: StoryStatus) -> Option<TaskType> {
    match status {
        StoryStatus::InReview => Some(TaskType::StoryReview),
        StoryStatus::PendingApproval => Some(TaskType::StoryApproval),
        StoryStatus::Approved => Some(TaskType::StoryPublish),
        _ => None,
    }
}

impl Service {
    /// A story that exists and is not soft-deleted
    pub(crate) async fn load_story(&self, id: Uuid) -> Result<Story, NewsroomError> {
        self.repos
            .stories
            .find_by_id(id)
            .await
            .map_err(internal)?
            .filter(|s| s.deleted_at.is_none())
            .ok_or_else(|| NewsroomError::not_found("story", id))
    }

    pub(crate) async fn story_details(&self, story: Story) -> Result<StoryDetails, NewsroomError> {
        let category = match story.category_id {
            Some(id) => self.repos.categories.find_by_id(id).await.map_err(internal)?,
            None => None,
        };
        let classifications = self
            .repos
            .classifications
            .find_many(&story.classification_ids)
            .await
            .map_err(internal)?;
        let tags = self.repos.tags.find_many(&story.tag_ids).await.map_err(internal)?;
        let audio = self.repos.stories.audio_for(story.id).await.map_err(internal)?;
        let translations = self
            .repos
            .stories
            .translations_of(story.id)
            .await
            .map_err(internal)?;
        Ok(StoryDetails {
            story,
            category,
            classifications,
            tags,
            audio,
            translations,
        })
    }

    /// Validate that referenced taxonomy exists; returns de-duplicated ids
    async fn check_story_refs(
        &self,
        category_id: Option<Uuid>,
        classification_ids: &[Uuid],
        tag_ids: &[Uuid],
    ) -> Result<(Vec<Uuid>, Vec<Uuid>), NewsroomError> {
        if let Some(id) = category_id {
            if self.repos.categories.find_by_id(id).await.map_err(internal)?.is_none() {
                return Err(NewsroomError::invalid_field(
                    "category_id",
                    format!("category {} does not exist", id),
                ));
            }
        }

        let classification_ids = dedup_ids(classification_ids);
        let found = self
            .repos
            .classifications
            .find_many(&classification_ids)
            .await
            .map_err(internal)?;
        if let Some(missing) = classification_ids
            .iter()
            .find(|id| !found.iter().any(|c| c.id == **id))
        {
            return Err(NewsroomError::invalid_field(
                "classification_ids",
                format!("classification {} does not exist", missing),
            ));
        }

        let tag_ids = dedup_ids(tag_ids);
        let found = self.repos.tags.find_many(&tag_ids).await.map_err(internal)?;
        if let Some(missing) = tag_ids.iter().find(|id| !found.iter().any(|t| t.id == **id)) {
            return Err(NewsroomError::invalid_field(
                "tag_ids",
                format!("tag {} does not exist", missing),
            ));
        }

        Ok((classification_ids, tag_ids))
    }

    fn ensure_can_edit(role: StaffRole, principal: &Principal, story: &Story) -> Result<(), NewsroomError> {
        if can_edit_story(role, story.author_id == principal.user_id, story.status) {
            Ok(())
        } else {
            Err(NewsroomError::forbidden(format!(
                "you may not edit this story while it is {}",
                story.status
            )))
        }
    }

    pub async fn create_story(&self, principal: &Principal, new: NewStory) -> Result<Story, NewsroomError> {
        require_story(principal, StoryAction::Create)?;
        let title = required_text("title", &new.title)?;
        let (classification_ids, tag_ids) = self
            .check_story_refs(new.category_id, &new.classification_ids, &new.tag_ids)
            .await?;

        let now = Utc::now();
        let story = Story {
            id: Uuid::new_v4(),
            slug: self.unique_slug(SlugScope::Story, &title, None).await?,
            title,
            content: new.content,
            summary: new.summary.filter(|s| !s.trim().is_empty()),
            status: StoryStatus::Draft,
            author_id: principal.user_id,
            reviewer_id: None,
            approver_id: None,
            publisher_id: None,
            category_id: new.category_id,
            original_story_id: None,
            classification_ids,
            tag_ids,
            published_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.repos.stories.insert(&story).await.map_err(internal)?;

        self.publish(
            Channel::Newsroom,
            EventKind::StoryCreated,
            created.id,
            json!({ "title": created.title, "author_id": created.author_id }),
        )
        .await;
        tracing::info!(story_id = %created.id, "story created");
        Ok(created)
    }

    pub async fn get_story(&self, principal: &Principal, id: Uuid) -> Result<StoryDetails, NewsroomError> {
        require_story(principal, StoryAction::Read)?;
        let story = self.load_story(id).await?;
        self.story_details(story).await
    }

    pub async fn get_story_by_slug(
        &self,
        principal: &Principal,
        slug: &str,
    ) -> Result<StoryDetails, NewsroomError> {
        require_story(principal, StoryAction::Read)?;
        let story = self
            .repos
            .stories
            .find_by_slug(slug)
            .await
            .map_err(internal)?
            .filter(|s| s.deleted_at.is_none())
            .ok_or_else(|| NewsroomError::not_found("story", slug))?;
        self.story_details(story).await
    }

    pub async fn list_stories(
        &self,
        principal: &Principal,
        filter: &StoryFilter,
        page: PageRequest,
    ) -> Result<Page<Story>, NewsroomError> {
        require_story(principal, StoryAction::Read)?;
        self.repos.stories.list(filter, page).await.map_err(internal)
    }

    pub async fn update_story(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: StoryPatch,
    ) -> Result<Story, NewsroomError> {
        let role = require_story(principal, StoryAction::Update)?;
        let mut story = self.load_story(id).await?;
        Self::ensure_can_edit(role, principal, &story)?;

        if let Some(title) = patch.title {
            let title = required_text("title", &title)?;
            if title != story.title {
                story.slug = self.unique_slug(SlugScope::Story, &title, Some(id)).await?;
                story.title = title;
            }
        }
        if let Some(content) = patch.content {
            story.content = content;
        }
        if let Some(summary) = patch.summary {
            story.summary = summary.filter(|s| !s.trim().is_empty());
        }
        let category_id = patch.category_id.unwrap_or(story.category_id);
        let classification_ids = patch
            .classification_ids
            .unwrap_or_else(|| story.classification_ids.clone());
        let tag_ids = patch.tag_ids.unwrap_or_else(|| story.tag_ids.clone());
        let (classification_ids, tag_ids) = self
            .check_story_refs(category_id, &classification_ids, &tag_ids)
            .await?;
        story.category_id = category_id;
        story.classification_ids = classification_ids;
        story.tag_ids = tag_ids;
        story.updated_at = Utc::now();

        let updated = self.repos.stories.update(&story).await.map_err(internal)?;
        self.publish(
            Channel::Newsroom,
            EventKind::StoryUpdated,
            updated.id,
            json!({ "title": updated.title, "updated_by": principal.user_id }),
        )
        .await;
        Ok(updated)
    }

    pub async fn delete_story(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        let role = require_story(principal, StoryAction::Delete)?;
        let story = self.load_story(id).await?;
        if !can_delete_story(role, story.author_id == principal.user_id, story.status) {
            return Err(NewsroomError::forbidden(format!(
                "you may not delete this story while it is {}",
                story.status
            )));
        }

        self.repos
            .stories
            .soft_delete(id, Utc::now())
            .await
            .map_err(internal)?;

        self.publish(Channel::Newsroom, EventKind::StoryDeleted, id, json!({})).await;
        self.record_audit(
            Some(principal.user_id),
            "story.deleted",
            "story",
            Some(id.to_string()),
            json!({ "title": story.title, "status": story.status.as_str() }),
        )
        .await;
        tracing::info!(story_id = %id, "story deleted");
        Ok(())
    }

    /// Move a story through the editorial workflow
    pub async fn change_status(
        &self,
        principal: &Principal,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Story, NewsroomError> {
        let role = crate::domain::permissions::require_staff(principal)?;
        let mut story = self.load_story(id).await?;
        let from = story.status;
        let to = change.to;
        let reason = change.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());

        let action = check_transition(
            role,
            story.author_id == principal.user_id,
            from,
            to,
            change.reason.as_deref(),
        )?;

        if to == StoryStatus::Published {
            self.ensure_publishable(&story).await?;
        }

        let assignee = match (change.assignee_id, task_type_for(to)) {
            (Some(assignee_id), Some(task_type)) => {
                let users = self.require_active_staff("assignee_id", &[assignee_id]).await?;
                let required = match task_type {
                    TaskType::StoryReview => StoryAction::Review,
                    TaskType::StoryApproval => StoryAction::Approve,
                    _ => StoryAction::Publish,
                };
                let can_act = users
                    .first()
                    .and_then(|u| u.staff_role)
                    .is_some_and(|r| has_story_permission(r, required));
                if !can_act {
                    return Err(NewsroomError::invalid_field(
                        "assignee_id",
                        "assignee's role cannot act on the story in that status",
                    ));
                }
                Some((assignee_id, task_type))
            }
            _ => None,
        };

        let now = Utc::now();
        match action {
            StoryAction::Review => story.reviewer_id = Some(principal.user_id),
            StoryAction::Approve if to == StoryStatus::Approved => {
                story.approver_id = Some(principal.user_id)
            }
            StoryAction::Publish => {
                story.publisher_id = Some(principal.user_id);
                story.published_at = Some(now);
            }
            StoryAction::Archive if to == StoryStatus::Published && story.published_at.is_none() => {
                story.published_at = Some(now)
            }
            _ => {}
        }
        story.status = to;
        story.updated_at = now;
        let updated = self.repos.stories.update(&story).await.map_err(internal)?;

        if to == StoryStatus::NeedsRevision {
            let comment = Comment {
                id: Uuid::new_v4(),
                story_id: id,
                author_id: principal.user_id,
                parent_id: None,
                content: reason.unwrap_or_default().to_string(),
                comment_type: CommentType::RevisionRequest,
                is_resolved: false,
                resolved_by: None,
                resolved_at: None,
                created_at: now,
                updated_at: now,
            };
            self.repos.comments.insert(&comment).await.map_err(internal)?;
            if updated.author_id != principal.user_id {
                self.publish(
                    Channel::User(updated.author_id),
                    EventKind::CommentCreated,
                    comment.id,
                    json!({ "story_id": id, "comment_type": comment.comment_type.as_str() }),
                )
                .await;
            }
        }

        self.close_workflow_tasks(id, from, now).await?;
        if let Some((assignee_id, task_type)) = assignee {
            self.open_workflow_task(principal, &updated, assignee_id, task_type).await?;
        }

        self.publish(
            Channel::Newsroom,
            EventKind::StoryStatusChanged,
            id,
            json!({ "from": from.as_str(), "to": to.as_str(), "by": principal.user_id }),
        )
        .await;
        if to == StoryStatus::Published {
            self.publish(
                Channel::Radio,
                EventKind::StoryPublished,
                id,
                json!({ "slug": updated.slug, "title": updated.title }),
            )
            .await;
        }
        self.record_audit(
            Some(principal.user_id),
            "story.status_changed",
            "story",
            Some(id.to_string()),
            json!({ "from": from.as_str(), "to": to.as_str(), "reason": reason }),
        )
        .await;
        tracing::info!(story_id = %id, from = %from, to = %to, "story status changed");
        Ok(updated)
    }

    async fn ensure_publishable(&self, story: &Story) -> Result<(), NewsroomError> {
        if story.category_id.is_none() {
            return Err(NewsroomError::invalid_field(
                "category_id",
                "a story needs a category before it can be published",
            ));
        }
        let classifications = self
            .repos
            .classifications
            .find_many(&story.classification_ids)
            .await
            .map_err(internal)?;
        if !classifications
            .iter()
            .any(|c| c.kind == ClassificationType::Language)
        {
            return Err(NewsroomError::invalid_field(
                "classification_ids",
                "a story needs a language before it can be published",
            ));
        }
        Ok(())
    }

    /// Complete the open task tracking the status the story just left
    async fn close_workflow_tasks(
        &self,
        story_id: Uuid,
        left: StoryStatus,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), NewsroomError> {
        let Some(task_type) = task_type_for(left) else {
            return Ok(());
        };
        let open = self
            .repos
            .tasks
            .open_for_story(story_id, &[task_type])
            .await
            .map_err(internal)?;
        for mut task in open {
            task.status = TaskStatus::Completed;
            task.completed_at = Some(now);
            task.updated_at = now;
            self.repos.tasks.update(&task).await.map_err(internal)?;
        }
        Ok(())
    }

    async fn open_workflow_task(
        &self,
        principal: &Principal,
        story: &Story,
        assignee_id: Uuid,
        task_type: TaskType,
    ) -> Result<(), NewsroomError> {
        let verb = match task_type {
            TaskType::StoryReview => "Review",
            TaskType::StoryApproval => "Approve",
            _ => "Publish",
        };
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: format!("{}: {}", verb, story.title),
            description: None,
            task_type,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assigned_to_id: assignee_id,
            created_by_id: principal.user_id,
            story_id: Some(story.id),
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let task = self.repos.tasks.insert(&task).await.map_err(internal)?;
        self.publish(
            Channel::User(assignee_id),
            EventKind::TaskAssigned,
            task.id,
            json!({ "title": task.title, "story_id": story.id }),
        )
        .await;
        Ok(())
    }

    /// Start a draft translation of a story into another language
    pub async fn create_translation(
        &self,
        principal: &Principal,
        id: Uuid,
        language_id: Uuid,
    ) -> Result<Story, NewsroomError> {
        require_story(principal, StoryAction::Translate)?;
        let original = self.load_story(id).await?;
        if original.is_translation() {
            return Err(NewsroomError::validation(
                "a translation cannot itself be translated",
            ));
        }

        let language = self.load_classification(language_id).await?;
        if language.kind != ClassificationType::Language {
            return Err(NewsroomError::invalid_field(
                "language_id",
                format!("{} is not a language", language.name),
            ));
        }
        if original.classification_ids.contains(&language_id) {
            return Err(NewsroomError::invalid_field(
                "language_id",
                format!("the story is already in {}", language.name),
            ));
        }
        if self
            .repos
            .stories
            .find_translation(id, language_id)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(NewsroomError::conflict(format!(
                "a {} translation of this story already exists",
                language.name
            )));
        }

        let inherited = self
            .repos
            .classifications
            .find_many(&original.classification_ids)
            .await
            .map_err(internal)?;
        let mut classification_ids: Vec<Uuid> = inherited
            .iter()
            .filter(|c| c.kind != ClassificationType::Language)
            .map(|c| c.id)
            .collect();
        classification_ids.push(language_id);

        let now = Utc::now();
        let title = original.title.clone();
        let translation = Story {
            id: Uuid::new_v4(),
            slug: self
                .unique_slug(SlugScope::Story, &format!("{} {}", title, language.name), None)
                .await?,
            title,
            content: original.content.clone(),
            summary: original.summary.clone(),
            status: StoryStatus::Draft,
            author_id: principal.user_id,
            reviewer_id: None,
            approver_id: None,
            publisher_id: None,
            category_id: original.category_id,
            original_story_id: Some(original.id),
            classification_ids,
            tag_ids: original.tag_ids.clone(),
            published_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let created = self.repos.stories.insert(&translation).await.map_err(internal)?;

        self.publish(
            Channel::Newsroom,
            EventKind::StoryCreated,
            created.id,
            json!({ "original_story_id": original.id, "language": language.name }),
        )
        .await;
        tracing::info!(story_id = %created.id, original_id = %original.id, "translation created");
        Ok(created)
    }

    pub async fn attach_audio(
        &self,
        principal: &Principal,
        story_id: Uuid,
        upload: Upload,
    ) -> Result<AudioClip, NewsroomError> {
        let role = require_story(principal, StoryAction::Update)?;
        let story = self.load_story(story_id).await?;
        Self::ensure_can_edit(role, principal, &story)?;
        validate_audio(&upload, &self.config)?;

        let stored = self
            .blobs
            .upload(UploadRequest {
                file_name: upload.file_name.clone(),
                content_type: upload.content_type.clone(),
                bytes: upload.bytes,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, story_id = %story_id, "audio upload failed");
                NewsroomError::delivery("audio storage rejected the upload")
            })?;

        let clip = AudioClip {
            id: Uuid::new_v4(),
            story_id,
            url: stored.url.clone(),
            pathname: stored.pathname,
            file_name: upload.file_name,
            mime_type: upload.content_type,
            file_size: i64::try_from(stored.size).unwrap_or(i64::MAX),
            uploaded_by: principal.user_id,
            created_at: Utc::now(),
        };
        match self.repos.stories.insert_audio(&clip).await {
            Ok(clip) => Ok(clip),
            Err(e) => {
                self.discard_blob(&stored.url).await;
                Err(internal(e))
            }
        }
    }

    pub async fn remove_audio(
        &self,
        principal: &Principal,
        story_id: Uuid,
        clip_id: Uuid,
    ) -> Result<(), NewsroomError> {
        let role = require_story(principal, StoryAction::Update)?;
        let story = self.load_story(story_id).await?;
        Self::ensure_can_edit(role, principal, &story)?;

        let clip = self
            .repos
            .stories
            .find_audio(clip_id)
            .await
            .map_err(internal)?
            .filter(|c| c.story_id == story_id)
            .ok_or_else(|| NewsroomError::not_found("audio clip", clip_id))?;

        self.repos.stories.delete_audio(clip.id).await.map_err(internal)?;
        self.discard_blob(&clip.url).await;
        Ok(())
    }
}

//! Story comments and revision requests

use super::{internal, Service};
use crate::contract::{Comment, CommentType, NewComment, NewsroomError, Principal, StaffRole};
use crate::domain::events::{Channel, EventKind};
use crate::domain::permissions::{has_story_permission, require, CrudAction, Resource, StoryAction};
use crate::domain::validation::required_text;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

impl Service {
    async fn load_comment(&self, id: Uuid) -> Result<Comment, NewsroomError> {
        self.repos
            .comments
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("comment", id))
    }

    pub async fn add_comment(
        &self,
        principal: &Principal,
        story_id: Uuid,
        new: NewComment,
    ) -> Result<Comment, NewsroomError> {
        let role = require(principal, Resource::Comment, CrudAction::Create)?;
        let story = self.load_story(story_id).await?;
        let content = required_text("content", &new.content)?;

        if new.comment_type != CommentType::General && !has_story_permission(role, StoryAction::Review) {
            return Err(NewsroomError::forbidden(format!(
                "{} may not add {} comments",
                role, new.comment_type
            )));
        }

        if let Some(parent_id) = new.parent_id {
            let parent = self.repos.comments.find_by_id(parent_id).await.map_err(internal)?;
            if parent.is_none_or(|p| p.story_id != story_id) {
                return Err(NewsroomError::invalid_field(
                    "parent_id",
                    "replies must reference a comment on the same story",
                ));
            }
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            story_id,
            author_id: principal.user_id,
            parent_id: new.parent_id,
            content,
            comment_type: new.comment_type,
            is_resolved: false,
            resolved_by: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        let created = self.repos.comments.insert(&comment).await.map_err(internal)?;

        self.publish(
            Channel::Newsroom,
            EventKind::CommentCreated,
            created.id,
            json!({ "story_id": story_id, "comment_type": created.comment_type.as_str() }),
        )
        .await;
        if story.author_id != principal.user_id {
            self.publish(
                Channel::User(story.author_id),
                EventKind::CommentCreated,
                created.id,
                json!({ "story_id": story_id, "comment_type": created.comment_type.as_str() }),
            )
            .await;
        }
        Ok(created)
    }

    pub async fn list_comments(
        &self,
        principal: &Principal,
        story_id: Uuid,
    ) -> Result<Vec<Comment>, NewsroomError> {
        require(principal, Resource::Comment, CrudAction::Read)?;
        self.load_story(story_id).await?;
        self.repos
            .comments
            .list_for_story(story_id)
            .await
            .map_err(internal)
    }

    pub async fn update_comment(
        &self,
        principal: &Principal,
        id: Uuid,
        content: &str,
    ) -> Result<Comment, NewsroomError> {
        require(principal, Resource::Comment, CrudAction::Update)?;
        let mut comment = self.load_comment(id).await?;
        if comment.author_id != principal.user_id {
            return Err(NewsroomError::forbidden("only the author may edit a comment"));
        }
        comment.content = required_text("content", content)?;
        comment.updated_at = Utc::now();
        self.repos.comments.update(&comment).await.map_err(internal)
    }

    /// Author or editor and above; replies go with the comment
    pub async fn delete_comment(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        let role = require(principal, Resource::Comment, CrudAction::Delete)?;
        let comment = self.load_comment(id).await?;
        if comment.author_id != principal.user_id && role < StaffRole::Editor {
            return Err(NewsroomError::forbidden(
                "only the author or an editor may delete a comment",
            ));
        }
        self.repos.comments.delete(id).await.map_err(internal)
    }

    pub async fn resolve_comment(&self, principal: &Principal, id: Uuid) -> Result<Comment, NewsroomError> {
        let role = require(principal, Resource::Comment, CrudAction::Update)?;
        let mut comment = self.load_comment(id).await?;
        if comment.comment_type != CommentType::RevisionRequest {
            return Err(NewsroomError::validation(
                "only revision requests can be resolved",
            ));
        }
        let story = self.load_story(comment.story_id).await?;
        if story.author_id != principal.user_id && role < StaffRole::SubEditor {
            return Err(NewsroomError::forbidden(
                "only the story author or a sub-editor may resolve revision requests",
            ));
        }
        if comment.is_resolved {
            return Ok(comment);
        }

        let now = Utc::now();
        comment.is_resolved = true;
        comment.resolved_by = Some(principal.user_id);
        comment.resolved_at = Some(now);
        comment.updated_at = now;
        self.repos.comments.update(&comment).await.map_err(internal)
    }
}

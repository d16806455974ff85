//! Newsroom diary of planned events

use super::{dedup_ids, internal, Service};
use crate::contract::{DiaryEntry, DiaryPatch, DiaryQuery, NewDiaryEntry, NewsroomError, Principal};
use crate::domain::permissions::{has_permission, require, require_staff, CrudAction, Resource};
use crate::domain::validation::required_text;
use chrono::Utc;
use uuid::Uuid;

impl Service {
    async fn load_diary_entry(&self, id: Uuid) -> Result<DiaryEntry, NewsroomError> {
        self.repos
            .diary
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("diary entry", id))
    }

    /// De-duplicated assignees, all of them active staff
    async fn diary_assignees(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, NewsroomError> {
        let ids = dedup_ids(ids);
        self.require_active_staff("assignee_ids", &ids).await?;
        Ok(ids)
    }

    async fn check_diary_story(&self, story_id: Option<Uuid>) -> Result<(), NewsroomError> {
        if let Some(id) = story_id {
            self.load_story(id).await.map_err(|_| {
                NewsroomError::invalid_field("story_id", format!("story {} does not exist", id))
            })?;
        }
        Ok(())
    }

    pub async fn create_diary_entry(
        &self,
        principal: &Principal,
        new: NewDiaryEntry,
    ) -> Result<DiaryEntry, NewsroomError> {
        require(principal, Resource::Diary, CrudAction::Create)?;
        let title = required_text("title", &new.title)?;
        let assignee_ids = self.diary_assignees(&new.assignee_ids).await?;
        self.check_diary_story(new.story_id).await?;

        let now = Utc::now();
        let entry = DiaryEntry {
            id: Uuid::new_v4(),
            title,
            notes: new.notes.filter(|n| !n.trim().is_empty()),
            date_time: new.date_time,
            story_id: new.story_id,
            created_by: principal.user_id,
            assignee_ids,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        self.repos.diary.insert(&entry).await.map_err(internal)
    }

    pub async fn list_diary_entries(
        &self,
        principal: &Principal,
        query: &DiaryQuery,
    ) -> Result<Vec<DiaryEntry>, NewsroomError> {
        require(principal, Resource::Diary, CrudAction::Read)?;
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(NewsroomError::invalid_field("from", "must not be after `to`"));
            }
        }
        self.repos.diary.list(query).await.map_err(internal)
    }

    pub async fn update_diary_entry(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: DiaryPatch,
    ) -> Result<DiaryEntry, NewsroomError> {
        require(principal, Resource::Diary, CrudAction::Update)?;
        let mut entry = self.load_diary_entry(id).await?;

        if let Some(title) = patch.title {
            entry.title = required_text("title", &title)?;
        }
        if let Some(notes) = patch.notes {
            entry.notes = notes.filter(|n| !n.trim().is_empty());
        }
        if let Some(date_time) = patch.date_time {
            entry.date_time = date_time;
        }
        if let Some(story_id) = patch.story_id {
            self.check_diary_story(story_id).await?;
            entry.story_id = story_id;
        }
        if let Some(assignees) = patch.assignee_ids {
            entry.assignee_ids = self.diary_assignees(&assignees).await?;
        }
        if let Some(done) = patch.is_completed {
            entry.is_completed = done;
        }
        entry.updated_at = Utc::now();
        self.repos.diary.update(&entry).await.map_err(internal)
    }

    /// Creator or sub-editor and above
    pub async fn delete_diary_entry(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        let role = require_staff(principal)?;
        let entry = self.load_diary_entry(id).await?;
        if entry.created_by != principal.user_id
            && !has_permission(role, Resource::Diary, CrudAction::Delete)
        {
            return Err(NewsroomError::forbidden(
                "only the creator or a sub-editor may delete this entry",
            ));
        }
        self.repos.diary.delete(id).await.map_err(internal)
    }
}

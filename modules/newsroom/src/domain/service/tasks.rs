//! Newsroom task assignments

use super::{internal, Service};
use crate::contract::{
    NewTask, NewsroomError, Page, PageRequest, Principal, StaffRole, Task, TaskFilter, TaskPatch,
    TaskStatus,
};
use crate::domain::events::{Channel, EventKind};
use crate::domain::permissions::{has_task_permission, require, require_staff, CrudAction, Resource};
use crate::domain::validation::required_text;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

impl Service {
    async fn load_task(&self, id: Uuid) -> Result<Task, NewsroomError> {
        self.repos
            .tasks
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("task", id))
    }

    /// Interns may only create tasks for themselves
    pub async fn create_task(&self, principal: &Principal, new: NewTask) -> Result<Task, NewsroomError> {
        let role = require_staff(principal)?;
        let self_assigned = new.assigned_to_id == principal.user_id;
        if !has_task_permission(role, CrudAction::Create) && !self_assigned {
            return Err(NewsroomError::forbidden(format!(
                "{} may only create tasks assigned to themselves",
                role
            )));
        }
        let title = required_text("title", &new.title)?;
        self.require_active_staff("assigned_to_id", &[new.assigned_to_id])
            .await?;
        if let Some(story_id) = new.story_id {
            self.load_story(story_id).await.map_err(|_| {
                NewsroomError::invalid_field("story_id", format!("story {} does not exist", story_id))
            })?;
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title,
            description: new.description.filter(|d| !d.trim().is_empty()),
            task_type: new.task_type,
            status: TaskStatus::Pending,
            priority: new.priority,
            assigned_to_id: new.assigned_to_id,
            created_by_id: principal.user_id,
            story_id: new.story_id,
            due_date: new.due_date,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let created = self.repos.tasks.insert(&task).await.map_err(internal)?;

        self.publish(
            Channel::User(created.assigned_to_id),
            EventKind::TaskAssigned,
            created.id,
            json!({ "title": created.title, "assigned_by": principal.user_id }),
        )
        .await;
        Ok(created)
    }

    pub async fn get_task(&self, principal: &Principal, id: Uuid) -> Result<Task, NewsroomError> {
        require(principal, Resource::Task, CrudAction::Read)?;
        self.load_task(id).await
    }

    pub async fn list_tasks(
        &self,
        principal: &Principal,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, NewsroomError> {
        require(principal, Resource::Task, CrudAction::Read)?;
        self.repos.tasks.list(filter, page).await.map_err(internal)
    }

    pub async fn update_task(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, NewsroomError> {
        let role = require(principal, Resource::Task, CrudAction::Update)?;
        let mut task = self.load_task(id).await?;
        let involved = task.assigned_to_id == principal.user_id || task.created_by_id == principal.user_id;
        if !involved && role < StaffRole::SubEditor {
            return Err(NewsroomError::forbidden(
                "only the assignee, the creator or a sub-editor may update this task",
            ));
        }

        let now = Utc::now();
        let previous_assignee = task.assigned_to_id;
        if let Some(title) = patch.title {
            task.title = required_text("title", &title)?;
        }
        if let Some(description) = patch.description {
            task.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due) = patch.due_date {
            task.due_date = due;
        }
        if let Some(assignee) = patch.assigned_to_id {
            if assignee != task.assigned_to_id {
                if !has_task_permission(role, CrudAction::Create) && assignee != principal.user_id {
                    return Err(NewsroomError::forbidden(format!(
                        "{} may not reassign tasks to others",
                        role
                    )));
                }
                self.require_active_staff("assigned_to_id", &[assignee]).await?;
                task.assigned_to_id = assignee;
            }
        }
        if let Some(status) = patch.status {
            if status == TaskStatus::Completed && task.status != TaskStatus::Completed {
                task.completed_at = Some(now);
            } else if status != TaskStatus::Completed {
                task.completed_at = None;
            }
            task.status = status;
        }
        task.updated_at = now;

        let updated = self.repos.tasks.update(&task).await.map_err(internal)?;
        if updated.assigned_to_id != previous_assignee {
            self.publish(
                Channel::User(updated.assigned_to_id),
                EventKind::TaskAssigned,
                updated.id,
                json!({ "title": updated.title, "assigned_by": principal.user_id }),
            )
            .await;
        }
        self.publish(
            Channel::Newsroom,
            EventKind::TaskUpdated,
            updated.id,
            json!({ "status": updated.status.as_str() }),
        )
        .await;
        Ok(updated)
    }

    pub async fn delete_task(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        let role = require_staff(principal)?;
        let task = self.load_task(id).await?;
        if task.created_by_id != principal.user_id && !has_task_permission(role, CrudAction::Delete) {
            return Err(NewsroomError::forbidden(
                "only the creator or a sub-editor may delete this task",
            ));
        }
        self.repos.tasks.delete(id).await.map_err(internal)
    }
}

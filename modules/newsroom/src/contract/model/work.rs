//! Newsroom work items: tasks, diary, announcements, audit trail

use super::{AnnouncementPriority, AnnouncementTarget, TaskPriority, TaskStatus, TaskType};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to_id: Uuid,
    pub created_by_id: Uuid,
    pub story_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub assigned_to_id: Uuid,
    pub story_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to_id: Option<Uuid>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub story_id: Option<Uuid>,
}

/// Planned newsroom event (press conference, interview, court date)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub date_time: DateTime<Utc>,
    pub story_id: Option<Uuid>,
    pub created_by: Uuid,
    pub assignee_ids: Vec<Uuid>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDiaryEntry {
    pub title: String,
    pub notes: Option<String>,
    pub date_time: DateTime<Utc>,
    pub story_id: Option<Uuid>,
    pub assignee_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryPatch {
    pub title: Option<String>,
    pub notes: Option<Option<String>>,
    pub date_time: Option<DateTime<Utc>>,
    pub story_id: Option<Option<Uuid>>,
    /// Replaces the whole assignee set
    pub assignee_ids: Option<Vec<Uuid>>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub priority: AnnouncementPriority,
    pub target: AnnouncementTarget,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Active and not yet expired at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |at| at > now)
    }
}

/// An announcement as seen by one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementView {
    pub announcement: Announcement,
    pub dismissed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub title: String,
    pub message: String,
    pub priority: AnnouncementPriority,
    pub target: AnnouncementTarget,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub priority: Option<AnnouncementPriority>,
    pub target: Option<AnnouncementTarget>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: Uuid,
    /// `None` for system actions
    pub user_id: Option<Uuid>,
    /// Dotted action name, e.g. `story.status_changed`
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub user_id: Option<Uuid>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Outcome of one super-admin diagnostic check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticCheck {
    pub name: String,
    pub ok: bool,
    pub duration_ms: u64,
    pub message: String,
}

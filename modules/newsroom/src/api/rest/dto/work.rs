// ===== Task, diary, announcement, audit and diagnostics DTOs =====

use super::double_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ===== Tasks =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "STORY_REVIEW")]
    pub task_type: String,
    #[schema(example = "PENDING")]
    pub status: String,
    #[schema(example = "MEDIUM")]
    pub priority: String,
    pub assigned_to_id: Uuid,
    pub created_by_id: Uuid,
    pub story_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub story_id: Option<Uuid>,
    /// Only tasks assigned to the caller
    #[serde(default)]
    pub mine: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: Option<String>,

    #[schema(example = "GENERAL")]
    pub task_type: String,

    #[serde(default)]
    #[schema(example = "MEDIUM")]
    pub priority: Option<String>,

    pub assigned_to_id: Uuid,

    #[serde(default)]
    pub story_id: Option<Uuid>,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<Uuid>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

// ===== Diary =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiaryEntryDto {
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

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiaryListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    /// Only entries the caller is assigned to
    #[serde(default)]
    pub mine: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDiaryEntryRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub notes: Option<String>,

    pub date_time: DateTime<Utc>,

    #[serde(default)]
    pub story_id: Option<Uuid>,

    #[serde(default)]
    pub assignee_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDiaryEntryRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,

    pub date_time: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub story_id: Option<Option<Uuid>>,

    /// Replaces every assignee
    pub assignee_ids: Option<Vec<Uuid>>,

    pub is_completed: Option<bool>,
}

// ===== Announcements =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementDto {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[schema(example = "HIGH")]
    pub priority: String,
    #[schema(example = "ALL")]
    pub target: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Announcement as the caller sees it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementViewDto {
    #[serde(flatten)]
    pub announcement: AnnouncementDto,
    pub dismissed: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub message: String,

    #[serde(default)]
    #[schema(example = "MEDIUM")]
    pub priority: Option<String>,

    #[serde(default)]
    #[schema(example = "ALL")]
    pub target: Option<String>,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub message: Option<String>,

    pub priority: Option<String>,
    pub target: Option<String>,
    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

// ===== Audit log =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryDto {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "story.status_changed")]
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub user_id: Option<Uuid>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// ===== Diagnostics =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticCheckDto {
    #[schema(example = "database")]
    pub name: String,
    pub ok: bool,
    pub duration_ms: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiagnosticsResponse {
    /// Whether every check passed
    pub ok: bool,
    pub checks: Vec<DiagnosticCheckDto>,
}

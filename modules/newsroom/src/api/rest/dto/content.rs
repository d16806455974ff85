// ===== Taxonomy, story, comment, show and bulletin DTOs =====

use super::double_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ===== Categories =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with its sub-categories
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryNodeDto {
    #[serde(flatten)]
    pub category: CategoryDto,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNodeDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryListQuery {
    /// Return the nested tree instead of a flat list
    #[serde(default)]
    pub tree: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    /// `null` moves the category to the top level
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
}

// ===== Classifications =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassificationDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[schema(example = "LANGUAGE")]
    pub r#type: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationListQuery {
    pub r#type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassificationRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,

    #[schema(example = "RELIGION")]
    pub r#type: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassificationRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

// ===== Tags =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    pub name: String,
}

// ===== Stories =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoryDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: Option<String>,
    #[schema(example = "DRAFT")]
    pub status: String,
    pub author_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub approver_id: Option<Uuid>,
    pub publisher_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub original_story_id: Option<Uuid>,
    pub classification_ids: Vec<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Story with category, classifications, tags, audio and translations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoryDetailsDto {
    #[serde(flatten)]
    pub story: StoryDto,
    pub category: Option<CategoryDto>,
    pub classifications: Vec<ClassificationDto>,
    pub tags: Vec<TagDto>,
    pub audio: Vec<AudioClipDto>,
    pub translations: Vec<StoryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AudioClipDto {
    pub id: Uuid,
    pub story_id: Uuid,
    pub url: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub classification_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub search: Option<String>,
    /// Only the caller's own stories
    #[serde(default)]
    pub mine: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStoryRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "is required"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub summary: Option<String>,

    #[serde(default)]
    pub category_id: Option<Uuid>,

    #[serde(default)]
    pub classification_ids: Vec<Uuid>,

    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStoryRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub summary: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,

    pub classification_ids: Option<Vec<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct StatusChangeRequest {
    #[schema(example = "IN_REVIEW")]
    pub status: String,

    /// Required when sending a story back for revision
    #[serde(default)]
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub reason: Option<String>,

    /// Reviewer or approver who gets the follow-up task
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TranslationRequest {
    /// LANGUAGE classification to translate into
    pub language_id: Uuid,
}

// ===== Comments =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentDto {
    pub id: Uuid,
    pub story_id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    #[schema(example = "GENERAL")]
    pub comment_type: String,
    pub is_resolved: bool,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub content: String,

    #[serde(default)]
    #[schema(example = "GENERAL")]
    pub comment_type: Option<String>,

    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "must be 1-5000 characters"))]
    pub content: String,
}

// ===== Shows and episodes =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShowDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub cover_image_url: Option<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateShowRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category_id: Option<Uuid>,

    #[serde(default)]
    #[validate(url(message = "must be a valid URL"))]
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateShowRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub cover_image_url: Option<Option<String>>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EpisodeDto {
    pub id: Uuid,
    pub show_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub episode_number: i32,
    #[schema(example = "DRAFT")]
    pub status: String,
    pub audio_url: Option<String>,
    pub file_size: Option<i64>,
    pub duration_seconds: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodeListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEpisodeRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEpisodeRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub duration_seconds: Option<Option<i32>>,

    /// DRAFT or ARCHIVED; publishing has its own endpoint
    pub status: Option<String>,
}

// ===== Bulletins =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulletinDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub intro: Option<String>,
    pub outro: Option<String>,
    pub language_id: Uuid,
    #[schema(example = "DRAFT")]
    pub status: String,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    /// Running order
    pub story_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulletinListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBulletinRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub intro: Option<String>,

    #[serde(default)]
    pub outro: Option<String>,

    pub language_id: Uuid,

    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBulletinRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub intro: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub outro: Option<Option<String>>,

    pub language_id: Option<Uuid>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub scheduled_for: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulletinStoriesRequest {
    /// Published stories in running order
    pub story_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulletinStatusRequest {
    #[schema(example = "IN_REVIEW")]
    pub status: String,
}

// ===== Radio feed =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQueryParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
}

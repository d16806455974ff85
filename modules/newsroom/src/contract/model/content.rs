//! Editorial content: taxonomy, stories, comments, shows and bulletins

use super::{BulletinStatus, ClassificationType, CommentType, EpisodeStatus, StoryStatus};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// ===== Taxonomy =====

/// Hierarchical content category, at most three levels deep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    /// 1 for top-level categories
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub parent_id: Option<Option<Uuid>>,
}

/// Language, religion or locality label used for station filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub kind: ClassificationType,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClassification {
    pub name: String,
    pub kind: ClassificationType,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ===== Stories =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: Option<String>,
    pub status: StoryStatus,
    pub author_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub approver_id: Option<Uuid>,
    pub publisher_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Set when this story is a translation
    pub original_story_id: Option<Uuid>,
    pub classification_ids: Vec<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn is_translation(&self) -> bool {
        self.original_story_id.is_some()
    }
}

/// A story with its resolved relations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDetails {
    pub story: Story,
    pub category: Option<Category>,
    pub classifications: Vec<Classification>,
    pub tags: Vec<Tag>,
    pub audio: Vec<AudioClip>,
    pub translations: Vec<Story>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStory {
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub category_id: Option<Uuid>,
    pub classification_ids: Vec<Uuid>,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<Option<String>>,
    pub category_id: Option<Option<Uuid>>,
    pub classification_ids: Option<Vec<Uuid>>,
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFilter {
    pub status: Option<StoryStatus>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub classification_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub search: Option<String>,
}

/// Requested workflow move for a story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub to: StoryStatus,
    /// Required when sending a story back for revision
    pub reason: Option<String>,
    /// Reviewer or approver to hand a task to
    pub assignee_id: Option<Uuid>,
}

/// Audio file attached to a story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub id: Uuid,
    pub story_id: Uuid,
    pub url: String,
    pub pathname: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// An uploaded file as received from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Query a radio station may run against its feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
}

// ===== Comments =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub story_id: Uuid,
    pub author_id: Uuid,
    /// Parent comment for threaded replies
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub comment_type: CommentType,
    pub is_resolved: bool,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub content: String,
    pub comment_type: CommentType,
    pub parent_id: Option<Uuid>,
}

// ===== Shows =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShow {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<Uuid>>,
    pub cover_image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: Uuid,
    pub show_id: Uuid,
    pub title: String,
    /// Unique within the show
    pub slug: String,
    pub description: Option<String>,
    pub episode_number: i32,
    pub status: EpisodeStatus,
    pub audio_url: Option<String>,
    pub audio_pathname: Option<String>,
    pub file_size: Option<i64>,
    pub duration_seconds: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEpisode {
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub duration_seconds: Option<Option<i32>>,
    pub status: Option<EpisodeStatus>,
}

// ===== Bulletins =====

/// A scheduled read-out of published stories in one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bulletin {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub intro: Option<String>,
    pub outro: Option<String>,
    /// LANGUAGE classification
    pub language_id: Uuid,
    pub status: BulletinStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub reviewer_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    /// Running order
    pub story_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBulletin {
    pub title: String,
    pub intro: Option<String>,
    pub outro: Option<String>,
    pub language_id: Uuid,
    pub scheduled_for: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulletinPatch {
    pub title: Option<String>,
    pub intro: Option<Option<String>>,
    pub outro: Option<Option<String>>,
    pub language_id: Option<Uuid>,
    pub scheduled_for: Option<Option<DateTime<Utc>>>,
}

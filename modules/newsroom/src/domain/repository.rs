//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories/

use super::feed::FeedFilter;
use crate::contract::{
    Announcement, AnnouncementView, AudioClip, AuditEntry, AuditFilter, Bulletin, BulletinStatus,
    Category, Classification, ClassificationType, Comment, DiaryEntry, DiaryQuery, Episode,
    EpisodeStatus, FeedQuery, Page, PageRequest, PasswordResetToken, Session, Show, StaffRole,
    Station, StationFilter, Story, StoryFilter, Tag, Task, TaskFilter, TaskType, User, UserFilter,
    UserType,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::sync::Arc;
use uuid::Uuid;

/// Runs inside the user-creation transaction after the row is written;
/// an error rolls the insert back
pub type AfterInsert = Box<dyn FnOnce(User) -> BoxFuture<'static, Result<()>> + Send>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user (and optionally its invite token) in one transaction
    async fn insert(
        &self,
        user: &User,
        password_hash: &str,
        invite: Option<&PasswordResetToken>,
        after: AfterInsert,
    ) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Exact match on the lower-cased email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    async fn password_hash(&self, id: Uuid) -> Result<Option<String>>;

    async fn update(&self, user: &User) -> Result<User>;

    async fn set_password(&self, id: Uuid, password_hash: &str, must_change: bool) -> Result<()>;

    async fn touch_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>>;

    async fn count_by_role(&self, role: StaffRole) -> Result<u64>;

    async fn station_users(&self, station_id: Uuid) -> Result<Vec<User>>;

    /// Returns the ids of the users that were deactivated
    async fn deactivate_station_users(&self, station_id: Uuid) -> Result<Vec<Uuid>>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<()>;

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>>;

    async fn delete_session(&self, token_hash: &str) -> Result<()>;

    /// Delete every session of a user, optionally keeping one
    async fn delete_user_sessions(&self, user_id: Uuid, keep: Option<Uuid>) -> Result<u64>;

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;

    async fn insert_reset_token(&self, token: &PasswordResetToken) -> Result<()>;

    async fn find_reset_token(&self, token_hash: &str) -> Result<Option<PasswordResetToken>>;

    /// Mark a token used; `false` when it was already used
    async fn consume_reset_token(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
}

#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn insert(&self, station: &Station) -> Result<Station>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Station>>;

    /// Case-insensitive name lookup
    async fn find_by_name(&self, name: &str) -> Result<Option<Station>>;

    async fn update(&self, station: &Station) -> Result<Station>;

    async fn list(&self, filter: &StationFilter, page: PageRequest) -> Result<Page<Station>>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: &Category) -> Result<Category>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    async fn list_all(&self) -> Result<Vec<Category>>;

    async fn update(&self, category: &Category) -> Result<Category>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn count_children(&self, id: Uuid) -> Result<u64>;

    /// Stories (deleted ones included) filed under the category
    async fn count_stories(&self, id: Uuid) -> Result<u64>;

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>>;
}

#[async_trait]
pub trait ClassificationRepository: Send + Sync {
    async fn insert(&self, classification: &Classification) -> Result<Classification>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Classification>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Classification>>;

    /// Case-insensitive lookup within one type
    async fn find_by_name(&self, kind: ClassificationType, name: &str) -> Result<Option<Classification>>;

    /// Ordered by type, sort order, then name
    async fn list(&self, kind: Option<ClassificationType>) -> Result<Vec<Classification>>;

    async fn update(&self, classification: &Classification) -> Result<Classification>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn count_stories(&self, id: Uuid) -> Result<u64>;

    /// Bulletins whose language is this classification
    async fn count_bulletins(&self, id: Uuid) -> Result<u64>;

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn insert(&self, tag: &Tag) -> Result<Tag>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Tag>>;

    /// Case-insensitive name lookup
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>>;

    async fn list(&self, search: Option<&str>, page: PageRequest) -> Result<Page<Tag>>;

    async fn update(&self, tag: &Tag) -> Result<Tag>;

    /// Delete the tag and detach it from every story
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>>;
}

#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Insert a story together with its classification and tag links
    async fn insert(&self, story: &Story) -> Result<Story>;

    /// Includes soft-deleted stories
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Story>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Story>>;

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Story>>;

    /// Non-deleted stories, newest first
    async fn list(&self, filter: &StoryFilter, page: PageRequest) -> Result<Page<Story>>;

    /// Rewrites the row and replaces its links
    async fn update(&self, story: &Story) -> Result<Story>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>>;

    async fn translations_of(&self, original_id: Uuid) -> Result<Vec<Story>>;

    /// Non-deleted translation of `original_id` carrying `language_id`
    async fn find_translation(&self, original_id: Uuid, language_id: Uuid) -> Result<Option<Story>>;

    /// Published stories the station filter admits, newest publication first
    async fn feed(&self, filter: &FeedFilter, query: &FeedQuery, page: PageRequest) -> Result<Page<Story>>;

    async fn insert_audio(&self, clip: &AudioClip) -> Result<AudioClip>;

    async fn audio_for(&self, story_id: Uuid) -> Result<Vec<AudioClip>>;

    async fn find_audio(&self, id: Uuid) -> Result<Option<AudioClip>>;

    async fn delete_audio(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<Comment>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Oldest first
    async fn list_for_story(&self, story_id: Uuid) -> Result<Vec<Comment>>;

    async fn update(&self, comment: &Comment) -> Result<Comment>;

    /// Deletes replies along with the comment
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: &Task) -> Result<Task>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>>;

    /// Due date ascending (undated last), then priority descending
    async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<Page<Task>>;

    async fn update(&self, task: &Task) -> Result<Task>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Tasks of the given types on a story that are not completed or cancelled
    async fn open_for_story(&self, story_id: Uuid, types: &[TaskType]) -> Result<Vec<Task>>;
}

#[async_trait]
pub trait ShowRepository: Send + Sync {
    async fn insert_show(&self, show: &Show) -> Result<Show>;

    async fn find_show(&self, id: Uuid) -> Result<Option<Show>>;

    async fn find_show_by_slug(&self, slug: &str) -> Result<Option<Show>>;

    async fn list_shows(&self, active_only: bool, page: PageRequest) -> Result<Page<Show>>;

    /// Active shows with at least one published episode
    async fn shows_with_published_episodes(&self) -> Result<Vec<Show>>;

    async fn update_show(&self, show: &Show) -> Result<Show>;

    async fn delete_show(&self, id: Uuid) -> Result<()>;

    async fn show_slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>>;

    async fn count_episodes(&self, show_id: Uuid) -> Result<u64>;

    async fn insert_episode(&self, episode: &Episode) -> Result<Episode>;

    async fn find_episode(&self, id: Uuid) -> Result<Option<Episode>>;

    /// Ordered by episode number, newest first
    async fn list_episodes(&self, show_id: Uuid, status: Option<EpisodeStatus>) -> Result<Vec<Episode>>;

    async fn update_episode(&self, episode: &Episode) -> Result<Episode>;

    async fn delete_episode(&self, id: Uuid) -> Result<()>;

    async fn episode_slugs_with_prefix(&self, show_id: Uuid, prefix: &str) -> Result<Vec<(Uuid, String)>>;

    /// Highest episode number in the show, 0 when it has none
    async fn max_episode_number(&self, show_id: Uuid) -> Result<i32>;
}

#[async_trait]
pub trait BulletinRepository: Send + Sync {
    async fn insert(&self, bulletin: &Bulletin) -> Result<Bulletin>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bulletin>>;

    /// Newest first; `language_ids` restricts to those languages when set
    async fn list(
        &self,
        status: Option<BulletinStatus>,
        language_ids: Option<&[Uuid]>,
        page: PageRequest,
    ) -> Result<Page<Bulletin>>;

    /// Rewrites the row and its running order
    async fn update(&self, bulletin: &Bulletin) -> Result<Bulletin>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<(Uuid, String)>>;
}

#[async_trait]
pub trait DiaryRepository: Send + Sync {
    async fn insert(&self, entry: &DiaryEntry) -> Result<DiaryEntry>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DiaryEntry>>;

    /// Ordered by date/time ascending
    async fn list(&self, query: &DiaryQuery) -> Result<Vec<DiaryEntry>>;

    /// Rewrites the row and replaces the assignee set
    async fn update(&self, entry: &DiaryEntry) -> Result<DiaryEntry>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn insert(&self, announcement: &Announcement) -> Result<Announcement>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;

    /// Active, unexpired announcements aimed at `user_type`, with the
    /// dismissal flag for `user_id`
    async fn visible_to(
        &self,
        user_type: UserType,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnnouncementView>>;

    async fn update(&self, announcement: &Announcement) -> Result<Announcement>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Idempotent
    async fn dismiss(&self, announcement_id: Uuid, user_id: Uuid, at: DateTime<Utc>) -> Result<()>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn insert(&self, entry: &AuditEntry) -> Result<()>;

    /// Newest first
    async fn list(&self, filter: &AuditFilter, page: PageRequest) -> Result<Page<AuditEntry>>;
}

#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Every repository the service needs
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub auth: Arc<dyn AuthRepository>,
    pub stations: Arc<dyn StationRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub classifications: Arc<dyn ClassificationRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub stories: Arc<dyn StoryRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub shows: Arc<dyn ShowRepository>,
    pub bulletins: Arc<dyn BulletinRepository>,
    pub diary: Arc<dyn DiaryRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub probe: Arc<dyn DatabaseProbe>,
}

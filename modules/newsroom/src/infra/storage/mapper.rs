//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Reading a row
//! fails when an enum column holds text no contract enum knows.

use super::entity;
use crate::contract::{
    Announcement, AudioClip, AuditEntry, Bulletin, Category, Classification, Comment, DiaryEntry,
    Episode, PasswordResetToken, Session, Show, Station, Story, Tag, Task, TaskPriority, User,
};
use anyhow::{Context, Result};
use sea_orm::ActiveValue::Set;
use std::str::FromStr;
use uuid::Uuid;

fn parse<T>(column: &str, text: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse::<T>()
        .with_context(|| format!("invalid value in column {}", column))
}

fn json_strings(column: &str, value: serde_json::Value) -> Result<Vec<String>> {
    serde_json::from_value(value).with_context(|| format!("column {} is not a string array", column))
}

fn json_ids(column: &str, value: serde_json::Value) -> Result<Vec<Uuid>> {
    serde_json::from_value(value).with_context(|| format!("column {} is not an id array", column))
}

/// Sort key for task urgency; higher is more urgent
pub fn priority_rank(priority: TaskPriority) -> i32 {
    match priority {
        TaskPriority::Low => 0,
        TaskPriority::Medium => 1,
        TaskPriority::High => 2,
        TaskPriority::Urgent => 3,
    }
}

// ===== Users and sessions =====

impl TryFrom<entity::user::Model> for User {
    type Error = anyhow::Error;

    fn try_from(row: entity::user::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            user_type: parse("users.user_type", &row.user_type)?,
            staff_role: row
                .staff_role
                .as_deref()
                .map(|r| parse("users.staff_role", r))
                .transpose()?,
            translation_language: row.translation_language,
            radio_station_id: row.radio_station_id,
            is_primary_contact: row.is_primary_contact,
            is_active: row.is_active,
            must_change_password: row.must_change_password,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Active model for every column except the password hash
pub fn user_active_model(user: &User) -> entity::user::ActiveModel {
    entity::user::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        first_name: Set(user.first_name.clone()),
        last_name: Set(user.last_name.clone()),
        user_type: Set(user.user_type.as_str().to_string()),
        staff_role: Set(user.staff_role.map(|r| r.as_str().to_string())),
        translation_language: Set(user.translation_language.clone()),
        radio_station_id: Set(user.radio_station_id),
        is_primary_contact: Set(user.is_primary_contact),
        is_active: Set(user.is_active),
        must_change_password: Set(user.must_change_password),
        last_login_at: Set(user.last_login_at),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
        ..Default::default()
    }
}

impl From<entity::session::Model> for Session {
    fn from(row: entity::session::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            user_agent: row.user_agent,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

impl From<&Session> for entity::session::ActiveModel {
    fn from(session: &Session) -> Self {
        Self {
            id: Set(session.id),
            user_id: Set(session.user_id),
            token_hash: Set(session.token_hash.clone()),
            user_agent: Set(session.user_agent.clone()),
            expires_at: Set(session.expires_at),
            created_at: Set(session.created_at),
        }
    }
}

impl From<entity::password_reset_token::Model> for PasswordResetToken {
    fn from(row: entity::password_reset_token::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            used_at: row.used_at,
            created_at: row.created_at,
        }
    }
}

impl From<&PasswordResetToken> for entity::password_reset_token::ActiveModel {
    fn from(token: &PasswordResetToken) -> Self {
        Self {
            id: Set(token.id),
            user_id: Set(token.user_id),
            token_hash: Set(token.token_hash.clone()),
            expires_at: Set(token.expires_at),
            used_at: Set(token.used_at),
            created_at: Set(token.created_at),
        }
    }
}

// ===== Stations =====

impl TryFrom<entity::station::Model> for Station {
    type Error = anyhow::Error;

    fn try_from(row: entity::station::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            province: parse("stations.province", &row.province)?,
            contact_email: row.contact_email,
            contact_number: row.contact_number,
            website: row.website,
            is_active: row.is_active,
            has_content_access: row.has_content_access,
            allowed_languages: json_strings("stations.allowed_languages", row.allowed_languages)?,
            allowed_religions: json_strings("stations.allowed_religions", row.allowed_religions)?,
            blocked_category_ids: json_ids(
                "stations.blocked_category_ids",
                row.blocked_category_ids,
            )?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Station> for entity::station::ActiveModel {
    fn from(station: &Station) -> Self {
        Self {
            id: Set(station.id),
            name: Set(station.name.clone()),
            description: Set(station.description.clone()),
            province: Set(station.province.as_str().to_string()),
            contact_email: Set(station.contact_email.clone()),
            contact_number: Set(station.contact_number.clone()),
            website: Set(station.website.clone()),
            is_active: Set(station.is_active),
            has_content_access: Set(station.has_content_access),
            allowed_languages: Set(serde_json::json!(station.allowed_languages)),
            allowed_religions: Set(serde_json::json!(station.allowed_religions)),
            blocked_category_ids: Set(serde_json::json!(station.blocked_category_ids)),
            created_at: Set(station.created_at),
            updated_at: Set(station.updated_at),
        }
    }
}

// ===== Taxonomy =====

impl From<entity::category::Model> for Category {
    fn from(row: entity::category::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            parent_id: row.parent_id,
            level: row.level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Category> for entity::category::ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: Set(category.id),
            name: Set(category.name.clone()),
            slug: Set(category.slug.clone()),
            description: Set(category.description.clone()),
            parent_id: Set(category.parent_id),
            level: Set(category.level),
            created_at: Set(category.created_at),
            updated_at: Set(category.updated_at),
        }
    }
}

impl TryFrom<entity::classification::Model> for Classification {
    type Error = anyhow::Error;

    fn try_from(row: entity::classification::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            kind: parse("classifications.kind", &row.kind)?,
            description: row.description,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Classification> for entity::classification::ActiveModel {
    fn from(c: &Classification) -> Self {
        Self {
            id: Set(c.id),
            name: Set(c.name.clone()),
            slug: Set(c.slug.clone()),
            kind: Set(c.kind.as_str().to_string()),
            description: Set(c.description.clone()),
            is_active: Set(c.is_active),
            sort_order: Set(c.sort_order),
            created_at: Set(c.created_at),
            updated_at: Set(c.updated_at),
        }
    }
}

impl From<entity::tag::Model> for Tag {
    fn from(row: entity::tag::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Tag> for entity::tag::ActiveModel {
    fn from(tag: &Tag) -> Self {
        Self {
            id: Set(tag.id),
            name: Set(tag.name.clone()),
            slug: Set(tag.slug.clone()),
            created_at: Set(tag.created_at),
            updated_at: Set(tag.updated_at),
        }
    }
}

// ===== Stories =====

/// Story row plus its link tables
pub fn story_from_parts(
    row: entity::story::Model,
    classification_ids: Vec<Uuid>,
    tag_ids: Vec<Uuid>,
) -> Result<Story> {
    Ok(Story {
        id: row.id,
        title: row.title,
        slug: row.slug,
        content: row.content,
        summary: row.summary,
        status: parse("stories.status", &row.status)?,
        author_id: row.author_id,
        reviewer_id: row.reviewer_id,
        approver_id: row.approver_id,
        publisher_id: row.publisher_id,
        category_id: row.category_id,
        original_story_id: row.original_story_id,
        classification_ids,
        tag_ids,
        published_at: row.published_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    })
}

impl From<&Story> for entity::story::ActiveModel {
    fn from(story: &Story) -> Self {
        Self {
            id: Set(story.id),
            title: Set(story.title.clone()),
            slug: Set(story.slug.clone()),
            content: Set(story.content.clone()),
            summary: Set(story.summary.clone()),
            status: Set(story.status.as_str().to_string()),
            author_id: Set(story.author_id),
            reviewer_id: Set(story.reviewer_id),
            approver_id: Set(story.approver_id),
            publisher_id: Set(story.publisher_id),
            category_id: Set(story.category_id),
            original_story_id: Set(story.original_story_id),
            published_at: Set(story.published_at),
            created_at: Set(story.created_at),
            updated_at: Set(story.updated_at),
            deleted_at: Set(story.deleted_at),
        }
    }
}

impl From<entity::audio_clip::Model> for AudioClip {
    fn from(row: entity::audio_clip::Model) -> Self {
        Self {
            id: row.id,
            story_id: row.story_id,
            url: row.url,
            pathname: row.pathname,
            file_name: row.file_name,
            mime_type: row.mime_type,
            file_size: row.file_size,
            uploaded_by: row.uploaded_by,
            created_at: row.created_at,
        }
    }
}

impl From<&AudioClip> for entity::audio_clip::ActiveModel {
    fn from(clip: &AudioClip) -> Self {
        Self {
            id: Set(clip.id),
            story_id: Set(clip.story_id),
            url: Set(clip.url.clone()),
            pathname: Set(clip.pathname.clone()),
            file_name: Set(clip.file_name.clone()),
            mime_type: Set(clip.mime_type.clone()),
            file_size: Set(clip.file_size),
            uploaded_by: Set(clip.uploaded_by),
            created_at: Set(clip.created_at),
        }
    }
}

impl TryFrom<entity::comment::Model> for Comment {
    type Error = anyhow::Error;

    fn try_from(row: entity::comment::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            story_id: row.story_id,
            author_id: row.author_id,
            parent_id: row.parent_id,
            content: row.content,
            comment_type: parse("comments.comment_type", &row.comment_type)?,
            is_resolved: row.is_resolved,
            resolved_by: row.resolved_by,
            resolved_at: row.resolved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Comment> for entity::comment::ActiveModel {
    fn from(c: &Comment) -> Self {
        Self {
            id: Set(c.id),
            story_id: Set(c.story_id),
            author_id: Set(c.author_id),
            parent_id: Set(c.parent_id),
            content: Set(c.content.clone()),
            comment_type: Set(c.comment_type.as_str().to_string()),
            is_resolved: Set(c.is_resolved),
            resolved_by: Set(c.resolved_by),
            resolved_at: Set(c.resolved_at),
            created_at: Set(c.created_at),
            updated_at: Set(c.updated_at),
        }
    }
}

// ===== Tasks =====

impl TryFrom<entity::task::Model> for Task {
    type Error = anyhow::Error;

    fn try_from(row: entity::task::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            task_type: parse("tasks.task_type", &row.task_type)?,
            status: parse("tasks.status", &row.status)?,
            priority: parse("tasks.priority", &row.priority)?,
            assigned_to_id: row.assigned_to_id,
            created_by_id: row.created_by_id,
            story_id: row.story_id,
            due_date: row.due_date,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Task> for entity::task::ActiveModel {
    fn from(task: &Task) -> Self {
        Self {
            id: Set(task.id),
            title: Set(task.title.clone()),
            description: Set(task.description.clone()),
            task_type: Set(task.task_type.as_str().to_string()),
            status: Set(task.status.as_str().to_string()),
            priority: Set(task.priority.as_str().to_string()),
            priority_rank: Set(priority_rank(task.priority)),
            assigned_to_id: Set(task.assigned_to_id),
            created_by_id: Set(task.created_by_id),
            story_id: Set(task.story_id),
            due_date: Set(task.due_date),
            completed_at: Set(task.completed_at),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

// ===== Shows =====

impl From<entity::show::Model> for Show {
    fn from(row: entity::show::Model) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            category_id: row.category_id,
            cover_image_url: row.cover_image_url,
            is_active: row.is_active,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Show> for entity::show::ActiveModel {
    fn from(show: &Show) -> Self {
        Self {
            id: Set(show.id),
            title: Set(show.title.clone()),
            slug: Set(show.slug.clone()),
            description: Set(show.description.clone()),
            category_id: Set(show.category_id),
            cover_image_url: Set(show.cover_image_url.clone()),
            is_active: Set(show.is_active),
            created_by: Set(show.created_by),
            created_at: Set(show.created_at),
            updated_at: Set(show.updated_at),
        }
    }
}

impl TryFrom<entity::episode::Model> for Episode {
    type Error = anyhow::Error;

    fn try_from(row: entity::episode::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            show_id: row.show_id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            episode_number: row.episode_number,
            status: parse("episodes.status", &row.status)?,
            audio_url: row.audio_url,
            audio_pathname: row.audio_pathname,
            file_size: row.file_size,
            duration_seconds: row.duration_seconds,
            published_at: row.published_at,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Episode> for entity::episode::ActiveModel {
    fn from(e: &Episode) -> Self {
        Self {
            id: Set(e.id),
            show_id: Set(e.show_id),
            title: Set(e.title.clone()),
            slug: Set(e.slug.clone()),
            description: Set(e.description.clone()),
            episode_number: Set(e.episode_number),
            status: Set(e.status.as_str().to_string()),
            audio_url: Set(e.audio_url.clone()),
            audio_pathname: Set(e.audio_pathname.clone()),
            file_size: Set(e.file_size),
            duration_seconds: Set(e.duration_seconds),
            published_at: Set(e.published_at),
            created_by: Set(e.created_by),
            created_at: Set(e.created_at),
            updated_at: Set(e.updated_at),
        }
    }
}

// ===== Bulletins =====

pub fn bulletin_from_parts(row: entity::bulletin::Model, story_ids: Vec<Uuid>) -> Result<Bulletin> {
    Ok(Bulletin {
        id: row.id,
        title: row.title,
        slug: row.slug,
        intro: row.intro,
        outro: row.outro,
        language_id: row.language_id,
        status: parse("bulletins.status", &row.status)?,
        scheduled_for: row.scheduled_for,
        author_id: row.author_id,
        reviewer_id: row.reviewer_id,
        published_at: row.published_at,
        story_ids,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl From<&Bulletin> for entity::bulletin::ActiveModel {
    fn from(b: &Bulletin) -> Self {
        Self {
            id: Set(b.id),
            title: Set(b.title.clone()),
            slug: Set(b.slug.clone()),
            intro: Set(b.intro.clone()),
            outro: Set(b.outro.clone()),
            language_id: Set(b.language_id),
            status: Set(b.status.as_str().to_string()),
            scheduled_for: Set(b.scheduled_for),
            author_id: Set(b.author_id),
            reviewer_id: Set(b.reviewer_id),
            published_at: Set(b.published_at),
            created_at: Set(b.created_at),
            updated_at: Set(b.updated_at),
        }
    }
}

// ===== Diary =====

pub fn diary_from_parts(row: entity::diary_entry::Model, assignee_ids: Vec<Uuid>) -> DiaryEntry {
    DiaryEntry {
        id: row.id,
        title: row.title,
        notes: row.notes,
        date_time: row.date_time,
        story_id: row.story_id,
        created_by: row.created_by,
        assignee_ids,
        is_completed: row.is_completed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

impl From<&DiaryEntry> for entity::diary_entry::ActiveModel {
    fn from(d: &DiaryEntry) -> Self {
        Self {
            id: Set(d.id),
            title: Set(d.title.clone()),
            notes: Set(d.notes.clone()),
            date_time: Set(d.date_time),
            story_id: Set(d.story_id),
            created_by: Set(d.created_by),
            is_completed: Set(d.is_completed),
            created_at: Set(d.created_at),
            updated_at: Set(d.updated_at),
        }
    }
}

// ===== Announcements and audit =====

impl TryFrom<entity::announcement::Model> for Announcement {
    type Error = anyhow::Error;

    fn try_from(row: entity::announcement::Model) -> Result<Self> {
        Ok(Self {
            id: row.id,
            title: row.title,
            message: row.message,
            priority: parse("announcements.priority", &row.priority)?,
            target: parse("announcements.target", &row.target)?,
            is_active: row.is_active,
            expires_at: row.expires_at,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Announcement> for entity::announcement::ActiveModel {
    fn from(a: &Announcement) -> Self {
        Self {
            id: Set(a.id),
            title: Set(a.title.clone()),
            message: Set(a.message.clone()),
            priority: Set(a.priority.as_str().to_string()),
            target: Set(a.target.as_str().to_string()),
            is_active: Set(a.is_active),
            expires_at: Set(a.expires_at),
            author_id: Set(a.author_id),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
        }
    }
}

impl From<entity::audit_log::Model> for AuditEntry {
    fn from(row: entity::audit_log::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            action: row.action,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            details: row.details,
            created_at: row.created_at,
        }
    }
}

impl From<&AuditEntry> for entity::audit_log::ActiveModel {
    fn from(e: &AuditEntry) -> Self {
        Self {
            id: Set(e.id),
            user_id: Set(e.user_id),
            action: Set(e.action.clone()),
            entity_type: Set(e.entity_type.clone()),
            entity_id: Set(e.entity_id.clone()),
            details: Set(e.details.clone()),
            created_at: Set(e.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Province, StaffRole, UserType};
    use chrono::Utc;

    #[test]
    fn unknown_enum_text_is_rejected() {
        let now = Utc::now();
        let row = entity::user::Model {
            id: Uuid::new_v4(),
            email: "a@b.co".to_string(),
            password_hash: String::new(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            user_type: "STAFF".to_string(),
            staff_role: Some("CHIEF".to_string()),
            translation_language: None,
            radio_station_id: None,
            is_primary_contact: false,
            is_active: true,
            must_change_password: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(User::try_from(row.clone()).is_err());

        let ok = entity::user::Model {
            staff_role: Some(StaffRole::Editor.as_str().to_string()),
            ..row
        };
        let user = User::try_from(ok).unwrap();
        assert_eq!(user.user_type, UserType::Staff);
        assert_eq!(user.staff_role, Some(StaffRole::Editor));
    }

    #[test]
    fn station_lists_are_stored_as_json_arrays() {
        let now = Utc::now();
        let blocked = Uuid::new_v4();
        let station = Station {
            id: Uuid::new_v4(),
            name: "Radio Khwezi".to_string(),
            description: None,
            province: Province::KwazuluNatal,
            contact_email: None,
            contact_number: None,
            website: None,
            is_active: true,
            has_content_access: true,
            allowed_languages: vec!["English".to_string(), "isiZulu".to_string()],
            allowed_religions: vec!["Christian".to_string()],
            blocked_category_ids: vec![blocked],
            created_at: now,
            updated_at: now,
        };
        let active: entity::station::ActiveModel = (&station).into();
        assert_eq!(
            active.allowed_languages.clone().unwrap(),
            serde_json::json!(["English", "isiZulu"])
        );
        assert_eq!(
            active.blocked_category_ids.clone().unwrap(),
            serde_json::json!([blocked.to_string()])
        );
    }

    #[test]
    fn priority_rank_follows_urgency() {
        assert!(priority_rank(TaskPriority::Urgent) > priority_rank(TaskPriority::High));
        assert!(priority_rank(TaskPriority::Low) < priority_rank(TaskPriority::Medium));
    }
}

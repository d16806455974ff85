//! Mapper implementations for converting between DTOs and contract models
//!
//! Responses convert infallibly with `From`. Requests carry enum values as
//! strings, so they convert with `TryFrom` and reject unknown values as
//! field-level validation errors.

use super::dto::*;
use crate::contract::{self, NewsroomError};
use std::str::FromStr;

fn parse<E>(field: &str, value: &str) -> Result<E, NewsroomError>
where
    E: FromStr<Err = NewsroomError>,
{
    value
        .parse::<E>()
        .map_err(|_| NewsroomError::invalid_field(field, format!("unknown value '{}'", value)))
}

fn parse_opt<E>(field: &str, value: Option<&str>) -> Result<Option<E>, NewsroomError>
where
    E: FromStr<Err = NewsroomError>,
{
    value.map(|v| parse(field, v)).transpose()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<T, U> From<contract::Page<T>> for ListResponse<U>
where
    U: From<T>,
{
    fn from(page: contract::Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items.into_iter().map(U::from).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        }
    }
}

// ===== Users and stations =====

impl From<contract::User> for UserDto {
    fn from(user: contract::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            user_type: user.user_type.to_string(),
            staff_role: user.staff_role.map(|r| r.to_string()),
            translation_language: user.translation_language,
            radio_station_id: user.radio_station_id,
            is_primary_contact: user.is_primary_contact,
            is_active: user.is_active,
            must_change_password: user.must_change_password,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<contract::LoginOutcome> for LoginResponse {
    fn from(outcome: contract::LoginOutcome) -> Self {
        Self {
            user: outcome.user.into(),
            token: outcome.token,
            expires_at: outcome.expires_at,
        }
    }
}

impl TryFrom<CreateUserRequest> for contract::NewUser {
    type Error = NewsroomError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            user_type: parse("user_type", &req.user_type)?,
            staff_role: parse_opt("staff_role", req.staff_role.as_deref())?,
            translation_language: non_blank(req.translation_language),
            radio_station_id: req.radio_station_id,
        })
    }
}

impl TryFrom<UpdateUserRequest> for contract::UserPatch {
    type Error = NewsroomError;

    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            first_name: req.first_name,
            last_name: req.last_name,
            staff_role: parse_opt("staff_role", req.staff_role.as_deref())?,
            translation_language: req.translation_language.map(non_blank),
            is_active: req.is_active,
        })
    }
}

impl TryFrom<&UserListQuery> for contract::UserFilter {
    type Error = NewsroomError;

    fn try_from(q: &UserListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            user_type: parse_opt("user_type", q.user_type.as_deref())?,
            staff_role: parse_opt("staff_role", q.staff_role.as_deref())?,
            station_id: q.station_id,
            is_active: q.is_active,
            search: non_blank(q.search.clone()),
        })
    }
}

impl From<contract::Station> for StationDto {
    fn from(station: contract::Station) -> Self {
        Self {
            id: station.id,
            name: station.name,
            description: station.description,
            province: station.province.to_string(),
            contact_email: station.contact_email,
            contact_number: station.contact_number,
            website: station.website,
            is_active: station.is_active,
            has_content_access: station.has_content_access,
            allowed_languages: station.allowed_languages,
            allowed_religions: station.allowed_religions,
            blocked_category_ids: station.blocked_category_ids,
            created_at: station.created_at,
            updated_at: station.updated_at,
        }
    }
}

impl TryFrom<CreateStationRequest> for contract::NewStation {
    type Error = NewsroomError;

    fn try_from(req: CreateStationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            description: non_blank(req.description),
            province: parse("province", &req.province)?,
            contact_email: non_blank(req.contact_email),
            contact_number: non_blank(req.contact_number),
            website: non_blank(req.website),
            has_content_access: req.has_content_access,
            allowed_languages: req.allowed_languages,
            allowed_religions: req.allowed_religions,
            blocked_category_ids: req.blocked_category_ids,
        })
    }
}

impl TryFrom<UpdateStationRequest> for contract::StationPatch {
    type Error = NewsroomError;

    fn try_from(req: UpdateStationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            description: req.description.map(non_blank),
            province: parse_opt("province", req.province.as_deref())?,
            contact_email: req.contact_email.map(non_blank),
            contact_number: req.contact_number.map(non_blank),
            website: req.website.map(non_blank),
            is_active: req.is_active,
            has_content_access: req.has_content_access,
            allowed_languages: req.allowed_languages,
            allowed_religions: req.allowed_religions,
            blocked_category_ids: req.blocked_category_ids,
        })
    }
}

impl TryFrom<&StationListQuery> for contract::StationFilter {
    type Error = NewsroomError;

    fn try_from(q: &StationListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            province: parse_opt("province", q.province.as_deref())?,
            is_active: q.is_active,
            search: non_blank(q.search.clone()),
        })
    }
}

// ===== Taxonomy =====

impl From<contract::Category> for CategoryDto {
    fn from(c: contract::Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            parent_id: c.parent_id,
            level: c.level,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<contract::CategoryNode> for CategoryNodeDto {
    fn from(node: contract::CategoryNode) -> Self {
        Self {
            category: node.category.into(),
            children: node.children.into_iter().map(Self::from).collect(),
        }
    }
}

impl From<CreateCategoryRequest> for contract::NewCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: non_blank(req.description),
            parent_id: req.parent_id,
        }
    }
}

impl From<UpdateCategoryRequest> for contract::CategoryPatch {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description.map(non_blank),
            parent_id: req.parent_id,
        }
    }
}

impl From<contract::Classification> for ClassificationDto {
    fn from(c: contract::Classification) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            r#type: c.kind.to_string(),
            description: c.description,
            is_active: c.is_active,
            sort_order: c.sort_order,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl TryFrom<CreateClassificationRequest> for contract::NewClassification {
    type Error = NewsroomError;

    fn try_from(req: CreateClassificationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            kind: parse("type", &req.r#type)?,
            description: non_blank(req.description),
            sort_order: req.sort_order,
        })
    }
}

impl From<UpdateClassificationRequest> for contract::ClassificationPatch {
    fn from(req: UpdateClassificationRequest) -> Self {
        Self {
            name: req.name,
            description: req.description.map(non_blank),
            is_active: req.is_active,
            sort_order: req.sort_order,
        }
    }
}

impl ClassificationListQuery {
    pub fn kind(&self) -> Result<Option<contract::ClassificationType>, NewsroomError> {
        parse_opt("type", self.r#type.as_deref())
    }
}

impl From<contract::Tag> for TagDto {
    fn from(t: contract::Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

// ===== Stories =====

impl From<contract::Story> for StoryDto {
    fn from(s: contract::Story) -> Self {
        Self {
            id: s.id,
            title: s.title,
            slug: s.slug,
            content: s.content,
            summary: s.summary,
            status: s.status.to_string(),
            author_id: s.author_id,
            reviewer_id: s.reviewer_id,
            approver_id: s.approver_id,
            publisher_id: s.publisher_id,
            category_id: s.category_id,
            original_story_id: s.original_story_id,
            classification_ids: s.classification_ids,
            tag_ids: s.tag_ids,
            published_at: s.published_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<contract::StoryDetails> for StoryDetailsDto {
    fn from(d: contract::StoryDetails) -> Self {
        Self {
            story: d.story.into(),
            category: d.category.map(CategoryDto::from),
            classifications: d.classifications.into_iter().map(Into::into).collect(),
            tags: d.tags.into_iter().map(Into::into).collect(),
            audio: d.audio.into_iter().map(Into::into).collect(),
            translations: d.translations.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::AudioClip> for AudioClipDto {
    fn from(a: contract::AudioClip) -> Self {
        Self {
            id: a.id,
            story_id: a.story_id,
            url: a.url,
            file_name: a.file_name,
            mime_type: a.mime_type,
            file_size: a.file_size,
            uploaded_by: a.uploaded_by,
            created_at: a.created_at,
        }
    }
}

impl From<CreateStoryRequest> for contract::NewStory {
    fn from(req: CreateStoryRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            summary: non_blank(req.summary),
            category_id: req.category_id,
            classification_ids: req.classification_ids,
            tag_ids: req.tag_ids,
        }
    }
}

impl From<UpdateStoryRequest> for contract::StoryPatch {
    fn from(req: UpdateStoryRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            summary: req.summary.map(non_blank),
            category_id: req.category_id,
            classification_ids: req.classification_ids,
            tag_ids: req.tag_ids,
        }
    }
}

impl TryFrom<&StoryListQuery> for contract::StoryFilter {
    type Error = NewsroomError;

    fn try_from(q: &StoryListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_opt("status", q.status.as_deref())?,
            author_id: q.author_id,
            category_id: q.category_id,
            classification_id: q.classification_id,
            tag_id: q.tag_id,
            search: non_blank(q.search.clone()),
        })
    }
}

impl TryFrom<StatusChangeRequest> for contract::StatusChange {
    type Error = NewsroomError;

    fn try_from(req: StatusChangeRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            to: parse("status", &req.status)?,
            reason: non_blank(req.reason),
            assignee_id: req.assignee_id,
        })
    }
}

impl From<&FeedQueryParams> for contract::FeedQuery {
    fn from(q: &FeedQueryParams) -> Self {
        Self {
            category_id: q.category_id,
            search: non_blank(q.search.clone()),
        }
    }
}

// ===== Comments =====

impl From<contract::Comment> for CommentDto {
    fn from(c: contract::Comment) -> Self {
        Self {
            id: c.id,
            story_id: c.story_id,
            author_id: c.author_id,
            parent_id: c.parent_id,
            content: c.content,
            comment_type: c.comment_type.to_string(),
            is_resolved: c.is_resolved,
            resolved_by: c.resolved_by,
            resolved_at: c.resolved_at,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl TryFrom<CreateCommentRequest> for contract::NewComment {
    type Error = NewsroomError;

    fn try_from(req: CreateCommentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            content: req.content,
            comment_type: parse_opt("comment_type", req.comment_type.as_deref())?
                .unwrap_or(contract::CommentType::General),
            parent_id: req.parent_id,
        })
    }
}

// ===== Shows and episodes =====

impl From<contract::Show> for ShowDto {
    fn from(s: contract::Show) -> Self {
        Self {
            id: s.id,
            title: s.title,
            slug: s.slug,
            description: s.description,
            category_id: s.category_id,
            cover_image_url: s.cover_image_url,
            is_active: s.is_active,
            created_by: s.created_by,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<CreateShowRequest> for contract::NewShow {
    fn from(req: CreateShowRequest) -> Self {
        Self {
            title: req.title,
            description: non_blank(req.description),
            category_id: req.category_id,
            cover_image_url: non_blank(req.cover_image_url),
        }
    }
}

impl From<UpdateShowRequest> for contract::ShowPatch {
    fn from(req: UpdateShowRequest) -> Self {
        Self {
            title: req.title,
            description: req.description.map(non_blank),
            category_id: req.category_id,
            cover_image_url: req.cover_image_url.map(non_blank),
            is_active: req.is_active,
        }
    }
}

impl From<contract::Episode> for EpisodeDto {
    fn from(e: contract::Episode) -> Self {
        Self {
            id: e.id,
            show_id: e.show_id,
            title: e.title,
            slug: e.slug,
            description: e.description,
            episode_number: e.episode_number,
            status: e.status.to_string(),
            audio_url: e.audio_url,
            file_size: e.file_size,
            duration_seconds: e.duration_seconds,
            published_at: e.published_at,
            created_by: e.created_by,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<CreateEpisodeRequest> for contract::NewEpisode {
    fn from(req: CreateEpisodeRequest) -> Self {
        Self {
            title: req.title,
            description: non_blank(req.description),
            duration_seconds: req.duration_seconds,
        }
    }
}

impl TryFrom<UpdateEpisodeRequest> for contract::EpisodePatch {
    type Error = NewsroomError;

    fn try_from(req: UpdateEpisodeRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            description: req.description.map(non_blank),
            duration_seconds: req.duration_seconds,
            status: parse_opt("status", req.status.as_deref())?,
        })
    }
}

impl EpisodeListQuery {
    pub fn status(&self) -> Result<Option<contract::EpisodeStatus>, NewsroomError> {
        parse_opt("status", self.status.as_deref())
    }
}

// ===== Bulletins =====

impl From<contract::Bulletin> for BulletinDto {
    fn from(b: contract::Bulletin) -> Self {
        Self {
            id: b.id,
            title: b.title,
            slug: b.slug,
            intro: b.intro,
            outro: b.outro,
            language_id: b.language_id,
            status: b.status.to_string(),
            scheduled_for: b.scheduled_for,
            author_id: b.author_id,
            reviewer_id: b.reviewer_id,
            published_at: b.published_at,
            story_ids: b.story_ids,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

impl From<CreateBulletinRequest> for contract::NewBulletin {
    fn from(req: CreateBulletinRequest) -> Self {
        Self {
            title: req.title,
            intro: non_blank(req.intro),
            outro: non_blank(req.outro),
            language_id: req.language_id,
            scheduled_for: req.scheduled_for,
        }
    }
}

impl From<UpdateBulletinRequest> for contract::BulletinPatch {
    fn from(req: UpdateBulletinRequest) -> Self {
        Self {
            title: req.title,
            intro: req.intro.map(non_blank),
            outro: req.outro.map(non_blank),
            language_id: req.language_id,
            scheduled_for: req.scheduled_for,
        }
    }
}

impl BulletinListQuery {
    pub fn status(&self) -> Result<Option<contract::BulletinStatus>, NewsroomError> {
        parse_opt("status", self.status.as_deref())
    }
}

impl BulletinStatusRequest {
    pub fn target(&self) -> Result<contract::BulletinStatus, NewsroomError> {
        parse("status", &self.status)
    }
}

// ===== Tasks =====

impl From<contract::Task> for TaskDto {
    fn from(t: contract::Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            task_type: t.task_type.to_string(),
            status: t.status.to_string(),
            priority: t.priority.to_string(),
            assigned_to_id: t.assigned_to_id,
            created_by_id: t.created_by_id,
            story_id: t.story_id,
            due_date: t.due_date,
            completed_at: t.completed_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl TryFrom<CreateTaskRequest> for contract::NewTask {
    type Error = NewsroomError;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            description: non_blank(req.description),
            task_type: parse("task_type", &req.task_type)?,
            priority: parse_opt("priority", req.priority.as_deref())?
                .unwrap_or(contract::TaskPriority::Medium),
            assigned_to_id: req.assigned_to_id,
            story_id: req.story_id,
            due_date: req.due_date,
        })
    }
}

impl TryFrom<UpdateTaskRequest> for contract::TaskPatch {
    type Error = NewsroomError;

    fn try_from(req: UpdateTaskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            description: req.description.map(non_blank),
            status: parse_opt("status", req.status.as_deref())?,
            priority: parse_opt("priority", req.priority.as_deref())?,
            assigned_to_id: req.assigned_to_id,
            due_date: req.due_date,
        })
    }
}

impl TryFrom<&TaskListQuery> for contract::TaskFilter {
    type Error = NewsroomError;

    fn try_from(q: &TaskListQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_opt("status", q.status.as_deref())?,
            priority: parse_opt("priority", q.priority.as_deref())?,
            assigned_to_id: q.assigned_to_id,
            created_by_id: q.created_by_id,
            story_id: q.story_id,
        })
    }
}

// ===== Diary =====

impl From<contract::DiaryEntry> for DiaryEntryDto {
    fn from(d: contract::DiaryEntry) -> Self {
        Self {
            id: d.id,
            title: d.title,
            notes: d.notes,
            date_time: d.date_time,
            story_id: d.story_id,
            created_by: d.created_by,
            assignee_ids: d.assignee_ids,
            is_completed: d.is_completed,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

impl From<CreateDiaryEntryRequest> for contract::NewDiaryEntry {
    fn from(req: CreateDiaryEntryRequest) -> Self {
        Self {
            title: req.title,
            notes: non_blank(req.notes),
            date_time: req.date_time,
            story_id: req.story_id,
            assignee_ids: req.assignee_ids,
        }
    }
}

impl From<UpdateDiaryEntryRequest> for contract::DiaryPatch {
    fn from(req: UpdateDiaryEntryRequest) -> Self {
        Self {
            title: req.title,
            notes: req.notes.map(non_blank),
            date_time: req.date_time,
            story_id: req.story_id,
            assignee_ids: req.assignee_ids,
            is_completed: req.is_completed,
        }
    }
}

// ===== Announcements =====

impl From<contract::Announcement> for AnnouncementDto {
    fn from(a: contract::Announcement) -> Self {
        Self {
            id: a.id,
            title: a.title,
            message: a.message,
            priority: a.priority.to_string(),
            target: a.target.to_string(),
            is_active: a.is_active,
            expires_at: a.expires_at,
            author_id: a.author_id,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl From<contract::AnnouncementView> for AnnouncementViewDto {
    fn from(v: contract::AnnouncementView) -> Self {
        Self {
            announcement: v.announcement.into(),
            dismissed: v.dismissed,
        }
    }
}

impl TryFrom<CreateAnnouncementRequest> for contract::NewAnnouncement {
    type Error = NewsroomError;

    fn try_from(req: CreateAnnouncementRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            message: req.message,
            priority: parse_opt("priority", req.priority.as_deref())?
                .unwrap_or(contract::AnnouncementPriority::Medium),
            target: parse_opt("target", req.target.as_deref())?
                .unwrap_or(contract::AnnouncementTarget::All),
            expires_at: req.expires_at,
        })
    }
}

impl TryFrom<UpdateAnnouncementRequest> for contract::AnnouncementPatch {
    type Error = NewsroomError;

    fn try_from(req: UpdateAnnouncementRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            message: req.message,
            priority: parse_opt("priority", req.priority.as_deref())?,
            target: parse_opt("target", req.target.as_deref())?,
            is_active: req.is_active,
            expires_at: req.expires_at,
        })
    }
}

// ===== Audit and diagnostics =====

impl From<contract::AuditEntry> for AuditEntryDto {
    fn from(e: contract::AuditEntry) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            action: e.action,
            entity_type: e.entity_type,
            entity_id: e.entity_id,
            details: e.details,
            created_at: e.created_at,
        }
    }
}

impl From<&AuditListQuery> for contract::AuditFilter {
    fn from(q: &AuditListQuery) -> Self {
        Self {
            user_id: q.user_id,
            entity_type: non_blank(q.entity_type.clone()),
            entity_id: non_blank(q.entity_id.clone()),
            action: non_blank(q.action.clone()),
            from: q.from,
            to: q.to,
        }
    }
}

impl From<contract::DiagnosticCheck> for DiagnosticCheckDto {
    fn from(c: contract::DiagnosticCheck) -> Self {
        Self {
            name: c.name,
            ok: c.ok,
            duration_ms: c.duration_ms,
            message: c.message,
        }
    }
}

impl From<Vec<contract::DiagnosticCheck>> for DiagnosticsResponse {
    fn from(checks: Vec<contract::DiagnosticCheck>) -> Self {
        Self {
            ok: checks.iter().all(|c| c.ok),
            checks: checks.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{PageRequest, StaffRole, UserType};

    #[test]
    fn unknown_enum_values_are_field_errors() {
        let req = CreateUserRequest {
            email: "a@b.co".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            user_type: "STAFF".into(),
            staff_role: Some("chief".into()),
            translation_language: None,
            radio_station_id: None,
        };
        match contract::NewUser::try_from(req) {
            Err(NewsroomError::Validation { details, .. }) => {
                assert_eq!(details[0].field, "staff_role");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn enum_values_parse_case_insensitively() {
        let req = CreateUserRequest {
            email: "a@b.co".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            user_type: "staff".into(),
            staff_role: Some("sub_editor".into()),
            translation_language: Some("  ".into()),
            radio_station_id: None,
        };
        let new = contract::NewUser::try_from(req).unwrap();
        assert_eq!(new.user_type, UserType::Staff);
        assert_eq!(new.staff_role, Some(StaffRole::SubEditor));
        assert_eq!(new.translation_language, None);
    }

    #[test]
    fn list_response_reports_total_pages() {
        let page = contract::Page::new(vec![1u8, 2], 45, PageRequest::new(2, 20));
        let response: ListResponse<u8> = page.into();
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.page, 2);
    }

    #[test]
    fn comment_type_defaults_to_general() {
        let new = contract::NewComment::try_from(CreateCommentRequest {
            content: "Looks good".into(),
            comment_type: None,
            parent_id: None,
        })
        .unwrap();
        assert_eq!(new.comment_type, contract::CommentType::General);
    }
}

//! Role-based permission tables
//!
//! Every check is a static lookup keyed by staff role. Ownership rules
//! ("interns may only edit their own drafts") live with the operation that
//! needs them, not here.

use crate::contract::model::string_enum;
use crate::contract::{NewsroomError, Principal, StaffRole};

string_enum! {
    /// Actions on stories, including workflow moves
    StoryAction {
        Create => "CREATE",
        Read => "READ",
        Update => "UPDATE",
        Delete => "DELETE",
        SubmitForReview => "SUBMIT_FOR_REVIEW",
        Review => "REVIEW",
        Approve => "APPROVE",
        Publish => "PUBLISH",
        Translate => "TRANSLATE",
        Archive => "ARCHIVE",
    }
}

string_enum! {
    CrudAction {
        Create => "CREATE",
        Read => "READ",
        Update => "UPDATE",
        Delete => "DELETE",
    }
}

string_enum! {
    /// Resources guarded by the CRUD permission table
    Resource {
        Tag => "TAG",
        Category => "CATEGORY",
        Classification => "CLASSIFICATION",
        Comment => "COMMENT",
        Task => "TASK",
        Show => "SHOW",
        Episode => "EPISODE",
        Bulletin => "BULLETIN",
        Diary => "DIARY",
        Announcement => "ANNOUNCEMENT",
        Station => "STATION",
        User => "USER",
        AuditLog => "AUDIT_LOG",
        Diagnostics => "DIAGNOSTICS",
    }
}

/// Whether `role` may perform `action` on stories
pub fn has_story_permission(role: StaffRole, action: StoryAction) -> bool {
    use StoryAction::*;

    match role {
        StaffRole::Intern => matches!(action, Create | Read | Update | SubmitForReview),
        StaffRole::Journalist => matches!(
            action,
            Create | Read | Update | Delete | SubmitForReview | Review | Translate
        ),
        StaffRole::SubEditor => !matches!(action, Archive),
        StaffRole::Editor | StaffRole::Admin | StaffRole::SuperAdmin => true,
    }
}

/// Lowest role allowed to perform `action` on `resource`, `None` when nobody may
fn minimum_role(resource: Resource, action: CrudAction) -> Option<StaffRole> {
    use CrudAction::*;
    use StaffRole::*;

    match (resource, action) {
        (Resource::Tag, Read | Create) => Some(Intern),
        (Resource::Tag, Update) => Some(SubEditor),
        (Resource::Tag, Delete) => Some(Editor),

        (Resource::Category, Read) => Some(Intern),
        (Resource::Category, _) => Some(Editor),

        (Resource::Classification, Read) => Some(Intern),
        (Resource::Classification, _) => Some(Admin),

        (Resource::Comment, _) => Some(Intern),

        (Resource::Task, Read | Update) => Some(Intern),
        (Resource::Task, Create) => Some(Journalist),
        (Resource::Task, Delete) => Some(SubEditor),

        (Resource::Show | Resource::Episode, Read) => Some(Intern),
        (Resource::Show | Resource::Episode, Create | Update) => Some(SubEditor),
        (Resource::Show | Resource::Episode, Delete) => Some(Editor),

        (Resource::Bulletin, Delete) => Some(Editor),
        (Resource::Bulletin, _) => Some(Journalist),

        (Resource::Diary, Delete) => Some(SubEditor),
        (Resource::Diary, _) => Some(Intern),

        (Resource::Announcement, Read) => Some(Intern),
        (Resource::Announcement, _) => Some(Editor),

        (Resource::Station | Resource::User, Read) => Some(SubEditor),
        (Resource::Station | Resource::User, _) => Some(Admin),

        (Resource::AuditLog, Read) => Some(Admin),
        (Resource::AuditLog, _) => None,

        (Resource::Diagnostics, Read | Create) => Some(SuperAdmin),
        (Resource::Diagnostics, _) => None,
    }
}

/// Whether `role` may perform `action` on `resource`
pub fn has_permission(role: StaffRole, resource: Resource, action: CrudAction) -> bool {
    minimum_role(resource, action).is_some_and(|min| role >= min)
}

pub fn has_tag_permission(role: StaffRole, action: CrudAction) -> bool {
    has_permission(role, Resource::Tag, action)
}

pub fn has_comment_permission(role: StaffRole, action: CrudAction) -> bool {
    has_permission(role, Resource::Comment, action)
}

pub fn has_category_permission(role: StaffRole, action: CrudAction) -> bool {
    has_permission(role, Resource::Category, action)
}

pub fn has_classification_permission(role: StaffRole, action: CrudAction) -> bool {
    has_permission(role, Resource::Classification, action)
}

pub fn has_task_permission(role: StaffRole, action: CrudAction) -> bool {
    has_permission(role, Resource::Task, action)
}

pub fn has_show_permission(role: StaffRole, action: CrudAction) -> bool {
    has_permission(role, Resource::Show, action)
}

pub fn has_bulletin_permission(role: StaffRole, action: CrudAction) -> bool {
    has_permission(role, Resource::Bulletin, action)
}

/// Whether `actor` may give a user the `target` role
///
/// Only a super-admin may mint peers; everyone else assigns strictly below
/// their own rank.
pub fn can_assign_role(actor: StaffRole, target: StaffRole) -> bool {
    actor == StaffRole::SuperAdmin || target < actor
}

/// Staff role of the caller, or `Forbidden` for radio users
pub fn require_staff(principal: &Principal) -> Result<StaffRole, NewsroomError> {
    principal
        .role()
        .ok_or_else(|| NewsroomError::forbidden("staff account required"))
}

/// Fails with `Forbidden` unless the caller passes the CRUD table
pub fn require(
    principal: &Principal,
    resource: Resource,
    action: CrudAction,
) -> Result<StaffRole, NewsroomError> {
    let role = require_staff(principal)?;
    if has_permission(role, resource, action) {
        Ok(role)
    } else {
        Err(NewsroomError::forbidden(format!(
            "{} may not {} {}",
            role,
            action.as_str().to_lowercase(),
            resource.as_str().to_lowercase()
        )))
    }
}

/// Fails with `Forbidden` unless the caller passes the story table
pub fn require_story(principal: &Principal, action: StoryAction) -> Result<StaffRole, NewsroomError> {
    let role = require_staff(principal)?;
    if has_story_permission(role, action) {
        Ok(role)
    } else {
        Err(NewsroomError::forbidden(format!(
            "{} may not {} stories",
            role,
            action.as_str().to_lowercase().replace('_', " ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn interns_cannot_review_or_publish() {
        assert!(has_story_permission(StaffRole::Intern, StoryAction::Create));
        assert!(has_story_permission(StaffRole::Intern, StoryAction::SubmitForReview));
        assert!(!has_story_permission(StaffRole::Intern, StoryAction::Review));
        assert!(!has_story_permission(StaffRole::Intern, StoryAction::Publish));
        assert!(!has_story_permission(StaffRole::Intern, StoryAction::Delete));
    }

    #[test]
    fn journalists_review_but_do_not_approve() {
        assert!(has_story_permission(StaffRole::Journalist, StoryAction::Review));
        assert!(has_story_permission(StaffRole::Journalist, StoryAction::Translate));
        assert!(!has_story_permission(StaffRole::Journalist, StoryAction::Approve));
    }

    #[test]
    fn only_editors_and_above_archive() {
        assert!(!has_story_permission(StaffRole::SubEditor, StoryAction::Archive));
        assert!(has_story_permission(StaffRole::SubEditor, StoryAction::Publish));
        for role in [StaffRole::Editor, StaffRole::Admin, StaffRole::SuperAdmin] {
            for action in StoryAction::ALL {
                assert!(has_story_permission(role, *action), "{role} should {action}");
            }
        }
    }

    #[test]
    fn tag_table() {
        assert!(has_tag_permission(StaffRole::Intern, CrudAction::Create));
        assert!(!has_tag_permission(StaffRole::Journalist, CrudAction::Update));
        assert!(has_tag_permission(StaffRole::SubEditor, CrudAction::Update));
        assert!(!has_tag_permission(StaffRole::SubEditor, CrudAction::Delete));
        assert!(has_tag_permission(StaffRole::Editor, CrudAction::Delete));
    }

    #[test]
    fn comment_table_admits_every_staff_role() {
        for role in StaffRole::ALL {
            for action in CrudAction::ALL {
                assert!(has_comment_permission(*role, *action));
            }
        }
    }

    #[test]
    fn audit_log_is_read_only() {
        assert!(has_permission(StaffRole::Admin, Resource::AuditLog, CrudAction::Read));
        assert!(!has_permission(StaffRole::Editor, Resource::AuditLog, CrudAction::Read));
        assert!(!has_permission(StaffRole::SuperAdmin, Resource::AuditLog, CrudAction::Delete));
    }

    #[test]
    fn role_assignment_stays_below_actor() {
        assert!(can_assign_role(StaffRole::Admin, StaffRole::Editor));
        assert!(!can_assign_role(StaffRole::Admin, StaffRole::Admin));
        assert!(!can_assign_role(StaffRole::Admin, StaffRole::SuperAdmin));
        assert!(can_assign_role(StaffRole::SuperAdmin, StaffRole::SuperAdmin));
    }

    #[test]
    fn radio_users_fail_staff_checks() {
        let radio = Principal::radio(Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(
            require(&radio, Resource::Tag, CrudAction::Read),
            Err(NewsroomError::Forbidden { .. })
        ));
        assert!(require_story(&radio, StoryAction::Read).is_err());
    }
}

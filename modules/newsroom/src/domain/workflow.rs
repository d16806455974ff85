//! Editorial workflow for stories and bulletins
//!
//! Story moves are a static `(from, to) -> StoryAction` table; the caller's
//! role must hold the action, and a few moves carry extra rules (authorship,
//! no self-review, a reason when sending back for revision).

use super::permissions::{has_story_permission, StoryAction};
use crate::contract::{BulletinStatus, NewsroomError, StaffRole, StoryStatus};

/// Action required for a story move, `None` for moves that do not exist
pub fn transition_action(from: StoryStatus, to: StoryStatus) -> Option<StoryAction> {
    use StoryStatus::*;

    let action = match (from, to) {
        (Draft, InReview) => StoryAction::SubmitForReview,
        (Draft, PendingApproval) => StoryAction::Review,
        (NeedsRevision, InReview) => StoryAction::SubmitForReview,
        (NeedsRevision, PendingApproval) => StoryAction::Review,
        (InReview, NeedsRevision) => StoryAction::Review,
        (InReview, PendingApproval) => StoryAction::Review,
        (PendingApproval, NeedsRevision) => StoryAction::Approve,
        (PendingApproval, Approved) => StoryAction::Approve,
        (Approved, NeedsRevision) => StoryAction::Approve,
        (Approved, Published) => StoryAction::Publish,
        (Published, Archived) => StoryAction::Archive,
        (Archived, Published) => StoryAction::Archive,
        _ => return None,
    };
    Some(action)
}

/// Statuses reachable from `from` by someone holding every action
pub fn next_statuses(from: StoryStatus) -> Vec<StoryStatus> {
    StoryStatus::ALL
        .iter()
        .copied()
        .filter(|to| transition_action(from, *to).is_some())
        .collect()
}

/// Validate a story status change and return the action it exercises
pub fn check_transition(
    role: StaffRole,
    is_author: bool,
    from: StoryStatus,
    to: StoryStatus,
    reason: Option<&str>,
) -> Result<StoryAction, NewsroomError> {
    let action = transition_action(from, to).ok_or_else(|| NewsroomError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    })?;

    if !has_story_permission(role, action) {
        return Err(NewsroomError::forbidden(format!(
            "{} may not move a story from {} to {}",
            role, from, to
        )));
    }

    match action {
        StoryAction::SubmitForReview if !is_author && role < StaffRole::SubEditor => {
            return Err(NewsroomError::forbidden(
                "only the author may submit this story for review",
            ));
        }
        StoryAction::Review | StoryAction::Approve if is_author && role < StaffRole::Editor => {
            return Err(NewsroomError::forbidden(
                "you may not review or approve your own story",
            ));
        }
        _ => {}
    }

    if to == StoryStatus::NeedsRevision && reason.is_none_or(|r| r.trim().is_empty()) {
        return Err(NewsroomError::invalid_field(
            "reason",
            "a reason is required when requesting revisions",
        ));
    }

    Ok(action)
}

/// Whether content in `status` may still be edited by its author
pub fn is_author_editable(status: StoryStatus) -> bool {
    matches!(status, StoryStatus::Draft | StoryStatus::NeedsRevision)
}

fn is_released(status: StoryStatus) -> bool {
    matches!(status, StoryStatus::Published | StoryStatus::Archived)
}

/// Whether `role` may change the text, taxonomy or audio of a story
pub fn can_edit_story(role: StaffRole, is_author: bool, status: StoryStatus) -> bool {
    match role {
        StaffRole::Intern | StaffRole::Journalist => is_author && is_author_editable(status),
        StaffRole::SubEditor => !is_released(status),
        StaffRole::Editor | StaffRole::Admin | StaffRole::SuperAdmin => true,
    }
}

/// Whether `role` may soft-delete a story
pub fn can_delete_story(role: StaffRole, is_author: bool, status: StoryStatus) -> bool {
    if !has_story_permission(role, StoryAction::Delete) {
        return false;
    }
    match role {
        StaffRole::Intern => false,
        StaffRole::Journalist => is_author && status == StoryStatus::Draft,
        StaffRole::SubEditor => !is_released(status),
        StaffRole::Editor | StaffRole::Admin | StaffRole::SuperAdmin => true,
    }
}

/// Validate a bulletin status change
pub fn check_bulletin_transition(
    role: StaffRole,
    is_author: bool,
    from: BulletinStatus,
    to: BulletinStatus,
) -> Result<(), NewsroomError> {
    use BulletinStatus::*;

    let required = match (from, to) {
        (Draft, InReview) if is_author => StaffRole::Intern,
        (Draft, InReview) => StaffRole::SubEditor,
        (InReview, Draft) | (InReview, Approved) | (Approved, Published) => StaffRole::SubEditor,
        (Published, Archived) => StaffRole::Editor,
        _ => {
            return Err(NewsroomError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    };

    if role >= required {
        Ok(())
    } else {
        Err(NewsroomError::forbidden(format!(
            "{} may not move a bulletin from {} to {}",
            role, from, to
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_move_maps_to_one_action() {
        let cases = [
            (StoryStatus::Draft, StoryStatus::InReview, StoryAction::SubmitForReview),
            (StoryStatus::Draft, StoryStatus::PendingApproval, StoryAction::Review),
            (StoryStatus::InReview, StoryStatus::NeedsRevision, StoryAction::Review),
            (StoryStatus::PendingApproval, StoryStatus::Approved, StoryAction::Approve),
            (StoryStatus::Approved, StoryStatus::Published, StoryAction::Publish),
            (StoryStatus::Archived, StoryStatus::Published, StoryAction::Archive),
        ];
        for (from, to, action) in cases {
            assert_eq!(transition_action(from, to), Some(action), "{from} -> {to}");
        }
    }

    #[test]
    fn unknown_moves_are_invalid_transitions() {
        let err = check_transition(
            StaffRole::SuperAdmin,
            false,
            StoryStatus::Draft,
            StoryStatus::Published,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, NewsroomError::InvalidTransition { .. }));
        assert!(transition_action(StoryStatus::Published, StoryStatus::Draft).is_none());
    }

    #[test]
    fn intern_submits_own_story_only() {
        assert_eq!(
            check_transition(
                StaffRole::Intern,
                true,
                StoryStatus::Draft,
                StoryStatus::InReview,
                None
            )
            .unwrap(),
            StoryAction::SubmitForReview
        );
        let err = check_transition(
            StaffRole::Journalist,
            false,
            StoryStatus::Draft,
            StoryStatus::InReview,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, NewsroomError::Forbidden { .. }));
        assert!(check_transition(
            StaffRole::SubEditor,
            false,
            StoryStatus::Draft,
            StoryStatus::InReview,
            None
        )
        .is_ok());
    }

    #[test]
    fn intern_cannot_review() {
        let err = check_transition(
            StaffRole::Intern,
            false,
            StoryStatus::InReview,
            StoryStatus::PendingApproval,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, NewsroomError::Forbidden { .. }));
    }

    #[test]
    fn self_review_needs_editor() {
        assert!(check_transition(
            StaffRole::SubEditor,
            true,
            StoryStatus::PendingApproval,
            StoryStatus::Approved,
            None
        )
        .is_err());
        assert!(check_transition(
            StaffRole::Editor,
            true,
            StoryStatus::PendingApproval,
            StoryStatus::Approved,
            None
        )
        .is_ok());
    }

    #[test]
    fn revision_requires_reason() {
        let err = check_transition(
            StaffRole::Journalist,
            false,
            StoryStatus::InReview,
            StoryStatus::NeedsRevision,
            Some("   "),
        )
        .unwrap_err();
        assert!(matches!(err, NewsroomError::Validation { .. }));
        assert!(check_transition(
            StaffRole::Journalist,
            false,
            StoryStatus::InReview,
            StoryStatus::NeedsRevision,
            Some("needs a second source"),
        )
        .is_ok());
    }

    #[test]
    fn archive_needs_editor() {
        assert!(check_transition(
            StaffRole::SubEditor,
            false,
            StoryStatus::Published,
            StoryStatus::Archived,
            None
        )
        .is_err());
        assert!(check_transition(
            StaffRole::Editor,
            false,
            StoryStatus::Published,
            StoryStatus::Archived,
            None
        )
        .is_ok());
    }

    #[test]
    fn next_statuses_from_draft() {
        assert_eq!(
            next_statuses(StoryStatus::Draft),
            vec![StoryStatus::InReview, StoryStatus::PendingApproval]
        );
    }

    #[test]
    fn edit_rules_depend_on_role_and_ownership() {
        use StoryStatus::*;
        assert!(can_edit_story(StaffRole::Intern, true, Draft));
        assert!(can_edit_story(StaffRole::Journalist, true, NeedsRevision));
        assert!(!can_edit_story(StaffRole::Journalist, true, InReview));
        assert!(!can_edit_story(StaffRole::Journalist, false, Draft));
        assert!(can_edit_story(StaffRole::SubEditor, false, Approved));
        assert!(!can_edit_story(StaffRole::SubEditor, false, Published));
        assert!(can_edit_story(StaffRole::Editor, false, Published));
    }

    #[test]
    fn delete_rules() {
        use StoryStatus::*;
        assert!(!can_delete_story(StaffRole::Intern, true, Draft));
        assert!(can_delete_story(StaffRole::Journalist, true, Draft));
        assert!(!can_delete_story(StaffRole::Journalist, true, NeedsRevision));
        assert!(can_delete_story(StaffRole::SubEditor, false, PendingApproval));
        assert!(!can_delete_story(StaffRole::SubEditor, false, Published));
        assert!(can_delete_story(StaffRole::Editor, false, Archived));
    }

    #[test]
    fn bulletin_moves() {
        use BulletinStatus::*;
        assert!(check_bulletin_transition(StaffRole::Journalist, true, Draft, InReview).is_ok());
        assert!(check_bulletin_transition(StaffRole::Journalist, false, Draft, InReview).is_err());
        assert!(check_bulletin_transition(StaffRole::SubEditor, false, InReview, Approved).is_ok());
        assert!(check_bulletin_transition(StaffRole::SubEditor, false, Published, Archived).is_err());
        assert!(matches!(
            check_bulletin_transition(StaffRole::SuperAdmin, true, Draft, Published),
            Err(NewsroomError::InvalidTransition { .. })
        ));
    }
}

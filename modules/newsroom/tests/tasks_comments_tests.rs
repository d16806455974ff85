//! Integration tests for newsroom collaboration: tasks, comments, diary,
//! announcements and the audit trail

mod common;

use chrono::{Duration, Utc};
use common::{print_test_header, TestEnv, PASSWORD};
use newsroom::contract::*;
use newsroom::domain::{Channel, EventKind};

fn task_for(assignee: uuid::Uuid, title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        task_type: TaskType::General,
        priority: TaskPriority::Medium,
        assigned_to_id: assignee,
        story_id: None,
        due_date: None,
    }
}

fn comment(content: &str, comment_type: CommentType) -> NewComment {
    NewComment {
        content: content.to_string(),
        comment_type,
        parent_id: None,
    }
}

#[tokio::test]
async fn interns_may_only_assign_tasks_to_themselves() {
    print_test_header(
        "interns_may_only_assign_tasks_to_themselves",
        "Task creation below journalist is limited to self-assignment",
    );
    let env = TestEnv::new().await;

    let err = env
        .service
        .create_task(&env.as_intern(), task_for(env.staff.editor.id, "Call the mayor"))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let own = env
        .service
        .create_task(&env.as_intern(), task_for(env.staff.intern.id, "Read style guide"))
        .await
        .unwrap();
    assert_eq!(own.status, TaskStatus::Pending);
    assert_eq!(own.created_by_id, env.staff.intern.id);

    let err = env
        .service
        .create_task(&env.as_journalist(), task_for(env.radio_user.id, "Radio chores"))
        .await
        .unwrap_err();
    match err {
        NewsroomError::Validation { details, .. } => {
            assert_eq!(details[0].field, "assigned_to_id");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn completing_a_task_stamps_and_reopening_clears() {
    let env = TestEnv::new().await;
    let task = env
        .service
        .create_task(&env.as_journalist(), task_for(env.staff.intern.id, "Transcribe interview"))
        .await
        .unwrap();
    assert_eq!(
        env.events.kinds_on(Channel::User(env.staff.intern.id)),
        vec![EventKind::TaskAssigned]
    );

    let done = env
        .service
        .update_task(
            &env.as_intern(),
            task.id,
            TaskPatch {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(done.completed_at.is_some());

    let reopened = env
        .service
        .update_task(
            &env.as_intern(),
            task.id,
            TaskPatch {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(reopened.completed_at.is_none());

    // An uninvolved intern cannot touch it
    let bystander = common::seed_user(
        &env.repos,
        "bystander@newskoop.test",
        UserType::Staff,
        Some(StaffRole::Intern),
        None,
    )
    .await;
    let err = env
        .service
        .update_task(
            &common::principal_of(&bystander),
            task.id,
            TaskPatch {
                title: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
}

#[tokio::test]
async fn reassignment_notifies_the_new_assignee() {
    let env = TestEnv::new().await;
    let task = env
        .service
        .create_task(&env.as_editor(), task_for(env.staff.intern.id, "Vox pops"))
        .await
        .unwrap();
    env.events.clear();

    env.service
        .update_task(
            &env.as_editor(),
            task.id,
            TaskPatch {
                assigned_to_id: Some(env.staff.journalist.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        env.events.kinds_on(Channel::User(env.staff.journalist.id)),
        vec![EventKind::TaskAssigned]
    );
    assert!(env
        .events
        .kinds_on(Channel::Newsroom)
        .contains(&EventKind::TaskUpdated));
}

#[tokio::test]
async fn tasks_list_dated_first_by_due_date() {
    let env = TestEnv::new().await;
    let now = Utc::now();
    let mut later = task_for(env.staff.journalist.id, "Later");
    later.due_date = Some(now + Duration::days(3));
    let mut sooner = task_for(env.staff.journalist.id, "Sooner");
    sooner.due_date = Some(now + Duration::days(1));
    let undated = task_for(env.staff.journalist.id, "Whenever");

    for new in [undated, later, sooner] {
        env.service.create_task(&env.as_editor(), new).await.unwrap();
    }

    let page = env
        .service
        .list_tasks(
            &env.as_journalist(),
            &TaskFilter {
                assigned_to_id: Some(env.staff.journalist.id),
                ..Default::default()
            },
            env.service.page_request(None, None),
        )
        .await
        .unwrap();
    let titles: Vec<_> = page.items.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Sooner", "Later", "Whenever"]);
}

#[tokio::test]
async fn only_creator_or_sub_editor_deletes_tasks() {
    let env = TestEnv::new().await;
    let task = env
        .service
        .create_task(&env.as_journalist(), task_for(env.staff.intern.id, "Fact check"))
        .await
        .unwrap();

    let err = env
        .service
        .delete_task(&env.as_intern(), task.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    env.service.delete_task(&env.as_sub_editor(), task.id).await.unwrap();
    let err = env.service.get_task(&env.as_journalist(), task.id).await.unwrap_err();
    assert!(matches!(err, NewsroomError::NotFound { .. }));
}

#[tokio::test]
async fn comments_notify_the_story_author() {
    let env = TestEnv::new().await;
    let story = env.draft("Budget speech", vec![env.taxonomy.english.id]).await;

    let note = env
        .service
        .add_comment(&env.as_intern(), story.id, comment("Check the figures", CommentType::General))
        .await
        .unwrap();
    assert_eq!(note.author_id, env.staff.intern.id);
    assert_eq!(
        env.events.kinds_on(Channel::User(env.staff.journalist.id)),
        vec![EventKind::CommentCreated]
    );

    // Reviews are for reviewers
    let err = env
        .service
        .add_comment(
            &env.as_intern(),
            story.id,
            comment("Rewrite this", CommentType::RevisionRequest),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let err = env
        .service
        .add_comment(&env.as_editor(), story.id, comment("   ", CommentType::General))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));
}

#[tokio::test]
async fn replies_must_stay_on_the_same_story() {
    let env = TestEnv::new().await;
    let first = env.draft("Story one", vec![env.taxonomy.english.id]).await;
    let second = env.draft("Story two", vec![env.taxonomy.english.id]).await;
    let parent = env
        .service
        .add_comment(&env.as_editor(), first.id, comment("Source?", CommentType::General))
        .await
        .unwrap();

    let reply = env
        .service
        .add_comment(
            &env.as_journalist(),
            first.id,
            NewComment {
                parent_id: Some(parent.id),
                ..comment("Minister's office", CommentType::General)
            },
        )
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(parent.id));

    let err = env
        .service
        .add_comment(
            &env.as_journalist(),
            second.id,
            NewComment {
                parent_id: Some(parent.id),
                ..comment("Wrong thread", CommentType::General)
            },
        )
        .await
        .unwrap_err();
    match err {
        NewsroomError::Validation { details, .. } => assert_eq!(details[0].field, "parent_id"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn comment_edits_belong_to_the_author_and_deletes_to_editors() {
    let env = TestEnv::new().await;
    let story = env.draft("Harbour strike", vec![env.taxonomy.english.id]).await;
    let note = env
        .service
        .add_comment(&env.as_journalist(), story.id, comment("Draft quote", CommentType::General))
        .await
        .unwrap();

    let err = env
        .service
        .update_comment(&env.as_editor(), note.id, "Edited by someone else")
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let edited = env
        .service
        .update_comment(&env.as_journalist(), note.id, "Final quote")
        .await
        .unwrap();
    assert_eq!(edited.content, "Final quote");

    let err = env
        .service
        .delete_comment(&env.as_sub_editor(), note.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
    env.service.delete_comment(&env.as_editor(), note.id).await.unwrap();
    assert!(env
        .service
        .list_comments(&env.as_editor(), story.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn revision_requests_are_resolved_by_the_author() {
    let env = TestEnv::new().await;
    let story = env.draft("Load shedding", vec![env.taxonomy.english.id]).await;
    let general = env
        .service
        .add_comment(&env.as_editor(), story.id, comment("Nice lede", CommentType::General))
        .await
        .unwrap();
    let request = env
        .service
        .add_comment(
            &env.as_editor(),
            story.id,
            comment("Add Eskom response", CommentType::RevisionRequest),
        )
        .await
        .unwrap();

    let err = env
        .service
        .resolve_comment(&env.as_journalist(), general.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let err = env
        .service
        .resolve_comment(&env.as_intern(), request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let resolved = env
        .service
        .resolve_comment(&env.as_journalist(), request.id)
        .await
        .unwrap();
    assert!(resolved.is_resolved);
    assert_eq!(resolved.resolved_by, Some(env.staff.journalist.id));

    // Resolving twice keeps the first resolution
    let again = env
        .service
        .resolve_comment(&env.as_sub_editor(), request.id)
        .await
        .unwrap();
    assert_eq!(again.resolved_by, Some(env.staff.journalist.id));
}

#[tokio::test]
async fn diary_entries_filter_by_window_and_assignee() {
    print_test_header(
        "diary_entries_filter_by_window_and_assignee",
        "Diary lists are ordered by time and narrowed by date range and assignee",
    );
    let env = TestEnv::new().await;
    let now = Utc::now();
    let entry = |title: &str, hours: i64, assignees: Vec<uuid::Uuid>| NewDiaryEntry {
        title: title.to_string(),
        notes: None,
        date_time: now + Duration::hours(hours),
        story_id: None,
        assignee_ids: assignees,
    };

    let court = env
        .service
        .create_diary_entry(
            &env.as_intern(),
            entry(
                "Court appearance",
                48,
                vec![env.staff.journalist.id, env.staff.journalist.id],
            ),
        )
        .await
        .unwrap();
    assert_eq!(court.assignee_ids, vec![env.staff.journalist.id]);
    env.service
        .create_diary_entry(&env.as_intern(), entry("Press briefing", 2, vec![env.staff.editor.id]))
        .await
        .unwrap();
    env.service
        .create_diary_entry(&env.as_intern(), entry("Council sitting", 24 * 10, Vec::new()))
        .await
        .unwrap();

    let week = env
        .service
        .list_diary_entries(
            &env.as_editor(),
            &DiaryQuery {
                from: Some(now),
                to: Some(now + Duration::days(7)),
                assigned_to: None,
            },
        )
        .await
        .unwrap();
    let titles: Vec<_> = week.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Press briefing", "Court appearance"]);

    let mine = env
        .service
        .list_diary_entries(
            &env.as_journalist(),
            &DiaryQuery {
                assigned_to: Some(env.staff.journalist.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, court.id);

    let err = env
        .service
        .list_diary_entries(
            &env.as_editor(),
            &DiaryQuery {
                from: Some(now + Duration::days(1)),
                to: Some(now),
                assigned_to: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));
}

#[tokio::test]
async fn diary_assignees_must_be_active_staff() {
    let env = TestEnv::new().await;
    let err = env
        .service
        .create_diary_entry(
            &env.as_journalist(),
            NewDiaryEntry {
                title: "Station visit".to_string(),
                notes: None,
                date_time: Utc::now(),
                story_id: None,
                assignee_ids: vec![env.radio_user.id],
            },
        )
        .await
        .unwrap_err();
    match err {
        NewsroomError::Validation { details, .. } => assert_eq!(details[0].field, "assignee_ids"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn diary_updates_replace_assignees_and_deletes_need_rights() {
    let env = TestEnv::new().await;
    let entry = env
        .service
        .create_diary_entry(
            &env.as_journalist(),
            NewDiaryEntry {
                title: "Budget lock-up".to_string(),
                notes: Some("Bring ID".to_string()),
                date_time: Utc::now() + Duration::days(2),
                story_id: None,
                assignee_ids: vec![env.staff.journalist.id],
            },
        )
        .await
        .unwrap();

    let updated = env
        .service
        .update_diary_entry(
            &env.as_intern(),
            entry.id,
            DiaryPatch {
                assignee_ids: Some(vec![env.staff.intern.id, env.staff.editor.id]),
                is_completed: Some(true),
                notes: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let mut assignees = updated.assignee_ids.clone();
    assignees.sort();
    let mut expected = vec![env.staff.intern.id, env.staff.editor.id];
    expected.sort();
    assert_eq!(assignees, expected);
    assert!(updated.is_completed);
    assert_eq!(updated.notes, None);

    let err = env
        .service
        .delete_diary_entry(&env.as_intern(), entry.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
    env.service
        .delete_diary_entry(&env.as_journalist(), entry.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn announcements_reach_their_audience_until_dismissed() {
    let env = TestEnv::new().await;
    let announce = |title: &str, priority, target| NewAnnouncement {
        title: title.to_string(),
        message: format!("{title} details"),
        priority,
        target,
        expires_at: None,
    };

    let err = env
        .service
        .create_announcement(
            &env.as_journalist(),
            announce("Nope", AnnouncementPriority::Low, AnnouncementTarget::All),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let everyone = env
        .service
        .create_announcement(
            &env.as_editor(),
            announce("Maintenance", AnnouncementPriority::Low, AnnouncementTarget::All),
        )
        .await
        .unwrap();
    let staff_only = env
        .service
        .create_announcement(
            &env.as_editor(),
            announce("Staff braai", AnnouncementPriority::High, AnnouncementTarget::Staff),
        )
        .await
        .unwrap();
    assert!(env
        .events
        .kinds_on(Channel::Radio)
        .contains(&EventKind::AnnouncementCreated));

    let staff_view = env.service.list_announcements_for(&env.as_intern()).await.unwrap();
    let ids: Vec<_> = staff_view.iter().map(|v| v.announcement.id).collect();
    assert_eq!(ids, vec![staff_only.id, everyone.id]);

    let radio_view = env.service.list_announcements_for(&env.as_radio()).await.unwrap();
    let ids: Vec<_> = radio_view.iter().map(|v| v.announcement.id).collect();
    assert_eq!(ids, vec![everyone.id]);

    // Not addressed to radio, so it reads as missing
    let err = env
        .service
        .dismiss_announcement(&env.as_radio(), staff_only.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::NotFound { .. }));

    env.service
        .dismiss_announcement(&env.as_radio(), everyone.id)
        .await
        .unwrap();
    env.service
        .dismiss_announcement(&env.as_radio(), everyone.id)
        .await
        .unwrap();
    let radio_view = env.service.list_announcements_for(&env.as_radio()).await.unwrap();
    assert!(radio_view[0].dismissed);
    let staff_view = env.service.list_announcements_for(&env.as_intern()).await.unwrap();
    assert!(staff_view.iter().all(|v| !v.dismissed));
}

#[tokio::test]
async fn expired_and_inactive_announcements_are_hidden() {
    let env = TestEnv::new().await;
    let err = env
        .service
        .create_announcement(
            &env.as_editor(),
            NewAnnouncement {
                title: "Old news".to_string(),
                message: "Already over".to_string(),
                priority: AnnouncementPriority::Medium,
                target: AnnouncementTarget::All,
                expires_at: Some(Utc::now() - Duration::minutes(5)),
            },
        )
        .await
        .unwrap_err();
    match err {
        NewsroomError::Validation { details, .. } => assert_eq!(details[0].field, "expires_at"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let notice = env
        .service
        .create_announcement(
            &env.as_editor(),
            NewAnnouncement {
                title: "Fire drill".to_string(),
                message: "Friday 10:00".to_string(),
                priority: AnnouncementPriority::Medium,
                target: AnnouncementTarget::Staff,
                expires_at: Some(Utc::now() + Duration::days(1)),
            },
        )
        .await
        .unwrap();
    env.service
        .update_announcement(
            &env.as_editor(),
            notice.id,
            AnnouncementPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(env
        .service
        .list_announcements_for(&env.as_journalist())
        .await
        .unwrap()
        .is_empty());

    // Inactive announcements can no longer be dismissed
    let err = env
        .service
        .dismiss_announcement(&env.as_journalist(), notice.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::NotFound { .. }));
}

#[tokio::test]
async fn audit_trail_records_logins_and_workflow_moves() {
    let env = TestEnv::new().await;
    env.service
        .login("journalist@newskoop.test", PASSWORD, None)
        .await
        .unwrap();
    let story = env.published("Audit me", vec![env.taxonomy.english.id]).await;

    let err = env
        .service
        .list_audit_logs(
            &env.as_editor(),
            &AuditFilter::default(),
            env.service.page_request(None, None),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let logins = env
        .service
        .list_audit_logs(
            &env.as_admin(),
            &AuditFilter {
                action: Some("auth.login".to_string()),
                ..Default::default()
            },
            env.service.page_request(None, None),
        )
        .await
        .unwrap();
    assert_eq!(logins.total, 1);
    assert_eq!(logins.items[0].user_id, Some(env.staff.journalist.id));

    let moves = env
        .service
        .list_audit_logs(
            &env.as_admin(),
            &AuditFilter {
                entity_id: Some(story.id.to_string()),
                action: Some("story.status_changed".to_string()),
                ..Default::default()
            },
            env.service.page_request(None, None),
        )
        .await
        .unwrap();
    assert_eq!(moves.total, 4);
}

//! Integration tests for the editorial story workflow

mod common;

use common::{audio_upload, change, print_test_header, TestEnv};
use newsroom::contract::*;
use newsroom::domain::{Channel, EventKind};

#[tokio::test]
async fn story_walks_from_draft_to_published() {
    print_test_header(
        "story_walks_from_draft_to_published",
        "Each workflow step records who acted and publication reaches radio",
    );
    let env = TestEnv::new().await;
    let lang = env.taxonomy.english.id;
    let story = env.draft("Mayor opens new clinic", vec![lang]).await;
    assert_eq!(story.status, StoryStatus::Draft);
    assert_eq!(story.slug, "mayor-opens-new-clinic");

    let published = env.publish(&story).await;
    assert_eq!(published.status, StoryStatus::Published);
    assert_eq!(published.reviewer_id, Some(env.staff.sub_editor.id));
    assert_eq!(published.approver_id, Some(env.staff.editor.id));
    assert_eq!(published.publisher_id, Some(env.staff.editor.id));
    assert!(published.published_at.is_some());

    let newsroom = env.events.kinds_on(Channel::Newsroom);
    assert_eq!(newsroom[0], EventKind::StoryCreated);
    assert_eq!(
        newsroom
            .iter()
            .filter(|k| **k == EventKind::StoryStatusChanged)
            .count(),
        4
    );
    assert_eq!(env.events.kinds_on(Channel::Radio), vec![EventKind::StoryPublished]);
}

#[tokio::test]
async fn moves_outside_the_table_are_invalid_transitions() {
    let env = TestEnv::new().await;
    let story = env.draft("Skipping ahead", vec![env.taxonomy.english.id]).await;

    let err = env
        .service
        .change_status(&env.as_superadmin(), story.id, change(StoryStatus::Published))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::InvalidTransition { .. }));
}

#[tokio::test]
async fn journalists_cannot_review_their_own_story() {
    let env = TestEnv::new().await;
    let story = env.draft("Own review", vec![env.taxonomy.english.id]).await;

    let err = env
        .service
        .change_status(&env.as_journalist(), story.id, change(StoryStatus::PendingApproval))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    // Nor may someone else submit it on the author's behalf
    let err = env
        .service
        .change_status(&env.as_intern(), story.id, change(StoryStatus::InReview))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
}

#[tokio::test]
async fn revision_request_needs_a_reason_and_leaves_a_comment() {
    let env = TestEnv::new().await;
    let story = env.draft("Budget vote", vec![env.taxonomy.english.id]).await;
    env.service
        .change_status(&env.as_journalist(), story.id, change(StoryStatus::InReview))
        .await
        .unwrap();

    let err = env
        .service
        .change_status(
            &env.as_sub_editor(),
            story.id,
            StatusChange {
                to: StoryStatus::NeedsRevision,
                reason: Some("   ".to_string()),
                assignee_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    env.events.clear();
    let sent_back = env
        .service
        .change_status(
            &env.as_sub_editor(),
            story.id,
            StatusChange {
                to: StoryStatus::NeedsRevision,
                reason: Some("Add the council's response".to_string()),
                assignee_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(sent_back.status, StoryStatus::NeedsRevision);

    let comments = env
        .service
        .list_comments(&env.as_journalist(), story.id)
        .await
        .unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment_type, CommentType::RevisionRequest);
    assert_eq!(comments[0].content, "Add the council's response");
    assert_eq!(
        env.events.kinds_on(Channel::User(env.staff.journalist.id)),
        vec![EventKind::CommentCreated]
    );

    // Author edits and resubmits
    env.service
        .update_story(
            &env.as_journalist(),
            story.id,
            StoryPatch {
                content: Some("<p>Council responded.</p>".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let resubmitted = env
        .service
        .change_status(&env.as_journalist(), story.id, change(StoryStatus::InReview))
        .await
        .unwrap();
    assert_eq!(resubmitted.status, StoryStatus::InReview);
}

#[tokio::test]
async fn publishing_requires_category_and_language() {
    let env = TestEnv::new().await;
    let story = env.draft("No language yet", vec![env.taxonomy.christian.id]).await;
    for (by, to) in [
        (env.as_journalist(), StoryStatus::InReview),
        (env.as_sub_editor(), StoryStatus::PendingApproval),
        (env.as_editor(), StoryStatus::Approved),
    ] {
        env.service.change_status(&by, story.id, change(to)).await.unwrap();
    }

    let err = env
        .service
        .change_status(&env.as_editor(), story.id, change(StoryStatus::Published))
        .await
        .unwrap_err();
    match err {
        NewsroomError::Validation { details, .. } => {
            assert_eq!(details[0].field, "classification_ids")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn assignee_gets_a_workflow_task_that_closes_on_the_next_move() {
    let env = TestEnv::new().await;
    let story = env.draft("Taxi strike", vec![env.taxonomy.english.id]).await;

    // Interns cannot review, so they cannot be handed the review
    let err = env
        .service
        .change_status(
            &env.as_journalist(),
            story.id,
            StatusChange {
                to: StoryStatus::InReview,
                reason: None,
                assignee_id: Some(env.staff.intern.id),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    env.service
        .change_status(
            &env.as_journalist(),
            story.id,
            StatusChange {
                to: StoryStatus::InReview,
                reason: None,
                assignee_id: Some(env.staff.sub_editor.id),
            },
        )
        .await
        .unwrap();

    let filter = TaskFilter {
        story_id: Some(story.id),
        ..Default::default()
    };
    let tasks = env
        .service
        .list_tasks(&env.as_sub_editor(), &filter, env.service.page_request(None, None))
        .await
        .unwrap();
    assert_eq!(tasks.total, 1);
    let task = &tasks.items[0];
    assert_eq!(task.task_type, TaskType::StoryReview);
    assert_eq!(task.assigned_to_id, env.staff.sub_editor.id);
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(env
        .events
        .kinds_on(Channel::User(env.staff.sub_editor.id))
        .contains(&EventKind::TaskAssigned));

    env.service
        .change_status(&env.as_sub_editor(), story.id, change(StoryStatus::PendingApproval))
        .await
        .unwrap();
    let closed = env.service.get_task(&env.as_sub_editor(), task.id).await.unwrap();
    assert_eq!(closed.status, TaskStatus::Completed);
    assert!(closed.completed_at.is_some());
}

#[tokio::test]
async fn authors_lose_edit_rights_once_submitted() {
    let env = TestEnv::new().await;
    let story = env.draft("Locked text", vec![env.taxonomy.english.id]).await;
    env.service
        .change_status(&env.as_journalist(), story.id, change(StoryStatus::InReview))
        .await
        .unwrap();

    let patch = StoryPatch {
        title: Some("Unlocked text".to_string()),
        ..Default::default()
    };
    let err = env
        .service
        .update_story(&env.as_journalist(), story.id, patch.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let updated = env
        .service
        .update_story(&env.as_sub_editor(), story.id, patch)
        .await
        .unwrap();
    assert_eq!(updated.slug, "unlocked-text");
}

#[tokio::test]
async fn unknown_taxonomy_references_are_rejected() {
    let env = TestEnv::new().await;
    let err = env
        .service
        .create_story(
            &env.as_journalist(),
            NewStory {
                title: "Ghost tag".to_string(),
                content: String::new(),
                tag_ids: vec![uuid::Uuid::new_v4()],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    match err {
        NewsroomError::Validation { details, .. } => assert_eq!(details[0].field, "tag_ids"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_titles_get_numbered_slugs() {
    let env = TestEnv::new().await;
    let first = env.draft("Load shedding returns", vec![]).await;
    let second = env.draft("Load shedding returns", vec![]).await;
    assert_eq!(first.slug, "load-shedding-returns");
    assert_eq!(second.slug, "load-shedding-returns-1");

    let found = env
        .service
        .get_story_by_slug(&env.as_intern(), &second.slug)
        .await
        .unwrap();
    assert_eq!(found.story.id, second.id);
}

#[tokio::test]
async fn deleted_stories_disappear() {
    let env = TestEnv::new().await;
    let story = env.draft("Short lived", vec![]).await;

    let err = env
        .service
        .delete_story(&env.as_intern(), story.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    env.service
        .delete_story(&env.as_journalist(), story.id)
        .await
        .unwrap();
    let err = env
        .service
        .get_story(&env.as_editor(), story.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::NotFound { .. }));

    let listed = env
        .service
        .list_stories(&env.as_editor(), &StoryFilter::default(), env.service.page_request(None, None))
        .await
        .unwrap();
    assert!(listed.items.iter().all(|s| s.id != story.id));
}

#[tokio::test]
async fn translation_inherits_everything_but_the_language() {
    let env = TestEnv::new().await;
    let original = env
        .draft(
            "Harbour reopens",
            vec![env.taxonomy.english.id, env.taxonomy.western_cape.id],
        )
        .await;

    let translation = env
        .service
        .create_translation(&env.as_journalist(), original.id, env.taxonomy.afrikaans.id)
        .await
        .unwrap();
    assert_eq!(translation.status, StoryStatus::Draft);
    assert_eq!(translation.original_story_id, Some(original.id));
    assert_eq!(translation.category_id, original.category_id);
    assert!(translation.classification_ids.contains(&env.taxonomy.afrikaans.id));
    assert!(translation.classification_ids.contains(&env.taxonomy.western_cape.id));
    assert!(!translation.classification_ids.contains(&env.taxonomy.english.id));
    assert_ne!(translation.slug, original.slug);

    let again = env
        .service
        .create_translation(&env.as_journalist(), original.id, env.taxonomy.afrikaans.id)
        .await
        .unwrap_err();
    assert!(matches!(again, NewsroomError::Conflict { .. }));

    let same_language = env
        .service
        .create_translation(&env.as_journalist(), original.id, env.taxonomy.english.id)
        .await
        .unwrap_err();
    assert!(matches!(same_language, NewsroomError::Validation { .. }));

    let nested = env
        .service
        .create_translation(&env.as_journalist(), translation.id, env.taxonomy.isizulu.id)
        .await
        .unwrap_err();
    assert!(matches!(nested, NewsroomError::Validation { .. }));

    let not_a_language = env
        .service
        .create_translation(&env.as_journalist(), original.id, env.taxonomy.muslim.id)
        .await
        .unwrap_err();
    assert!(matches!(not_a_language, NewsroomError::Validation { .. }));

    let details = env.service.get_story(&env.as_editor(), original.id).await.unwrap();
    assert_eq!(details.translations.len(), 1);
    assert_eq!(details.translations[0].id, translation.id);

    // Interns cannot translate
    let err = env
        .service
        .create_translation(&env.as_intern(), original.id, env.taxonomy.isizulu.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
}

#[tokio::test]
async fn audio_clips_are_stored_and_removed_with_the_blob() {
    let env = TestEnv::new().await;
    let story = env.draft("Radio interview", vec![]).await;

    let clip = env
        .service
        .attach_audio(&env.as_journalist(), story.id, audio_upload("Interview 01.mp3"))
        .await
        .unwrap();
    assert_eq!(clip.story_id, story.id);
    assert_eq!(clip.mime_type, "audio/mpeg");
    assert!(env.blobs.contains(&clip.url));

    let details = env.service.get_story(&env.as_journalist(), story.id).await.unwrap();
    assert_eq!(details.audio.len(), 1);

    env.service
        .remove_audio(&env.as_journalist(), story.id, clip.id)
        .await
        .unwrap();
    assert!(!env.blobs.contains(&clip.url));
    assert!(env.blobs.is_empty());
}

#[tokio::test]
async fn audio_must_be_an_allowed_type() {
    let env = TestEnv::new().await;
    let story = env.draft("Bad upload", vec![]).await;

    let mut upload = audio_upload("notes.pdf");
    upload.content_type = "application/pdf".to_string();
    let err = env
        .service
        .attach_audio(&env.as_journalist(), story.id, upload)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let mut empty = audio_upload("empty.mp3");
    empty.bytes = bytes::Bytes::new();
    let err = env
        .service
        .attach_audio(&env.as_journalist(), story.id, empty)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));
    assert!(env.blobs.is_empty());
}

#[tokio::test]
async fn archived_stories_can_be_republished_by_editors() {
    let env = TestEnv::new().await;
    let story = env.published("Old news", vec![env.taxonomy.english.id]).await;

    let err = env
        .service
        .change_status(&env.as_sub_editor(), story.id, change(StoryStatus::Archived))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let archived = env
        .service
        .change_status(&env.as_editor(), story.id, change(StoryStatus::Archived))
        .await
        .unwrap();
    assert_eq!(archived.status, StoryStatus::Archived);

    let back = env
        .service
        .change_status(&env.as_editor(), story.id, change(StoryStatus::Published))
        .await
        .unwrap();
    assert_eq!(back.status, StoryStatus::Published);
    assert_eq!(back.published_at, story.published_at);
}

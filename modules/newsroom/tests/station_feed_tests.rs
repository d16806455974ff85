//! Integration tests for what radio stations receive

mod common;

use common::{audio_upload, print_test_header, TestEnv, PASSWORD};
use newsroom::contract::*;
use newsroom::domain::{Channel, EventKind};

async fn feed_slugs(env: &TestEnv, query: FeedQuery) -> Vec<String> {
    env.service
        .radio_stories(&env.as_radio(), &query, env.service.page_request(None, None))
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|s| s.slug)
        .collect()
}

#[tokio::test]
async fn feed_applies_language_religion_locality_and_category_rules() {
    print_test_header(
        "feed_applies_language_religion_locality_and_category_rules",
        "Station sees only published stories matching its content rules",
    );
    let env = TestEnv::new().await;
    let t = &env.taxonomy;

    env.published("English story", vec![t.english.id]).await;
    env.published("Afrikaans local", vec![t.afrikaans.id, t.western_cape.id]).await;
    env.published("Christian service", vec![t.english.id, t.christian.id]).await;
    env.published("Zulu only", vec![t.isizulu.id]).await;
    env.published("Eid celebrations", vec![t.english.id, t.muslim.id]).await;
    env.published("Joburg traffic", vec![t.english.id, t.gauteng.id]).await;
    env.published(
        "Two provinces",
        vec![t.english.id, t.gauteng.id, t.western_cape.id],
    )
    .await;
    env.draft("Unpublished", vec![t.english.id]).await;

    let sport = env
        .service
        .create_story(
            &env.as_journalist(),
            NewStory {
                title: "Derby result".to_string(),
                content: "<p>2-1</p>".to_string(),
                category_id: Some(t.sport.id),
                classification_ids: vec![t.english.id],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    env.publish(&sport).await;

    let mut slugs = feed_slugs(&env, FeedQuery::default()).await;
    slugs.sort();
    assert_eq!(
        slugs,
        vec![
            "afrikaans-local",
            "christian-service",
            "english-story",
            "two-provinces",
        ]
    );
}

#[tokio::test]
async fn hidden_story_reads_as_missing() {
    let env = TestEnv::new().await;
    let hidden = env.published("Zulu bulletin", vec![env.taxonomy.isizulu.id]).await;
    let visible = env.published("Cape weather", vec![env.taxonomy.english.id]).await;

    let err = env
        .service
        .radio_story(&env.as_radio(), &hidden.slug)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::NotFound { .. }));

    let details = env
        .service
        .radio_story(&env.as_radio(), &visible.slug)
        .await
        .unwrap();
    assert_eq!(details.story.id, visible.id);
}

#[tokio::test]
async fn translations_in_other_languages_are_dropped_from_details() {
    let env = TestEnv::new().await;
    let original = env.published("Fire season", vec![env.taxonomy.english.id]).await;
    let afrikaans = env
        .service
        .create_translation(&env.as_journalist(), original.id, env.taxonomy.afrikaans.id)
        .await
        .unwrap();
    env.publish(&afrikaans).await;
    let zulu = env
        .service
        .create_translation(&env.as_journalist(), original.id, env.taxonomy.isizulu.id)
        .await
        .unwrap();
    env.publish(&zulu).await;

    let details = env
        .service
        .radio_story(&env.as_radio(), &original.slug)
        .await
        .unwrap();
    let ids: Vec<_> = details.translations.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![afrikaans.id]);
}

#[tokio::test]
async fn feed_filters_by_category_and_search() {
    let env = TestEnv::new().await;
    env.published("Water restrictions eased", vec![env.taxonomy.english.id]).await;
    env.published("Taxi fares rise", vec![env.taxonomy.english.id]).await;

    let found = feed_slugs(
        &env,
        FeedQuery {
            search: Some("WATER".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(found, vec!["water-restrictions-eased"]);

    // LIKE wildcards in the search text match literally
    env.published("Quota now 100% local", vec![env.taxonomy.english.id]).await;
    for needle in ["%", "0% l"] {
        let found = feed_slugs(
            &env,
            FeedQuery {
                search: Some(needle.to_string()),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(found, vec!["quota-now-100-local"]);
    }
    let found = feed_slugs(
        &env,
        FeedQuery {
            search: Some("_".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(found.is_empty());

    let blocked = feed_slugs(
        &env,
        FeedQuery {
            category_id: Some(env.taxonomy.sport.id),
            ..Default::default()
        },
    )
    .await;
    assert!(blocked.is_empty());
}

#[tokio::test]
async fn staff_and_cut_off_stations_have_no_feed() {
    let env = TestEnv::new().await;

    let err = env
        .service
        .radio_stories(&env.as_editor(), &FeedQuery::default(), env.service.page_request(None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    env.service
        .update_station(
            &env.as_admin(),
            env.station.id,
            StationPatch {
                has_content_access: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = env
        .service
        .radio_stories(&env.as_radio(), &FeedQuery::default(), env.service.page_request(None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
}

#[tokio::test]
async fn deactivating_a_station_deactivates_its_users() {
    let env = TestEnv::new().await;
    let session = env
        .service
        .login("dj@kaapstad.test", PASSWORD, None)
        .await
        .unwrap();
    assert_eq!(
        env.service.authenticate(&session.token).await.unwrap().station_id,
        Some(env.station.id)
    );

    env.service
        .deactivate_station(&env.as_admin(), env.station.id)
        .await
        .unwrap();

    assert!(env.service.authenticate(&session.token).await.is_err());
    let users = env
        .service
        .list_station_users(&env.as_admin(), env.station.id)
        .await
        .unwrap();
    assert!(users.iter().all(|u| !u.is_active));
}

#[tokio::test]
async fn station_names_are_unique_and_blocked_categories_must_exist() {
    let env = TestEnv::new().await;
    let new_station = |name: &str, blocked| NewStation {
        name: name.to_string(),
        description: None,
        province: Province::Gauteng,
        contact_email: None,
        contact_number: None,
        website: None,
        has_content_access: true,
        allowed_languages: vec!["English".to_string()],
        allowed_religions: Vec::new(),
        blocked_category_ids: blocked,
    };

    let err = env
        .service
        .create_station(&env.as_admin(), new_station("Radio Kaapstad", Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Conflict { .. }));

    let err = env
        .service
        .create_station(
            &env.as_admin(),
            new_station("Jozi FM", vec![uuid::Uuid::new_v4()]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let err = env
        .service
        .create_station(&env.as_editor(), new_station("Jozi FM", Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
}

#[tokio::test]
async fn radio_users_only_see_their_own_station() {
    let env = TestEnv::new().await;
    let own = env
        .service
        .get_station(&env.as_radio(), env.station.id)
        .await
        .unwrap();
    assert_eq!(own.name, "Radio Kaapstad");

    let other = env
        .service
        .create_station(
            &env.as_admin(),
            NewStation {
                name: "Jozi FM".to_string(),
                description: None,
                province: Province::Gauteng,
                contact_email: None,
                contact_number: None,
                website: None,
                has_content_access: true,
                allowed_languages: vec!["English".to_string()],
                allowed_religions: Vec::new(),
                blocked_category_ids: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert!(env.service.get_station(&env.as_radio(), other.id).await.is_err());
}

#[tokio::test]
async fn shows_reach_radio_once_an_episode_is_published() {
    let env = TestEnv::new().await;
    let show = env
        .service
        .create_show(
            &env.as_sub_editor(),
            NewShow {
                title: "Morning Brief".to_string(),
                description: Some("Daily news roundup".to_string()),
                category_id: Some(env.taxonomy.news.id),
                cover_image_url: None,
            },
        )
        .await
        .unwrap();
    let episode = env
        .service
        .create_episode(
            &env.as_sub_editor(),
            show.id,
            NewEpisode {
                title: "Monday".to_string(),
                description: None,
                duration_seconds: Some(600),
            },
        )
        .await
        .unwrap();
    assert_eq!(episode.episode_number, 1);
    assert_eq!(episode.status, EpisodeStatus::Draft);

    assert!(env.service.radio_shows(&env.as_radio()).await.unwrap().is_empty());

    let err = env
        .service
        .publish_episode(&env.as_sub_editor(), episode.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let err = env
        .service
        .update_episode(
            &env.as_sub_editor(),
            episode.id,
            EpisodePatch {
                status: Some(EpisodeStatus::Published),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let with_audio = env
        .service
        .upload_episode_audio(&env.as_sub_editor(), episode.id, audio_upload("monday.mp3"))
        .await
        .unwrap();
    let first_url = with_audio.audio_url.clone().unwrap();

    // Replacing the audio discards the previous file
    let replaced = env
        .service
        .upload_episode_audio(&env.as_sub_editor(), episode.id, audio_upload("monday-v2.mp3"))
        .await
        .unwrap();
    assert!(!env.blobs.contains(&first_url));
    assert!(env.blobs.contains(replaced.audio_url.as_deref().unwrap()));

    let published = env
        .service
        .publish_episode(&env.as_sub_editor(), episode.id)
        .await
        .unwrap();
    assert_eq!(published.status, EpisodeStatus::Published);
    assert!(published.published_at.is_some());
    assert!(env
        .events
        .kinds_on(Channel::Radio)
        .contains(&EventKind::EpisodePublished));

    let shows = env.service.radio_shows(&env.as_radio()).await.unwrap();
    assert_eq!(shows.len(), 1);
    let episodes = env
        .service
        .radio_episodes(&env.as_radio(), &show.slug)
        .await
        .unwrap();
    assert_eq!(episodes.len(), 1);

    let second = env
        .service
        .create_episode(
            &env.as_sub_editor(),
            show.id,
            NewEpisode {
                title: "Monday".to_string(),
                description: None,
                duration_seconds: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(second.episode_number, 2);
    assert_eq!(second.slug, "monday-1");

    // A show with episodes cannot be deleted
    let err = env
        .service
        .delete_show(&env.as_editor(), show.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Conflict { .. }));
}

#[tokio::test]
async fn bulletins_publish_with_published_stories_in_station_languages() {
    let env = TestEnv::new().await;
    let story = env.published("Headline one", vec![env.taxonomy.english.id]).await;
    let draft = env.draft("Not yet", vec![env.taxonomy.english.id]).await;

    let bulletin = env
        .service
        .create_bulletin(
            &env.as_journalist(),
            NewBulletin {
                title: "Midday bulletin".to_string(),
                intro: Some("Good afternoon".to_string()),
                outro: None,
                language_id: env.taxonomy.english.id,
                scheduled_for: None,
            },
        )
        .await
        .unwrap();
    let zulu = env
        .service
        .create_bulletin(
            &env.as_journalist(),
            NewBulletin {
                title: "Zulu bulletin".to_string(),
                intro: None,
                outro: None,
                language_id: env.taxonomy.isizulu.id,
                scheduled_for: None,
            },
        )
        .await
        .unwrap();

    let err = env
        .service
        .create_bulletin(
            &env.as_journalist(),
            NewBulletin {
                title: "Wrong language".to_string(),
                intro: None,
                outro: None,
                language_id: env.taxonomy.muslim.id,
                scheduled_for: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let err = env
        .service
        .set_bulletin_stories(&env.as_journalist(), bulletin.id, &[story.id, draft.id])
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let err = env
        .service
        .set_bulletin_stories(&env.as_journalist(), bulletin.id, &[story.id, story.id])
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    // Publishing an empty bulletin is refused
    env.service
        .change_bulletin_status(&env.as_journalist(), zulu.id, BulletinStatus::InReview)
        .await
        .unwrap();
    env.service
        .change_bulletin_status(&env.as_sub_editor(), zulu.id, BulletinStatus::Approved)
        .await
        .unwrap();
    let err = env
        .service
        .change_bulletin_status(&env.as_sub_editor(), zulu.id, BulletinStatus::Published)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    let ordered = env
        .service
        .set_bulletin_stories(&env.as_journalist(), bulletin.id, &[story.id])
        .await
        .unwrap();
    assert_eq!(ordered.story_ids, vec![story.id]);

    let err = env
        .service
        .change_bulletin_status(&env.as_journalist(), bulletin.id, BulletinStatus::Published)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::InvalidTransition { .. }));

    for (by, to) in [
        (env.as_journalist(), BulletinStatus::InReview),
        (env.as_sub_editor(), BulletinStatus::Approved),
        (env.as_sub_editor(), BulletinStatus::Published),
    ] {
        env.service
            .change_bulletin_status(&by, bulletin.id, to)
            .await
            .unwrap();
    }
    assert!(env
        .events
        .kinds_on(Channel::Radio)
        .contains(&EventKind::BulletinPublished));

    let feed = env
        .service
        .radio_bulletins(&env.as_radio(), env.service.page_request(None, None))
        .await
        .unwrap();
    assert_eq!(feed.total, 1);
    assert_eq!(feed.items[0].id, bulletin.id);
    assert_eq!(feed.items[0].story_ids, vec![story.id]);
}

#[tokio::test]
async fn bulletin_languages_cannot_be_deleted() {
    let env = TestEnv::new().await;
    let sesotho = env
        .service
        .create_classification(
            &env.as_admin(),
            NewClassification {
                name: "Sesotho".to_string(),
                kind: ClassificationType::Language,
                description: None,
                sort_order: 5,
            },
        )
        .await
        .unwrap();
    let bulletin = env
        .service
        .create_bulletin(
            &env.as_journalist(),
            NewBulletin {
                title: "Sesotho bulletin".to_string(),
                intro: None,
                outro: None,
                language_id: sesotho.id,
                scheduled_for: None,
            },
        )
        .await
        .unwrap();

    let err = env
        .service
        .delete_classification(&env.as_admin(), sesotho.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Conflict { .. }));

    env.service
        .delete_bulletin(&env.as_editor(), bulletin.id)
        .await
        .unwrap();
    env.service
        .delete_classification(&env.as_admin(), sesotho.id)
        .await
        .unwrap();
}

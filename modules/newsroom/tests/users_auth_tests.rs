//! Integration tests for accounts, sessions and passwords

mod common;

use common::{print_test_header, TestEnv, PASSWORD};
use newsroom::config::Config;
use newsroom::contract::*;

fn token_in(text: &str) -> String {
    text.split("token=")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .expect("token link in email")
}

fn new_journalist(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Thandi".to_string(),
        last_name: "Mokoena".to_string(),
        user_type: UserType::Staff,
        staff_role: Some(StaffRole::Journalist),
        translation_language: None,
        radio_station_id: None,
    }
}

#[tokio::test]
async fn created_user_sets_password_from_welcome_email() {
    print_test_header(
        "created_user_sets_password_from_welcome_email",
        "Invite link in the welcome email lets the new user log in",
    );
    let env = TestEnv::new().await;

    let user = env
        .service
        .create_user(&env.as_admin(), new_journalist("  Thandi@Newskoop.TEST "))
        .await
        .unwrap();
    assert_eq!(user.email, "thandi@newskoop.test");
    assert!(user.must_change_password);

    let mail = env.mailer.last_to("thandi@newskoop.test").unwrap();
    assert_eq!(mail.subject, "Welcome to Newskoop");
    let token = token_in(&mail.text);

    // No usable password before the invite is redeemed
    let err = env
        .service
        .login("thandi@newskoop.test", PASSWORD, None)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Unauthorized { .. }));

    env.service.reset_password(&token, PASSWORD).await.unwrap();
    let outcome = env
        .service
        .login("thandi@newskoop.test", PASSWORD, Some("tests".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.user.id, user.id);
    assert!(!outcome.user.must_change_password);

    // Invite tokens are single use
    let err = env.service.reset_password(&token, PASSWORD).await.unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));
}

#[tokio::test]
async fn failed_welcome_email_rolls_the_user_back() {
    print_test_header(
        "failed_welcome_email_rolls_the_user_back",
        "A user whose welcome email cannot be delivered is not persisted",
    );
    let env = TestEnv::new().await;
    env.mailer.set_failing(true);

    let err = env
        .service
        .create_user(&env.as_admin(), new_journalist("lost@newskoop.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Delivery { .. }));

    let stored = env.repos.users.find_by_email("lost@newskoop.test").await.unwrap();
    assert!(stored.is_none());

    // Same address works once mail is back
    env.mailer.set_failing(false);
    env.service
        .create_user(&env.as_admin(), new_journalist("lost@newskoop.test"))
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let env = TestEnv::new().await;
    let err = env
        .service
        .create_user(&env.as_admin(), new_journalist("EDITOR@newskoop.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Conflict { .. }));
}

#[tokio::test]
async fn role_assignment_is_bounded_by_the_actor() {
    let env = TestEnv::new().await;

    let err = env
        .service
        .create_user(&env.as_journalist(), new_journalist("a@newskoop.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let mut peer = new_journalist("peer@newskoop.test");
    peer.staff_role = Some(StaffRole::Admin);
    let err = env.service.create_user(&env.as_admin(), peer.clone()).await.unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    let created = env.service.create_user(&env.as_superadmin(), peer).await.unwrap();
    assert_eq!(created.staff_role, Some(StaffRole::Admin));
}

#[tokio::test]
async fn radio_user_needs_an_active_station_and_first_is_primary_contact() {
    let env = TestEnv::new().await;
    let new_radio = |email: &str, station| NewUser {
        email: email.to_string(),
        first_name: "Pieter".to_string(),
        last_name: "Botha".to_string(),
        user_type: UserType::Radio,
        staff_role: None,
        translation_language: None,
        radio_station_id: station,
    };

    let err = env
        .service
        .create_user(&env.as_admin(), new_radio("x@radio.test", None))
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    // The fixture already seeded the station's primary contact
    let second = env
        .service
        .create_user(
            &env.as_admin(),
            new_radio("second@radio.test", Some(env.station.id)),
        )
        .await
        .unwrap();
    assert!(!second.is_primary_contact);
    assert_eq!(second.radio_station_id, Some(env.station.id));
}

#[tokio::test]
async fn sessions_authenticate_until_logout() {
    let env = TestEnv::new().await;
    let outcome = env
        .service
        .login("journalist@newskoop.test", PASSWORD, None)
        .await
        .unwrap();

    let principal = env.service.authenticate(&outcome.token).await.unwrap();
    assert_eq!(principal.user_id, env.staff.journalist.id);
    assert_eq!(principal.staff_role, Some(StaffRole::Journalist));

    env.service.logout(&outcome.token).await.unwrap();
    let err = env.service.authenticate(&outcome.token).await.unwrap_err();
    assert!(matches!(err, NewsroomError::Unauthorized { .. }));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let env = TestEnv::new().await;
    let wrong = env
        .service
        .login("journalist@newskoop.test", "Nope-12345", None)
        .await
        .unwrap_err();
    let unknown = env
        .service
        .login("nobody@newskoop.test", PASSWORD, None)
        .await
        .unwrap_err();
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn change_password_keeps_only_the_current_session() {
    let env = TestEnv::new().await;
    let first = env
        .service
        .login("editor@newskoop.test", PASSWORD, None)
        .await
        .unwrap();
    let second = env
        .service
        .login("editor@newskoop.test", PASSWORD, None)
        .await
        .unwrap();

    let err = env
        .service
        .change_password(&env.as_editor(), Some(&first.token), "Wrong-Pass-1", "Fresh-Pass-99")
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Validation { .. }));

    env.service
        .change_password(&env.as_editor(), Some(&first.token), PASSWORD, "Fresh-Pass-99")
        .await
        .unwrap();

    assert!(env.service.authenticate(&first.token).await.is_ok());
    assert!(env.service.authenticate(&second.token).await.is_err());
    assert!(env
        .service
        .login("editor@newskoop.test", "Fresh-Pass-99", None)
        .await
        .is_ok());
}

#[tokio::test]
async fn weak_new_password_is_rejected() {
    let env = TestEnv::new().await;
    let err = env
        .service
        .change_password(&env.as_editor(), None, PASSWORD, "short")
        .await
        .unwrap_err();
    match err {
        NewsroomError::Validation { details, .. } => {
            assert_eq!(details[0].field, "password");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn password_reset_is_silent_for_unknown_accounts() {
    let env = TestEnv::new().await;
    env.service
        .request_password_reset("ghost@newskoop.test")
        .await
        .unwrap();
    assert!(env.mailer.sent().is_empty());

    env.service
        .request_password_reset("Intern@Newskoop.test")
        .await
        .unwrap();
    let mail = env.mailer.last_to("intern@newskoop.test").unwrap();
    let session = env
        .service
        .login("intern@newskoop.test", PASSWORD, None)
        .await
        .unwrap();

    env.service
        .reset_password(&token_in(&mail.text), "Another-Pass-7")
        .await
        .unwrap();
    // A reset ends every existing session
    assert!(env.service.authenticate(&session.token).await.is_err());
}

#[tokio::test]
async fn deactivated_users_lose_access() {
    let env = TestEnv::new().await;
    let session = env
        .service
        .login("intern@newskoop.test", PASSWORD, None)
        .await
        .unwrap();

    let err = env
        .service
        .deactivate_user(&env.as_admin(), env.staff.admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));

    env.service
        .deactivate_user(&env.as_admin(), env.staff.intern.id)
        .await
        .unwrap();
    assert!(env.service.authenticate(&session.token).await.is_err());
    assert!(env
        .service
        .login("intern@newskoop.test", PASSWORD, None)
        .await
        .is_err());
}

#[tokio::test]
async fn users_may_edit_their_own_names_but_not_their_role() {
    let env = TestEnv::new().await;
    let me = env.as_journalist();

    let updated = env
        .service
        .update_user(
            &me,
            me.user_id,
            UserPatch {
                first_name: Some("Lerato".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Lerato");

    let err = env
        .service
        .update_user(
            &me,
            me.user_id,
            UserPatch {
                staff_role: Some(StaffRole::Editor),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Forbidden { .. }));
}

#[tokio::test]
async fn superadmin_bootstrap_runs_once() {
    let env = TestEnv::new().await;
    let err = env
        .service
        .bootstrap_superadmin("root@newskoop.test", "Root", "User", PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, NewsroomError::Conflict { .. }));
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_purged() {
    let env = TestEnv::with_config(Config {
        session_ttl_hours: 0,
        ..Config::default()
    })
    .await;
    let a = env
        .service
        .login("editor@newskoop.test", PASSWORD, None)
        .await
        .unwrap();
    env.service
        .login("admin@newskoop.test", PASSWORD, None)
        .await
        .unwrap();

    let err = env.service.authenticate(&a.token).await.unwrap_err();
    assert!(matches!(err, NewsroomError::Unauthorized { .. }));

    // The rejected session was already removed on access
    assert_eq!(env.service.purge_expired_sessions().await.unwrap(), 1);
}

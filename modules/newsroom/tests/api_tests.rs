//! HTTP-level tests for the REST router: auth, problem details, routing and uploads

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{print_test_header, TestEnv, PASSWORD};
use newsroom::api::rest::register_routes;
use newsroom::domain::BroadcastEventPublisher;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn router(env: &TestEnv) -> Router {
    register_routes(
        Router::new(),
        env.service.clone(),
        Arc::new(BroadcastEventPublisher::new(16)),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn health_needs_no_session() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn openapi_document_lists_schemas() {
    let env = TestEnv::new().await;
    let (status, body) = send(&router(&env), get("/api/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["components"]["schemas"]["StoryDto"].is_object());
    assert!(body["components"]["schemas"]["Problem"].is_object());
}

#[tokio::test]
async fn login_sets_cookie_that_authenticates() {
    print_test_header(
        "login_sets_cookie_that_authenticates",
        "Session cookie from login is accepted in place of a bearer token",
    );
    let env = TestEnv::new().await;
    let app = router(&env);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "Editor@Newskoop.test", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie")
        .to_string();
    assert!(cookie.starts_with("newskoop_session="));
    assert!(cookie.contains("HttpOnly"));
    let pair = cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "editor@newskoop.test");
    assert_eq!(body["staff_role"], "EDITOR");
}

#[tokio::test]
async fn missing_or_bad_sessions_are_401_problems() {
    let env = TestEnv::new().await;
    let app = router(&env);

    let (status, body) = send(&app, get("/api/stories", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert_eq!(body["title"], "Unauthorized");
    assert!(body["error"].is_string());

    let (status, _) = send(&app, get("/api/stories", Some("not-a-session"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "editor@newskoop.test", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_always_succeeds_and_ends_the_session() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let token = login(&app, "journalist@newskoop.test").await;

    let (status, _) = send(&app, json_request("POST", "/api/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, get("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, json_request("POST", "/api/auth/logout", None, json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn request_validation_reports_fields() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let token = login(&app, "journalist@newskoop.test").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/stories",
            Some(&token),
            json!({ "title": "", "content": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation Error");
    let fields: Vec<_> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["content", "title"]);

    // Malformed JSON and unknown enum values are 400s as well
    let request = Request::builder()
        .method("POST")
        .uri("/api/stories")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let story = env.draft("Status check", vec![env.taxonomy.english.id]).await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/stories/{}/status", story.id),
            Some(&token),
            json!({ "status": "SHREDDED" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");
}

#[tokio::test]
async fn malformed_path_ids_are_400() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let token = login(&app, "editor@newskoop.test").await;
    let (status, body) = send(&app, get("/api/stories/not-a-uuid", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn out_of_range_pages_are_400() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let token = login(&app, "editor@newskoop.test").await;

    let (status, body) = send(
        &app,
        get("/api/stories?page=18446744073709551615", Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "page");

    let (status, body) = send(&app, get("/api/stories?page=1000000", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn story_workflow_over_http() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let journalist = login(&app, "journalist@newskoop.test").await;
    let editor = login(&app, "editor@newskoop.test").await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/stories",
            Some(&journalist),
            json!({
                "title": "Harbour reopens",
                "content": "<p>Ships are back.</p>",
                "category_id": env.taxonomy.news.id,
                "classification_ids": [env.taxonomy.english.id],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "DRAFT");
    assert_eq!(created["slug"], "harbour-reopens");
    let id = created["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/stories/{id}/status");

    // Status names are case-insensitive on input
    let (status, body) = send(
        &app,
        json_request("POST", &status_uri, Some(&journalist), json!({ "status": "in_review" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_REVIEW");

    let (status, body) = send(
        &app,
        json_request("POST", &status_uri, Some(&editor), json!({ "status": "PUBLISHED" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["title"], "Invalid Status Transition");

    let (status, body) = send(
        &app,
        json_request("POST", &status_uri, Some(&editor), json!({ "status": "NEEDS_REVISION" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "reason");

    let (status, body) = send(&app, get(&format!("/api/stories/{id}"), Some(&editor))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "News");
    assert_eq!(body["classifications"][0]["name"], "English");

    let (status, body) = send(&app, get("/api/stories?mine=true", Some(&journalist))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let (_, body) = send(&app, get("/api/stories?mine=true", Some(&editor))).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn admin_creates_users_over_http() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let admin = login(&app, "admin@newskoop.test").await;
    let journalist = login(&app, "journalist@newskoop.test").await;

    let new_user = json!({
        "email": "nomsa@newskoop.test",
        "first_name": "Nomsa",
        "last_name": "Dlamini",
        "user_type": "STAFF",
        "staff_role": "JOURNALIST",
    });

    let (status, _) = send(&app, json_request("POST", "/api/users", Some(&journalist), new_user.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, json_request("POST", "/api/users", Some(&admin), new_user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["must_change_password"], true);
    assert!(env.mailer.last_to("nomsa@newskoop.test").is_some());

    let (status, body) = send(&app, json_request("POST", "/api/users", Some(&admin), new_user)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    env.mailer.set_failing(true);
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/users",
            Some(&admin),
            json!({
                "email": "unreachable@newskoop.test",
                "first_name": "Un",
                "last_name": "Reachable",
                "user_type": "STAFF",
                "staff_role": "INTERN",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn radio_feed_over_http() {
    let env = TestEnv::new().await;
    let app = router(&env);
    env.published("Cape floods", vec![env.taxonomy.english.id]).await;
    env.published("Zulu only", vec![env.taxonomy.isizulu.id]).await;

    let radio = login(&app, "dj@kaapstad.test").await;
    let (status, body) = send(&app, get("/api/radio/stories", Some(&radio))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["slug"], "cape-floods");

    let (status, _) = send(&app, get("/api/radio/stories/zulu-only", Some(&radio))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/api/radio/shows", Some(&radio))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["total_pages"], 0);

    let editor = login(&app, "editor@newskoop.test").await;
    let (status, _) = send(&app, get("/api/radio/stories", Some(&editor))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Radio accounts stay out of the newsroom
    let (status, _) = send(&app, get("/api/stories", Some(&radio))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn multipart_upload(uri: &str, token: &str, field: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "newskoop-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"clip.mp3\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn story_audio_upload_over_multipart() {
    let env = TestEnv::new().await;
    let app = router(&env);
    let token = login(&app, "journalist@newskoop.test").await;
    let story = env.draft("Audio report", vec![env.taxonomy.english.id]).await;
    let uri = format!("/api/stories/{}/audio", story.id);

    let (status, body) = send(
        &app,
        multipart_upload(&uri, &token, "file", "audio/mpeg", b"ID3fake-frames"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "upload failed: {body}");
    assert_eq!(body["mime_type"], "audio/mpeg");
    assert!(env.blobs.contains(body["url"].as_str().unwrap()));

    let (status, body) = send(
        &app,
        multipart_upload(&uri, &token, "attachment", "audio/mpeg", b"ID3fake-frames"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "file");

    let (status, _) = send(
        &app,
        multipart_upload(&uri, &token, "file", "image/png", b"\x89PNG"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_stream_requires_a_session() {
    let env = TestEnv::new().await;
    let (status, _) = send(&router(&env), get("/api/events", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

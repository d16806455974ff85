//! Route registration

use super::handlers::{
    admin, announcements, auth, bulletins, comments, diary, events, radio, shows, stations,
    stories, system, tasks, taxonomy, users,
};
use crate::domain::events::BroadcastEventPublisher;
use crate::domain::Service;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Extension, Router,
};
use std::sync::Arc;

/// Multipart framing on top of the audio payload itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Register all REST routes
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    hub: Arc<BroadcastEventPublisher>,
) -> Router {
    let upload_limit = DefaultBodyLimit::max(service.config().max_audio_bytes + MULTIPART_OVERHEAD);

    router
        .route("/health", get(system::health))
        .route("/api/openapi.json", get(system::openapi_json))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        // Users
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Stations
        .route(
            "/api/stations",
            get(stations::list_stations).post(stations::create_station),
        )
        .route(
            "/api/stations/{id}",
            get(stations::get_station)
                .patch(stations::update_station)
                .delete(stations::delete_station),
        )
        .route("/api/stations/{id}/users", get(stations::list_station_users))
        // Taxonomy
        .route(
            "/api/categories",
            get(taxonomy::list_categories).post(taxonomy::create_category),
        )
        .route(
            "/api/categories/{id}",
            patch(taxonomy::update_category).delete(taxonomy::delete_category),
        )
        .route(
            "/api/classifications",
            get(taxonomy::list_classifications).post(taxonomy::create_classification),
        )
        .route(
            "/api/classifications/{id}",
            patch(taxonomy::update_classification).delete(taxonomy::delete_classification),
        )
        .route("/api/tags", get(taxonomy::list_tags).post(taxonomy::create_tag))
        .route(
            "/api/tags/{id}",
            patch(taxonomy::update_tag).delete(taxonomy::delete_tag),
        )
        // Stories
        .route(
            "/api/stories",
            get(stories::list_stories).post(stories::create_story),
        )
        .route("/api/stories/slug/{slug}", get(stories::get_story_by_slug))
        .route(
            "/api/stories/{id}",
            get(stories::get_story)
                .patch(stories::update_story)
                .delete(stories::delete_story),
        )
        .route("/api/stories/{id}/status", post(stories::change_status))
        .route(
            "/api/stories/{id}/translations",
            post(stories::create_translation),
        )
        .route(
            "/api/stories/{id}/audio",
            post(stories::upload_audio).layer(upload_limit.clone()),
        )
        .route(
            "/api/stories/{id}/audio/{clip_id}",
            delete(stories::delete_audio),
        )
        // Comments
        .route(
            "/api/stories/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/api/comments/{id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/api/comments/{id}/resolve", post(comments::resolve_comment))
        // Tasks
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        // Shows and episodes
        .route("/api/shows", get(shows::list_shows).post(shows::create_show))
        .route(
            "/api/shows/{id}",
            get(shows::get_show)
                .patch(shows::update_show)
                .delete(shows::delete_show),
        )
        .route(
            "/api/shows/{id}/episodes",
            get(shows::list_episodes).post(shows::create_episode),
        )
        .route(
            "/api/episodes/{id}",
            patch(shows::update_episode).delete(shows::delete_episode),
        )
        .route(
            "/api/episodes/{id}/audio",
            post(shows::upload_episode_audio).layer(upload_limit),
        )
        .route("/api/episodes/{id}/publish", post(shows::publish_episode))
        // Bulletins
        .route(
            "/api/bulletins",
            get(bulletins::list_bulletins).post(bulletins::create_bulletin),
        )
        .route(
            "/api/bulletins/{id}",
            get(bulletins::get_bulletin)
                .patch(bulletins::update_bulletin)
                .delete(bulletins::delete_bulletin),
        )
        .route("/api/bulletins/{id}/stories", put(bulletins::set_stories))
        .route("/api/bulletins/{id}/status", post(bulletins::change_status))
        // Diary
        .route("/api/diary", get(diary::list_entries).post(diary::create_entry))
        .route(
            "/api/diary/{id}",
            patch(diary::update_entry).delete(diary::delete_entry),
        )
        // Announcements
        .route(
            "/api/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/api/announcements/{id}",
            patch(announcements::update_announcement).delete(announcements::delete_announcement),
        )
        .route(
            "/api/announcements/{id}/dismiss",
            post(announcements::dismiss_announcement),
        )
        // Admin
        .route("/api/audit-logs", get(admin::list_audit_logs))
        .route("/api/admin/diagnostics", get(admin::run_diagnostics))
        // Radio station feed
        .route("/api/radio/stories", get(radio::list_stories))
        .route("/api/radio/stories/{slug}", get(radio::get_story))
        .route("/api/radio/shows", get(radio::list_shows))
        .route("/api/radio/shows/{slug}/episodes", get(radio::list_episodes))
        .route("/api/radio/bulletins", get(radio::list_bulletins))
        // Real-time
        .route("/api/events", get(events::event_stream))
        // Add service and event hub as extensions for handlers
        .layer(Extension(hub))
        .layer(Extension(service))
}

//! OpenAPI document for the newsroom API

use super::dto::*;
use super::error::{FieldProblem, Problem};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Newskoop API",
        description = "Newsroom editorial workflow and radio station content distribution."
    ),
    tags(
        (name = "auth", description = "Sessions and passwords"),
        (name = "users", description = "Staff and radio station accounts"),
        (name = "stations", description = "Radio station clients and their content rules"),
        (name = "taxonomy", description = "Categories, classifications and tags"),
        (name = "stories", description = "Stories, workflow, translations and audio"),
        (name = "tasks", description = "Newsroom work assignments"),
        (name = "shows", description = "Shows and episodes"),
        (name = "bulletins", description = "News bulletins"),
        (name = "diary", description = "Newsroom diary"),
        (name = "announcements", description = "Notices for staff and stations"),
        (name = "radio", description = "Content feed for radio stations"),
        (name = "admin", description = "Audit log and diagnostics"),
    ),
    components(schemas(
        Problem, FieldProblem, MessageResponse, HealthResponse,
        LoginRequest, LoginResponse, ChangePasswordRequest, ForgotPasswordRequest, ResetPasswordRequest,
        UserDto, CreateUserRequest, UpdateUserRequest,
        StationDto, CreateStationRequest, UpdateStationRequest,
        CategoryDto, CategoryNodeDto, CreateCategoryRequest, UpdateCategoryRequest,
        ClassificationDto, CreateClassificationRequest, UpdateClassificationRequest,
        TagDto, TagRequest,
        StoryDto, StoryDetailsDto, AudioClipDto, CreateStoryRequest, UpdateStoryRequest,
        StatusChangeRequest, TranslationRequest,
        CommentDto, CreateCommentRequest, UpdateCommentRequest,
        ShowDto, CreateShowRequest, UpdateShowRequest,
        EpisodeDto, CreateEpisodeRequest, UpdateEpisodeRequest,
        BulletinDto, CreateBulletinRequest, UpdateBulletinRequest, BulletinStoriesRequest, BulletinStatusRequest,
        TaskDto, CreateTaskRequest, UpdateTaskRequest,
        DiaryEntryDto, CreateDiaryEntryRequest, UpdateDiaryEntryRequest,
        AnnouncementDto, AnnouncementViewDto, CreateAnnouncementRequest, UpdateAnnouncementRequest,
        AuditEntryDto, DiagnosticCheckDto, DiagnosticsResponse,
    )),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Session token returned by /api/auth/login"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("newskoop_session"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_schemas_and_security() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.schemas.contains_key("StoryDto"));
        assert!(components.schemas.contains_key("Problem"));
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.security_schemes.contains_key("session_cookie"));
    }
}

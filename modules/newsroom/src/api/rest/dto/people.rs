// ===== Auth, user and station DTOs =====

use super::double_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ===== Auth =====

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "editor@newskoop.co.za")]
    pub email: String,

    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserDto,
    /// Session token; also set as the session cookie
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub token: String,

    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

// ===== Users =====

/// User response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "STAFF")]
    pub user_type: String,
    #[schema(example = "JOURNALIST")]
    pub staff_role: Option<String>,
    pub translation_language: Option<String>,
    pub radio_station_id: Option<Uuid>,
    pub is_primary_contact: bool,
    pub is_active: bool,
    pub must_change_password: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub last_name: String,

    #[schema(example = "STAFF")]
    pub user_type: String,

    #[serde(default)]
    #[schema(example = "JOURNALIST")]
    pub staff_role: Option<String>,

    #[serde(default)]
    pub translation_language: Option<String>,

    #[serde(default)]
    pub radio_station_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub last_name: Option<String>,

    pub staff_role: Option<String>,

    /// `null` clears the language
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub translation_language: Option<Option<String>>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub user_type: Option<String>,
    pub staff_role: Option<String>,
    pub station_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

// ===== Stations =====

/// Station response DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StationDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "GAUTENG")]
    pub province: String,
    pub contact_email: Option<String>,
    pub contact_number: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,
    pub has_content_access: bool,
    pub allowed_languages: Vec<String>,
    pub allowed_religions: Vec<String>,
    pub blocked_category_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStationRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[schema(example = "WESTERN_CAPE")]
    pub province: String,

    #[serde(default)]
    #[validate(email(message = "must be a valid email address"))]
    pub contact_email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub contact_number: Option<String>,

    #[serde(default)]
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,

    #[serde(default = "default_true")]
    pub has_content_access: bool,

    #[serde(default)]
    pub allowed_languages: Vec<String>,

    #[serde(default)]
    pub allowed_religions: Vec<String>,

    #[serde(default)]
    pub blocked_category_ids: Vec<Uuid>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStationRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    pub province: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub contact_email: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub contact_number: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,

    pub is_active: Option<bool>,
    pub has_content_access: Option<bool>,
    pub allowed_languages: Option<Vec<String>>,
    pub allowed_religions: Option<Vec<String>>,
    pub blocked_category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub province: Option<String>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

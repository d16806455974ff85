//! Users, sessions and radio stations

use super::{Principal, Province, StaffRole, UserType};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A staff member or radio station account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    /// Always stored lower-cased
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    /// Set for STAFF users only
    pub staff_role: Option<StaffRole>,
    /// Language a staff translator works into
    pub translation_language: Option<String>,
    /// Set for RADIO users only
    pub radio_station_id: Option<Uuid>,
    pub is_primary_contact: bool,
    pub is_active: bool,
    pub must_change_password: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            user_type: self.user_type,
            staff_role: self.staff_role,
            station_id: self.radio_station_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub staff_role: Option<StaffRole>,
    pub translation_language: Option<String>,
    pub radio_station_id: Option<Uuid>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub staff_role: Option<StaffRole>,
    pub translation_language: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub user_type: Option<UserType>,
    pub staff_role: Option<StaffRole>,
    pub station_id: Option<Uuid>,
    pub is_active: Option<bool>,
    /// Matches first name, last name or email
    pub search: Option<String>,
}

/// A login session; only the SHA-256 digest of the token is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: User,
    /// Raw session token, handed to the client exactly once
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Single-use password reset or invite token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A radio station client account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub province: Province,
    pub contact_email: Option<String>,
    pub contact_number: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,
    pub has_content_access: bool,
    /// Language classification names the station may receive
    pub allowed_languages: Vec<String>,
    /// Religion classification names the station may receive
    pub allowed_religions: Vec<String>,
    pub blocked_category_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStation {
    pub name: String,
    pub description: Option<String>,
    pub province: Province,
    pub contact_email: Option<String>,
    pub contact_number: Option<String>,
    pub website: Option<String>,
    pub has_content_access: bool,
    pub allowed_languages: Vec<String>,
    pub allowed_religions: Vec<String>,
    pub blocked_category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub province: Option<Province>,
    pub contact_email: Option<Option<String>>,
    pub contact_number: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub has_content_access: Option<bool>,
    pub allowed_languages: Option<Vec<String>>,
    pub allowed_religions: Option<Vec<String>>,
    pub blocked_category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationFilter {
    pub province: Option<Province>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

//! User administration

use super::auth::hash_password_blocking;
use super::{internal, Service};
use crate::contract::{
    NewUser, NewsroomError, Page, PageRequest, PasswordResetToken, Principal, StaffRole, User,
    UserFilter, UserPatch, UserType,
};
use crate::domain::credentials::{generate_token, hash_token, unusable_password};
use crate::domain::notifications::welcome_email;
use crate::domain::permissions::{can_assign_role, require, CrudAction, Resource};
use crate::domain::repository::AfterInsert;
use crate::domain::validation::{normalize_email, required_text, validate_password};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

/// Marks a hook failure as an email delivery problem
#[derive(Debug, thiserror::Error)]
#[error("welcome email failed: {0}")]
struct WelcomeEmailFailed(String);

fn no_after_insert() -> AfterInsert {
    Box::new(|_| Box::pin(async { Ok(()) }))
}

impl Service {
    pub(crate) async fn load_user(&self, id: Uuid) -> Result<User, NewsroomError> {
        self.repos
            .users
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("user", id))
    }

    /// Create a user and send the welcome email in one transaction
    ///
    /// The row is rolled back when the email cannot be sent.
    pub async fn create_user(
        &self,
        principal: &Principal,
        new: NewUser,
    ) -> Result<User, NewsroomError> {
        let actor = require(principal, Resource::User, CrudAction::Create)?;

        let email = normalize_email(&new.email)?;
        let first_name = required_text("first_name", &new.first_name)?;
        let last_name = required_text("last_name", &new.last_name)?;

        let (staff_role, station_id, is_primary_contact) = match new.user_type {
            UserType::Staff => {
                let role = new.staff_role.ok_or_else(|| {
                    NewsroomError::invalid_field("staff_role", "staff users need a role")
                })?;
                if !can_assign_role(actor, role) {
                    return Err(NewsroomError::forbidden(format!(
                        "{} may not create {} users",
                        actor, role
                    )));
                }
                (Some(role), None, false)
            }
            UserType::Radio => {
                let station_id = new.radio_station_id.ok_or_else(|| {
                    NewsroomError::invalid_field("radio_station_id", "radio users need a station")
                })?;
                let station = self
                    .repos
                    .stations
                    .find_by_id(station_id)
                    .await
                    .map_err(internal)?
                    .filter(|s| s.is_active)
                    .ok_or_else(|| {
                        NewsroomError::invalid_field(
                            "radio_station_id",
                            "station does not exist or is inactive",
                        )
                    })?;
                let existing = self
                    .repos
                    .users
                    .station_users(station.id)
                    .await
                    .map_err(internal)?;
                (None, Some(station.id), existing.is_empty())
            }
        };

        if self
            .repos
            .users
            .find_by_email(&email)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(NewsroomError::conflict(format!(
                "a user with email {} already exists",
                email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            user_type: new.user_type,
            staff_role,
            translation_language: new
                .translation_language
                .filter(|l| !l.trim().is_empty()),
            radio_station_id: station_id,
            is_primary_contact,
            is_active: true,
            must_change_password: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };

        let password_hash = tokio::task::spawn_blocking(unusable_password)
            .await
            .map_err(|e| internal(e.into()))?
            .map_err(internal)?;

        let token = generate_token();
        let invite = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: hash_token(&token),
            expires_at: now + Duration::hours(i64::from(self.config.invite_ttl_hours)),
            used_at: None,
            created_at: now,
        };

        let mail = welcome_email(
            &user,
            &self.config.public_base_url,
            &token,
            self.config.invite_ttl_hours,
        );
        let mailer = self.mailer.clone();
        let after: AfterInsert = Box::new(move |_user| {
            Box::pin(async move {
                mailer
                    .send(mail)
                    .await
                    .map_err(|e| anyhow::Error::new(WelcomeEmailFailed(e.to_string())))
            })
        });

        let created = match self
            .repos
            .users
            .insert(&user, &password_hash, Some(&invite), after)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                if let Some(failed) = e.downcast_ref::<WelcomeEmailFailed>() {
                    tracing::warn!(email = %user.email, error = %failed, "user creation rolled back");
                    return Err(NewsroomError::delivery(format!(
                        "could not send the welcome email to {}",
                        user.email
                    )));
                }
                return Err(internal(e));
            }
        };

        self.record_audit(
            Some(principal.user_id),
            "user.created",
            "user",
            Some(created.id.to_string()),
            json!({
                "email": created.email,
                "user_type": created.user_type.as_str(),
                "staff_role": created.staff_role.map(StaffRole::as_str),
            }),
        )
        .await;
        tracing::info!(user_id = %created.id, "user created");
        Ok(created)
    }

    /// Staff from sub-editor up may read anyone; everyone may read themselves
    pub async fn get_user(&self, principal: &Principal, id: Uuid) -> Result<User, NewsroomError> {
        if principal.user_id != id {
            require(principal, Resource::User, CrudAction::Read)?;
        }
        self.load_user(id).await
    }

    pub async fn list_users(
        &self,
        principal: &Principal,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, NewsroomError> {
        require(principal, Resource::User, CrudAction::Read)?;
        self.repos.users.list(filter, page).await.map_err(internal)
    }

    pub async fn update_user(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<User, NewsroomError> {
        let mut user = self.load_user(id).await?;
        let is_self = principal.user_id == id;
        let privileged = patch.staff_role.is_some() || patch.is_active.is_some();

        if privileged || !is_self {
            let actor = require(principal, Resource::User, CrudAction::Update)?;
            if let Some(current) = user.staff_role {
                if !is_self && !can_assign_role(actor, current) {
                    return Err(NewsroomError::forbidden(format!(
                        "{} may not modify {} users",
                        actor, current
                    )));
                }
            }
            if let Some(role) = patch.staff_role {
                if user.user_type != UserType::Staff {
                    return Err(NewsroomError::invalid_field(
                        "staff_role",
                        "radio users cannot hold a staff role",
                    ));
                }
                if !can_assign_role(actor, role) {
                    return Err(NewsroomError::forbidden(format!(
                        "{} may not assign the {} role",
                        actor, role
                    )));
                }
            }
            if is_self && patch.is_active == Some(false) {
                return Err(NewsroomError::forbidden("you cannot deactivate yourself"));
            }
        }

        let was_active = user.is_active;
        if let Some(first_name) = patch.first_name {
            user.first_name = required_text("first_name", &first_name)?;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = required_text("last_name", &last_name)?;
        }
        if let Some(language) = patch.translation_language {
            user.translation_language = language.filter(|l| !l.trim().is_empty());
        }
        if let Some(role) = patch.staff_role {
            user.staff_role = Some(role);
        }
        if let Some(active) = patch.is_active {
            user.is_active = active;
        }
        user.updated_at = Utc::now();

        let updated = self.repos.users.update(&user).await.map_err(internal)?;
        if was_active && !updated.is_active {
            self.repos
                .auth
                .delete_user_sessions(updated.id, None)
                .await
                .map_err(internal)?;
        }

        self.record_audit(
            Some(principal.user_id),
            "user.updated",
            "user",
            Some(updated.id.to_string()),
            json!({
                "staff_role": updated.staff_role.map(StaffRole::as_str),
                "is_active": updated.is_active,
            }),
        )
        .await;
        Ok(updated)
    }

    /// Soft-delete a user and end their sessions
    pub async fn deactivate_user(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        let actor = require(principal, Resource::User, CrudAction::Delete)?;
        if principal.user_id == id {
            return Err(NewsroomError::forbidden("you cannot deactivate yourself"));
        }
        let mut user = self.load_user(id).await?;
        if let Some(role) = user.staff_role {
            if !can_assign_role(actor, role) {
                return Err(NewsroomError::forbidden(format!(
                    "{} may not deactivate {} users",
                    actor, role
                )));
            }
        }

        user.is_active = false;
        user.updated_at = Utc::now();
        self.repos.users.update(&user).await.map_err(internal)?;
        self.repos
            .auth
            .delete_user_sessions(id, None)
            .await
            .map_err(internal)?;

        self.record_audit(
            Some(principal.user_id),
            "user.deactivated",
            "user",
            Some(id.to_string()),
            json!({ "email": user.email }),
        )
        .await;
        tracing::info!(user_id = %id, "user deactivated");
        Ok(())
    }

    /// Create the first super-admin; refused once one exists
    pub async fn bootstrap_superadmin(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<User, NewsroomError> {
        let existing = self
            .repos
            .users
            .count_by_role(StaffRole::SuperAdmin)
            .await
            .map_err(internal)?;
        if existing > 0 {
            return Err(NewsroomError::conflict("a super-admin already exists"));
        }

        let email = normalize_email(email)?;
        if self
            .repos
            .users
            .find_by_email(&email)
            .await
            .map_err(internal)?
            .is_some()
        {
            return Err(NewsroomError::conflict(format!(
                "a user with email {} already exists",
                email
            )));
        }
        validate_password(password)?;
        let password_hash = hash_password_blocking(password.to_string()).await?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            first_name: required_text("first_name", first_name)?,
            last_name: required_text("last_name", last_name)?,
            user_type: UserType::Staff,
            staff_role: Some(StaffRole::SuperAdmin),
            translation_language: None,
            radio_station_id: None,
            is_primary_contact: false,
            is_active: true,
            must_change_password: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        let created = self
            .repos
            .users
            .insert(&user, &password_hash, None, no_after_insert())
            .await
            .map_err(internal)?;

        self.record_audit(
            None,
            "user.bootstrapped",
            "user",
            Some(created.id.to_string()),
            json!({ "email": created.email }),
        )
        .await;
        tracing::info!(user_id = %created.id, "super-admin created");
        Ok(created)
    }
}

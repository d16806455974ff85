//! Login, sessions and password management

use super::{internal, Service};
use crate::contract::{LoginOutcome, NewsroomError, PasswordResetToken, Principal, Session, User};
use crate::domain::credentials::{generate_token, hash_password, hash_token, verify_password};
use crate::domain::notifications::password_reset_email;
use crate::domain::validation::validate_password;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Hash on the blocking pool
pub(crate) async fn hash_password_blocking(password: String) -> Result<String, NewsroomError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| internal(e.into()))?
        .map_err(internal)
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool, NewsroomError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| internal(e.into()))
}

impl Service {
    /// Exchange credentials for a session token
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        user_agent: Option<String>,
    ) -> Result<LoginOutcome, NewsroomError> {
        let email = email.trim().to_lowercase();
        let Some(mut user) = self.repos.users.find_by_email(&email).await.map_err(internal)? else {
            tracing::debug!("login for unknown email");
            return Err(NewsroomError::unauthorized(INVALID_CREDENTIALS));
        };
        let hash = self
            .repos
            .users
            .password_hash(user.id)
            .await
            .map_err(internal)?
            .unwrap_or_default();

        let verified = verify_password_blocking(password.to_string(), hash).await?;
        if !verified || !user.is_active {
            tracing::info!(user_id = %user.id, "rejected login");
            return Err(NewsroomError::unauthorized(INVALID_CREDENTIALS));
        }

        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + Duration::hours(i64::from(self.config.session_ttl_hours));
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: hash_token(&token),
            user_agent: user_agent.clone(),
            expires_at,
            created_at: now,
        };
        self.repos.auth.insert_session(&session).await.map_err(internal)?;
        self.repos.users.touch_login(user.id, now).await.map_err(internal)?;
        user.last_login_at = Some(now);

        self.record_audit(
            Some(user.id),
            "auth.login",
            "user",
            Some(user.id.to_string()),
            json!({ "user_agent": user_agent }),
        )
        .await;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginOutcome {
            user,
            token,
            expires_at,
        })
    }

    /// Resolve a session token to the caller it belongs to
    pub async fn authenticate(&self, token: &str) -> Result<Principal, NewsroomError> {
        let token_hash = hash_token(token);
        let session = self
            .repos
            .auth
            .find_session(&token_hash)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::unauthorized("invalid session"))?;

        if session.expires_at <= Utc::now() {
            if let Err(e) = self.repos.auth.delete_session(&token_hash).await {
                tracing::warn!(error = %e, "failed to delete expired session");
            }
            return Err(NewsroomError::unauthorized("session expired"));
        }

        let user = self
            .repos
            .users
            .find_by_id(session.user_id)
            .await
            .map_err(internal)?
            .filter(|u| u.is_active)
            .ok_or_else(|| NewsroomError::unauthorized("account is not active"))?;

        Ok(user.principal())
    }

    pub async fn logout(&self, token: &str) -> Result<(), NewsroomError> {
        self.repos
            .auth
            .delete_session(&hash_token(token))
            .await
            .map_err(internal)
    }

    /// The caller's own account
    pub async fn me(&self, principal: &Principal) -> Result<User, NewsroomError> {
        self.repos
            .users
            .find_by_id(principal.user_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::unauthorized("account no longer exists"))
    }

    /// Change the caller's password and sign out their other sessions
    pub async fn change_password(
        &self,
        principal: &Principal,
        current_token: Option<&str>,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), NewsroomError> {
        let user = self.me(principal).await?;
        let hash = self
            .repos
            .users
            .password_hash(user.id)
            .await
            .map_err(internal)?
            .unwrap_or_default();

        if !verify_password_blocking(current_password.to_string(), hash).await? {
            return Err(NewsroomError::invalid_field(
                "current_password",
                "current password is incorrect",
            ));
        }
        validate_password(new_password)?;

        let new_hash = hash_password_blocking(new_password.to_string()).await?;
        self.repos
            .users
            .set_password(user.id, &new_hash, false)
            .await
            .map_err(internal)?;

        let keep = match current_token {
            Some(token) => self
                .repos
                .auth
                .find_session(&hash_token(token))
                .await
                .map_err(internal)?
                .map(|s| s.id),
            None => None,
        };
        let revoked = self
            .repos
            .auth
            .delete_user_sessions(user.id, keep)
            .await
            .map_err(internal)?;

        self.record_audit(
            Some(user.id),
            "auth.password_changed",
            "user",
            Some(user.id.to_string()),
            json!({ "revoked_sessions": revoked }),
        )
        .await;
        Ok(())
    }

    /// Email a reset link when the address belongs to an active user
    ///
    /// Succeeds whether or not the account exists.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), NewsroomError> {
        let email = email.trim().to_lowercase();
        let user = match self.repos.users.find_by_email(&email).await {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => {
                tracing::debug!("password reset requested for unknown or inactive account");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(error = ?e, "password reset lookup failed");
                return Ok(());
            }
        };

        let token = generate_token();
        let now = Utc::now();
        let minutes = self.config.password_reset_ttl_minutes;
        let record = PasswordResetToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_hash: hash_token(&token),
            expires_at: now + Duration::minutes(i64::from(minutes)),
            used_at: None,
            created_at: now,
        };
        if let Err(e) = self.repos.auth.insert_reset_token(&record).await {
            tracing::error!(error = ?e, user_id = %user.id, "failed to store reset token");
            return Ok(());
        }

        let email = password_reset_email(&user, &self.config.public_base_url, &token, minutes);
        if let Err(e) = self.mailer.send(email).await {
            tracing::warn!(error = %e, user_id = %user.id, "failed to send password reset email");
        }
        Ok(())
    }

    /// Set a new password using a reset or invite token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), NewsroomError> {
        let invalid = || NewsroomError::invalid_field("token", "reset link is invalid or has expired");

        let record = self
            .repos
            .auth
            .find_reset_token(&hash_token(token))
            .await
            .map_err(internal)?
            .ok_or_else(invalid)?;
        let now = Utc::now();
        if record.used_at.is_some() || record.expires_at <= now {
            return Err(invalid());
        }
        validate_password(new_password)?;

        let new_hash = hash_password_blocking(new_password.to_string()).await?;
        if !self
            .repos
            .auth
            .consume_reset_token(record.id, now)
            .await
            .map_err(internal)?
        {
            return Err(invalid());
        }
        self.repos
            .users
            .set_password(record.user_id, &new_hash, false)
            .await
            .map_err(internal)?;
        self.repos
            .auth
            .delete_user_sessions(record.user_id, None)
            .await
            .map_err(internal)?;

        self.record_audit(
            Some(record.user_id),
            "auth.password_reset",
            "user",
            Some(record.user_id.to_string()),
            json!({}),
        )
        .await;
        tracing::info!(user_id = %record.user_id, "password reset");
        Ok(())
    }
}

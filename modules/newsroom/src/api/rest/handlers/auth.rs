//! Login, logout and password management

use crate::api::rest::dto::*;
use crate::api::rest::error::{map_domain_error, Problem};
use crate::api::rest::extract::{
    expired_session_cookie, session_cookie, session_token, user_agent, CurrentUser, ValidJson,
};
use crate::domain::Service;
use axum::{http::HeaderMap, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

const RESET_REQUESTED: &str =
    "If an account exists for that address, a password reset link has been sent";

pub async fn login(
    Extension(service): Extension<Arc<Service>>,
    jar: CookieJar,
    headers: HeaderMap,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), Problem> {
    let outcome = service
        .login(&req.email, &req.password, user_agent(&headers))
        .await
        .map_err(map_domain_error)?;

    let jar = jar.add(session_cookie(service.config(), outcome.token.clone()));
    Ok((jar, Json(outcome.into())))
}

/// Ends the current session if there is one; always clears the cookie
pub async fn logout(
    Extension(service): Extension<Arc<Service>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, StatusCode), Problem> {
    if let Some(token) = session_token(&headers, &service.config().session_cookie_name) {
        service.logout(&token).await.map_err(map_domain_error)?;
    }
    let jar = jar.remove(expired_session_cookie(service.config()));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
) -> Result<Json<UserDto>, Problem> {
    let me = service.me(&user.principal).await.map_err(map_domain_error)?;
    Ok(Json(me.into()))
}

pub async fn change_password(
    Extension(service): Extension<Arc<Service>>,
    user: CurrentUser,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, Problem> {
    service
        .change_password(
            &user.principal,
            Some(&user.token),
            &req.current_password,
            &req.new_password,
        )
        .await
        .map_err(map_domain_error)?;
    Ok(Json(MessageResponse::new("Password changed")))
}

pub async fn forgot_password(
    Extension(service): Extension<Arc<Service>>,
    ValidJson(req): ValidJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, Problem> {
    service
        .request_password_reset(&req.email)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(MessageResponse::new(RESET_REQUESTED)))
}

pub async fn reset_password(
    Extension(service): Extension<Arc<Service>>,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, Problem> {
    service
        .reset_password(&req.token, &req.password)
        .await
        .map_err(map_domain_error)?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}

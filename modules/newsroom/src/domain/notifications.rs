//! Email templates

use super::collaborators::OutgoingEmail;
use crate::contract::User;

fn link(base_url: &str, path: &str, token: &str) -> String {
    format!("{}/{}?token={}", base_url.trim_end_matches('/'), path, token)
}

/// Welcome email with a link to choose a first password
pub fn welcome_email(user: &User, base_url: &str, token: &str, valid_hours: u32) -> OutgoingEmail {
    let url = link(base_url, "set-password", token);
    let text = format!(
        "Hi {},\n\n\
         An account has been created for you on Newskoop.\n\n\
         Choose your password here (valid for {} hours):\n{}\n\n\
         If you were not expecting this email you can ignore it.\n",
        user.first_name, valid_hours, url
    );
    let html = format!(
        "<p>Hi {},</p>\
         <p>An account has been created for you on Newskoop.</p>\
         <p><a href=\"{}\">Choose your password</a> (valid for {} hours).</p>\
         <p>If you were not expecting this email you can ignore it.</p>",
        user.first_name, url, valid_hours
    );
    OutgoingEmail {
        to: user.email.clone(),
        subject: "Welcome to Newskoop".to_string(),
        text,
        html: Some(html),
    }
}

pub fn password_reset_email(
    user: &User,
    base_url: &str,
    token: &str,
    valid_minutes: u32,
) -> OutgoingEmail {
    let url = link(base_url, "reset-password", token);
    let text = format!(
        "Hi {},\n\n\
         Someone asked to reset your Newskoop password.\n\n\
         Reset it here (valid for {} minutes):\n{}\n\n\
         If this wasn't you, no action is needed.\n",
        user.first_name, valid_minutes, url
    );
    let html = format!(
        "<p>Hi {},</p>\
         <p>Someone asked to reset your Newskoop password.</p>\
         <p><a href=\"{}\">Reset your password</a> (valid for {} minutes).</p>\
         <p>If this wasn't you, no action is needed.</p>",
        user.first_name, url, valid_minutes
    );
    OutgoingEmail {
        to: user.email.clone(),
        subject: "Reset your Newskoop password".to_string(),
        text,
        html: Some(html),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{StaffRole, UserType};
    use chrono::Utc;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "lerato@newskoop.co.za".to_string(),
            first_name: "Lerato".to_string(),
            last_name: "Mokoena".to_string(),
            user_type: UserType::Staff,
            staff_role: Some(StaffRole::Journalist),
            translation_language: None,
            radio_station_id: None,
            is_primary_contact: false,
            is_active: true,
            must_change_password: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn reset_link_points_at_the_client() {
        let email = password_reset_email(&user(), "https://newskoop.example/", "abc123", 60);
        assert_eq!(email.to, "lerato@newskoop.co.za");
        assert!(email
            .text
            .contains("https://newskoop.example/reset-password?token=abc123"));
    }

    #[test]
    fn welcome_mentions_the_user() {
        let email = welcome_email(&user(), "http://localhost:3000", "tok", 72);
        assert!(email.text.starts_with("Hi Lerato"));
        assert!(email.text.contains("/set-password?token=tok"));
    }
}

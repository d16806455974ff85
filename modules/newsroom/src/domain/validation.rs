//! Business-rule validation shared by service operations

use crate::config::Config;
use crate::contract::{NewsroomError, Upload};

pub const MIN_PASSWORD_LEN: usize = 8;

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit
pub fn validate_password(password: &str) -> Result<(), NewsroomError> {
    let mut missing = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        missing.push(format!("at least {} characters", MIN_PASSWORD_LEN));
    }
    if !password.chars().any(char::is_uppercase) {
        missing.push("an uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        missing.push("a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit".to_string());
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(NewsroomError::invalid_field(
            "password",
            format!("password must contain {}", missing.join(", ")),
        ))
    }
}

/// Trim and lower-case an email address, rejecting obvious garbage
pub fn normalize_email(email: &str) -> Result<String, NewsroomError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(NewsroomError::invalid_field("email", "invalid email address"))
    }
}

/// Trimmed, non-empty text
pub fn required_text(field: &str, value: &str) -> Result<String, NewsroomError> {
    let value = value.trim();
    if value.is_empty() {
        Err(NewsroomError::invalid_field(field, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

/// Check an audio upload against the configured size and type limits
pub fn validate_audio(upload: &Upload, config: &Config) -> Result<(), NewsroomError> {
    if upload.bytes.is_empty() {
        return Err(NewsroomError::invalid_field("file", "file is empty"));
    }
    if upload.bytes.len() > config.max_audio_bytes {
        return Err(NewsroomError::invalid_field(
            "file",
            format!(
                "file is {} bytes, the limit is {} bytes",
                upload.bytes.len(),
                config.max_audio_bytes
            ),
        ));
    }

    let essence = upload
        .content_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().to_ascii_lowercase())
        .map_err(|_| NewsroomError::invalid_field("file", "unrecognised content type"))?;
    if !config
        .allowed_audio_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
    {
        return Err(NewsroomError::invalid_field(
            "file",
            format!("content type {} is not an accepted audio format", essence),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(content_type: &str, len: usize) -> Upload {
        Upload {
            file_name: "clip.mp3".to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; len]),
        }
    }

    #[test]
    fn password_policy() {
        assert!(validate_password("Newsroom1").is_ok());
        assert!(validate_password("Short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(
            normalize_email("  Thandi.Zulu@Newskoop.co.za ").unwrap(),
            "thandi.zulu@newskoop.co.za"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a@localhost").is_err());
    }

    #[test]
    fn audio_limits() {
        let config = Config {
            max_audio_bytes: 10,
            ..Config::default()
        };
        assert!(validate_audio(&upload("audio/mpeg", 5), &config).is_ok());
        assert!(validate_audio(&upload("audio/mpeg; charset=binary", 5), &config).is_ok());
        assert!(validate_audio(&upload("audio/mpeg", 0), &config).is_err());
        assert!(validate_audio(&upload("audio/mpeg", 11), &config).is_err());
        assert!(validate_audio(&upload("video/mp4", 5), &config).is_err());
    }
}

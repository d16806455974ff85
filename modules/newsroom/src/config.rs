//! Configuration for the newsroom module

use serde::{Deserialize, Serialize};

/// Newsroom module configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Lifetime of a login session (hours)
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,

    /// Lifetime of password reset links (minutes)
    #[serde(default = "default_password_reset_ttl_minutes")]
    pub password_reset_ttl_minutes: u32,

    /// Lifetime of the set-password link in a welcome email (hours)
    #[serde(default = "default_invite_ttl_hours")]
    pub invite_ttl_hours: u32,

    /// Maximum accepted audio upload size in bytes
    #[serde(default = "default_max_audio_bytes")]
    pub max_audio_bytes: usize,

    /// MIME types accepted for audio uploads
    #[serde(default = "default_allowed_audio_types")]
    pub allowed_audio_types: Vec<String>,

    /// Base URL of the web client, used in emailed links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Events buffered per real-time subscriber before the oldest are dropped
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,

    /// Mark the session cookie `Secure` (enable behind HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,

    /// How often expired sessions are purged (minutes)
    #[serde(default = "default_session_purge_interval_minutes")]
    pub session_purge_interval_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            password_reset_ttl_minutes: default_password_reset_ttl_minutes(),
            invite_ttl_hours: default_invite_ttl_hours(),
            max_audio_bytes: default_max_audio_bytes(),
            allowed_audio_types: default_allowed_audio_types(),
            public_base_url: default_public_base_url(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            event_buffer: default_event_buffer(),
            session_cookie_name: default_session_cookie_name(),
            secure_cookies: false,
            session_purge_interval_minutes: default_session_purge_interval_minutes(),
        }
    }
}

fn default_session_ttl_hours() -> u32 {
    24 * 7
}

fn default_password_reset_ttl_minutes() -> u32 {
    60
}

fn default_invite_ttl_hours() -> u32 {
    72
}

fn default_max_audio_bytes() -> usize {
    50 * 1024 * 1024 // 50MB
}

fn default_allowed_audio_types() -> Vec<String> {
    [
        "audio/mpeg",
        "audio/mp3",
        "audio/wav",
        "audio/x-wav",
        "audio/ogg",
        "audio/aac",
        "audio/mp4",
        "audio/x-m4a",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    100
}

fn default_event_buffer() -> usize {
    256
}

fn default_session_cookie_name() -> String {
    "newskoop_session".to_string()
}

fn default_session_purge_interval_minutes() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.session_cookie_name, "newskoop_session");
        assert!(cfg.allowed_audio_types.iter().any(|t| t == "audio/mpeg"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"session_ttl": 1}"#);
        assert!(result.is_err());
    }
}

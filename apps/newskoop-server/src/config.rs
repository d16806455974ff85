//! Layered server configuration
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. YAML file (`--config <path>`, or `config/newskoop.yaml` when present)
//! 3. Environment variables `NEWSKOOP__<SECTION>__<KEY>`

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use newsroom::config::Config as NewsroomConfig;
use newsroom::infra::{MailConfig, StorageConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/newskoop.yaml";
pub const ENV_PREFIX: &str = "NEWSKOOP__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub email: MailConfig,
    #[serde(default)]
    pub newsroom: NewsroomConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Upper bound for producing a response (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Body limit for non-upload requests
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,

    /// Origins allowed to call the API with credentials; empty disables CORS
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_database_url() -> String {
    "sqlite://data/newskoop.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_log_level() -> String {
    "info,newsroom=debug,tower_http=info".to_string()
}

impl AppConfig {
    /// Build the provider chain
    ///
    /// An explicit `path` is always merged; the default path only when the
    /// file exists.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                default.exists().then_some(default)
            }
        };
        if let Some(file) = file {
            figment = figment.merge(Yaml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        if let Some(p) = path {
            if !p.exists() {
                return Err(figment::Error::from(format!(
                    "config file {} not found",
                    p.display()
                )));
            }
        }
        Self::figment(path).extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_any_source() {
        Jail::expect_with(|_jail| {
            let cfg = AppConfig::load(None)?;
            assert_eq!(cfg, AppConfig::default());
            assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
            assert_eq!(cfg.logging.format, LogFormat::Text);
            assert_eq!(cfg.newsroom.session_cookie_name, "newskoop_session");
            Ok(())
        });
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.yaml",
                r#"
server:
  bind_addr: "127.0.0.1:9000"
logging:
  format: json
newsroom:
  session_ttl_hours: 12
"#,
            )?;
            let cfg = AppConfig::load(Some(Path::new("custom.yaml")))?;
            assert_eq!(cfg.server.bind_addr, "127.0.0.1:9000");
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(cfg.newsroom.session_ttl_hours, 12);
            assert_eq!(cfg.newsroom.max_page_size, 100);
            Ok(())
        });
    }

    #[test]
    fn default_path_is_picked_up_when_present() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                DEFAULT_CONFIG_PATH,
                "database:\n  url: \"sqlite::memory:\"\n",
            )?;
            let cfg = AppConfig::load(None)?;
            assert_eq!(cfg.database.url, "sqlite::memory:");
            Ok(())
        });
    }

    #[test]
    fn environment_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "database:\n  max_connections: 3\n")?;
            jail.set_env("NEWSKOOP__DATABASE__MAX_CONNECTIONS", "7");
            jail.set_env("NEWSKOOP__EMAIL__SMTP_HOST", "smtp.example.org");
            let cfg = AppConfig::load(Some(Path::new("custom.yaml")))?;
            assert_eq!(cfg.database.max_connections, 7);
            assert_eq!(cfg.email.smtp_host, "smtp.example.org");
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        Jail::expect_with(|_jail| {
            assert!(AppConfig::load(Some(Path::new("nope.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn unknown_module_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "newsroom:\n  not_a_setting: 1\n")?;
            assert!(AppConfig::load(Some(Path::new("custom.yaml"))).is_err());
            Ok(())
        });
    }
}

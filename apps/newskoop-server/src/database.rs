use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;

/// Open the connection pool, creating the SQLite file's directory if needed
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(&config.url) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create database directory {}", dir.display()))?;
    }

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to database ({})", backend_name(&config.url)))?;
    tracing::info!(backend = backend_name(&config.url), "database connected");
    Ok(db)
}

fn backend_name(url: &str) -> &'static str {
    if url.starts_with("postgres") {
        "postgres"
    } else if url.starts_with("sqlite") {
        "sqlite"
    } else {
        "unknown"
    }
}

/// Directory of a file-backed SQLite URL
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://")?;
    let file = rest.split('?').next()?;
    if file.is_empty() || file.starts_with(':') {
        return None;
    }
    Path::new(file)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_dir_only_for_file_urls() {
        assert_eq!(
            sqlite_parent_dir("sqlite://data/newskoop.db?mode=rwc"),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://newskoop.db"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://localhost/newskoop"), None);
    }
}

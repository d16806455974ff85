//! Object storage for uploaded audio

use crate::domain::collaborators::{BlobStore, StoredFile, UploadRequest};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Datelike, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory uploads are written under
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// URL prefix the server serves `root_dir` at
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            public_path: default_public_path(),
        }
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

fn default_public_path() -> String {
    "/uploads".to_string()
}

/// Keep ASCII letters, digits, dots, dashes and underscores; collapse the rest
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `audio/{yyyy}/{mm}/{uuid}-{name}`
fn object_path(file_name: &str) -> String {
    let now = Utc::now();
    format!(
        "audio/{:04}/{:02}/{}-{}",
        now.year(),
        now.month(),
        Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

fn public_url(prefix: &str, pathname: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), pathname)
}

/// Pathname of a URL this store issued, `None` for foreign URLs
fn pathname_of<'a>(prefix: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(prefix.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|p| !p.is_empty())
}

// ===== Local disk =====

pub struct LocalBlobStore {
    root: PathBuf,
    public_path: String,
}

impl LocalBlobStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.root_dir.clone(),
            public_path: config.public_path.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, pathname: &str) -> Result<PathBuf> {
        let relative = Path::new(pathname);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("refusing path outside the storage root: {}", pathname);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, request: UploadRequest) -> Result<StoredFile> {
        let pathname = object_path(&request.file_name);
        let target = self.resolve(&pathname)?;
        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(&target, &request.bytes)
            .await
            .with_context(|| format!("writing {}", target.display()))?;

        tracing::debug!(pathname = %pathname, size = request.bytes.len(), "stored upload");
        Ok(StoredFile {
            url: public_url(&self.public_path, &pathname),
            pathname,
            size: request.bytes.len() as u64,
        })
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let Some(pathname) = pathname_of(&self.public_path, url) else {
            tracing::debug!(url, "not a local upload, nothing to delete");
            return Ok(());
        };
        let target = self.resolve(pathname)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", target.display())),
        }
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

// ===== In memory =====

/// Keeps uploads in a map keyed by URL
#[derive(Default)]
pub struct MemoryBlobStore {
    files: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.files.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, request: UploadRequest) -> Result<StoredFile> {
        let pathname = object_path(&request.file_name);
        let url = format!("memory://{}", pathname);
        let size = request.bytes.len() as u64;
        self.files.insert(url.clone(), request.bytes);
        Ok(StoredFile {
            url,
            pathname,
            size,
        })
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.files.remove(url);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> UploadRequest {
        UploadRequest {
            file_name: name.to_string(),
            content_type: "audio/mpeg".to_string(),
            bytes: Bytes::from_static(b"ID3"),
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("Morning News (final).MP3"), "morning-news-final-.mp3");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("???"), "file");
    }

    #[test]
    fn only_own_urls_map_to_paths() {
        assert_eq!(
            pathname_of("/uploads", "/uploads/audio/2025/03/x.mp3"),
            Some("audio/2025/03/x.mp3")
        );
        assert_eq!(pathname_of("/uploads/", "/uploads/a.mp3"), Some("a.mp3"));
        assert_eq!(pathname_of("/uploads", "https://cdn.example.com/a.mp3"), None);
        assert_eq!(pathname_of("/uploads", "/uploadsx/a.mp3"), None);
    }

    #[tokio::test]
    async fn local_store_writes_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&StorageConfig {
            root_dir: dir.path().to_path_buf(),
            public_path: "/uploads".to_string(),
        });

        let stored = store.upload(request("Clip One.mp3")).await.unwrap();
        assert!(stored.pathname.starts_with("audio/"));
        assert!(stored.pathname.ends_with("-clip-one.mp3"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.pathname));
        assert_eq!(stored.size, 3);

        let on_disk = dir.path().join(&stored.pathname);
        assert!(on_disk.exists());

        store.delete(&stored.url).await.unwrap();
        assert!(!on_disk.exists());
        // Second delete is a no-op
        store.delete(&stored.url).await.unwrap();
    }

    #[tokio::test]
    async fn local_store_refuses_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(&StorageConfig {
            root_dir: dir.path().to_path_buf(),
            public_path: "/uploads".to_string(),
        });
        assert!(store.delete("/uploads/../secret").await.is_err());
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        let stored = store.upload(request("a.ogg")).await.unwrap();
        assert!(store.contains(&stored.url));
        store.delete(&stored.url).await.unwrap();
        assert!(store.is_empty());
    }
}

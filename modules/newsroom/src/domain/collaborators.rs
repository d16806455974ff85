//! Outbound collaborators: object storage and email
//!
//! Implementations live in `infra::blob` and `infra::mail`.

use async_trait::async_trait;
use bytes::Bytes;

/// A file to put into object storage
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Where an uploaded file ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Public URL clients fetch the file from
    pub url: String,
    /// Storage-relative path
    pub pathname: String,
    pub size: u64,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> anyhow::Result<StoredFile>;

    /// Remove a previously uploaded file; unknown URLs are not an error
    async fn delete(&self, url: &str) -> anyhow::Result<()>;

    /// Short name for logs and diagnostics
    fn backend(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> anyhow::Result<()>;

    /// Whether a real transport is configured
    fn is_configured(&self) -> bool;
}

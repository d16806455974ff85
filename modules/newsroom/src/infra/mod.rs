//! Infrastructure layer - database, object storage and email

pub mod blob;
pub mod mail;
pub mod storage;

pub use blob::{LocalBlobStore, MemoryBlobStore, StorageConfig};
pub use mail::{build_mailer, LogMailer, MailConfig, RecordingMailer, SmtpMailer};

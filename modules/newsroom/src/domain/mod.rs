//! Domain layer - business logic and services

pub mod collaborators;
pub mod credentials;
pub mod events;
pub mod feed;
pub mod hierarchy;
pub mod notifications;
pub mod permissions;
pub mod repository;
pub mod service;
pub mod slug;
pub mod validation;
pub mod workflow;

pub use collaborators::{BlobStore, Mailer, OutgoingEmail, StoredFile, UploadRequest};
pub use events::{
    BroadcastEventPublisher, Channel, ChannelEvent, ContentEvent, EventKind, EventPublisher,
    NoOpEventPublisher, RecordingEventPublisher,
};
pub use feed::FeedFilter;
pub use repository::Repositories;
pub use service::Service;

/// Real-time content events
///
/// Events are fire-and-forget notifications for connected clients:
/// - `newsroom`: every staff member
/// - `radio`: every radio station user
/// - `user:{id}`: one user (task assignments, mentions)
///
/// Publishing is best effort. The service logs a failed publish and carries on.
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Audience of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Newsroom,
    Radio,
    User(Uuid),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Newsroom => f.write_str("newsroom"),
            Channel::Radio => f.write_str("radio"),
            Channel::User(id) => write!(f, "user:{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "story.created")]
    StoryCreated,
    #[serde(rename = "story.updated")]
    StoryUpdated,
    #[serde(rename = "story.status_changed")]
    StoryStatusChanged,
    #[serde(rename = "story.published")]
    StoryPublished,
    #[serde(rename = "story.deleted")]
    StoryDeleted,
    #[serde(rename = "comment.created")]
    CommentCreated,
    #[serde(rename = "task.assigned")]
    TaskAssigned,
    #[serde(rename = "task.updated")]
    TaskUpdated,
    #[serde(rename = "episode.published")]
    EpisodePublished,
    #[serde(rename = "bulletin.published")]
    BulletinPublished,
    #[serde(rename = "announcement.created")]
    AnnouncementCreated,
    #[serde(rename = "diagnostics.probe")]
    DiagnosticsProbe,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::StoryCreated => "story.created",
            EventKind::StoryUpdated => "story.updated",
            EventKind::StoryStatusChanged => "story.status_changed",
            EventKind::StoryPublished => "story.published",
            EventKind::StoryDeleted => "story.deleted",
            EventKind::CommentCreated => "comment.created",
            EventKind::TaskAssigned => "task.assigned",
            EventKind::TaskUpdated => "task.updated",
            EventKind::EpisodePublished => "episode.published",
            EventKind::BulletinPublished => "bulletin.published",
            EventKind::AnnouncementCreated => "announcement.created",
            EventKind::DiagnosticsProbe => "diagnostics.probe",
        }
    }
}

/// A content change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEvent {
    #[serde(rename = "event")]
    pub kind: EventKind,
    pub entity_id: Uuid,
    pub payload: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl ContentEvent {
    pub fn new(kind: EventKind, entity_id: Uuid, payload: serde_json::Value) -> Self {
        Self {
            kind,
            entity_id,
            payload,
            at: Utc::now(),
        }
    }
}

/// An event addressed to a channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    pub channel: Channel,
    pub event: ContentEvent,
}

/// Sink for content events
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, channel: Channel, event: ContentEvent) -> anyhow::Result<()>;
}

/// Drops every event
pub struct NoOpEventPublisher;

#[async_trait::async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _channel: Channel, _event: ContentEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// In-process fan-out over a tokio broadcast channel
///
/// Slow subscribers lose the oldest events; publishing with no subscriber
/// connected is not an error.
#[derive(Clone)]
pub struct BroadcastEventPublisher {
    tx: broadcast::Sender<ChannelEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait::async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, channel: Channel, event: ContentEvent) -> anyhow::Result<()> {
        match self.tx.send(ChannelEvent { channel, event }) {
            Ok(count) => tracing::debug!(%channel, subscribers = count, "event broadcast"),
            Err(_) => tracing::trace!(%channel, "event dropped, no subscribers"),
        }
        Ok(())
    }
}

/// Keeps every event in memory; can be told to fail
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<ChannelEvent>>,
    failing: AtomicBool,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ChannelEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn kinds_on(&self, channel: Channel) -> Vec<EventKind> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.channel == channel)
            .map(|e| e.event.kind)
            .collect()
    }
}

#[async_trait::async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, channel: Channel, event: ContentEvent) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("event sink unavailable");
        }
        self.events.lock().push(ChannelEvent { channel, event });
        Ok(())
    }
}

//! Server-Sent Events stream of content changes

use crate::api::rest::extract::CurrentUser;
use crate::contract::Principal;
use crate::domain::events::{BroadcastEventPublisher, Channel, ChannelEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Extension;
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;

/// Channels a caller listens on
pub fn channels_for(principal: &Principal) -> Vec<Channel> {
    if principal.is_staff() {
        vec![Channel::Newsroom, Channel::User(principal.user_id)]
    } else {
        vec![Channel::Radio]
    }
}

fn to_sse(event: &ChannelEvent) -> Option<Event> {
    match serde_json::to_string(&event.event) {
        Ok(json) => Some(Event::default().event(event.event.kind.as_str()).data(json)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize content event");
            None
        }
    }
}

/// GET /api/events
pub async fn event_stream(
    Extension(hub): Extension<Arc<BroadcastEventPublisher>>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let channels = channels_for(&user.principal);
    tracing::debug!(user_id = %user.principal.user_id, "event stream opened");

    let stream = BroadcastStream::new(hub.subscribe()).filter_map(move |received| {
        let item = match received {
            Ok(event) if channels.contains(&event.channel) => to_sse(&event).map(Ok),
            Ok(_) => None,
            Err(e) => {
                // Lagged receivers skip what they missed
                tracing::warn!(error = %e, "event stream lagged");
                None
            }
        };
        futures::future::ready(item)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::StaffRole;
    use uuid::Uuid;

    #[test]
    fn staff_hear_newsroom_and_their_own_channel() {
        let id = Uuid::new_v4();
        let channels = channels_for(&Principal::staff(id, StaffRole::Journalist));
        assert_eq!(channels, vec![Channel::Newsroom, Channel::User(id)]);
    }

    #[test]
    fn radio_users_hear_only_the_radio_channel() {
        let channels = channels_for(&Principal::radio(Uuid::new_v4(), Uuid::new_v4()));
        assert_eq!(channels, vec![Channel::Radio]);
    }
}

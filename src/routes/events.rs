use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::{Stream, StreamExt, future};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};

use crate::{
    events::{EventFilter, StoreEvent},
    middleware::auth::AuthUser,
    routes::params::EventStreamQuery,
    state::AppState,
};

fn to_sse(event: &StoreEvent) -> Option<Event> {
    match Event::default().event(event.kind()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(err) => {
            tracing::warn!(error = %err, kind = event.kind(), "failed to encode event");
            None
        }
    }
}

/// Live order and ticket updates for the caller.
///
/// Customers receive events about their own orders and tickets; staff receive
/// everything. `order_id` / `ticket_id` narrow the stream to one record.
#[utoipa::path(
    get,
    path = "/api/events",
    params(
        ("order_id" = Option<uuid::Uuid>, Query, description = "Only events for this order"),
        ("ticket_id" = Option<uuid::Uuid>, Query, description = "Only events for this ticket")
    ),
    responses(
        (status = 200, description = "Server-sent event stream; event name is the kind, data is the JSON event", content_type = "text/event-stream", body = StoreEvent),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn stream_events(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EventStreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = EventFilter {
        order_id: query.order_id,
        ticket_id: query.ticket_id,
    };
    let (user_id, role) = (user.user_id, user.role);
    tracing::debug!(user_id = %user_id, "event stream opened");

    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(move |received| {
        let item = match received {
            Ok(event) if event.visible_to(user_id, role) && filter.matches(&event) => {
                to_sse(&event).map(Ok)
            }
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(user_id = %user_id, skipped, "event subscriber lagged");
                None
            }
        };
        future::ready(item)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

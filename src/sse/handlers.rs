use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use std::convert::Infallible;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, instrument};

use crate::shared::AppState;

/// HTTP handler for the live event stream
///
/// GET /sse
/// Subscribes the client to the hub and keeps the stream open until the
/// client hangs up. The hub emits `connected` immediately, `race-update`
/// on every ingested sample and `ping` keepalives; client disconnects
/// surface as failed sends and evict the subscriber.
#[instrument(name = "sse_subscribe", skip(state))]
pub async fn subscribe(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, receiver) = state.sse_hub.subscribe().await;
    info!(subscriber_id = %id, "SSE stream opened");

    let stream =
        UnboundedReceiverStream::new(receiver).map(|event| Ok(event.into_sse_event()));

    Sse::new(stream)
}

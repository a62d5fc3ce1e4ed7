use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::features::storefront::services::StorefrontService;
use crate::modules::realtime::FeedMessage;

/// Live catalog changes
///
/// Upgrades to a WebSocket that pushes every change as JSON. A `resync` message
/// means changes were missed and the client should reload the storefront.
#[utoipa::path(
    get,
    path = "/api/realtime",
    responses(
        (status = 101, description = "Switching to the WebSocket protocol"),
    ),
    tag = "storefront"
)]
pub async fn realtime(
    ws: WebSocketUpgrade,
    State(service): State<Arc<StorefrontService>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_changes(service, socket))
}

async fn forward_changes(service: Arc<StorefrontService>, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = BroadcastStream::new(service.subscribe());

    let send_task = tokio::spawn(async move {
        while let Some(item) = events.next().await {
            let message = match item {
                Ok(message) => message,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::debug!("WebSocket client lagged by {} messages", skipped);
                    FeedMessage::Resync
                }
            };

            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to encode feed message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Client messages are ignored; the loop only detects disconnects
    while let Some(Ok(_)) = receiver.next().await {}

    send_task.abort();
}

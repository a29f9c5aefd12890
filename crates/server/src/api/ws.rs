//! WebSocket support for live taxonomy updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use taxonomy_core::{
    PatchOperation, TaxonomyChangeHandler, TaxonomyDiffChange, TaxonomyResponse,
    TaxonomyService, TaxonomySnapshot,
};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket message sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Complete snapshot, sent when a client connects or falls behind.
    TaxonomyFullUpdate {
        id: u64,
        taxonomy: TaxonomySnapshot,
    },
    /// Patch against the previously sent state.
    TaxonomyDiffChange { id: u64, diff: Vec<PatchOperation> },
}

impl WsMessage {
    fn kind(&self) -> &'static str {
        match self {
            WsMessage::TaxonomyFullUpdate { .. } => "taxonomy_full_update",
            WsMessage::TaxonomyDiffChange { .. } => "taxonomy_diff_change",
        }
    }
}

impl From<TaxonomyResponse> for WsMessage {
    fn from(response: TaxonomyResponse) -> Self {
        WsMessage::TaxonomyFullUpdate {
            id: response.id,
            taxonomy: response.taxonomy,
        }
    }
}

impl From<&TaxonomyDiffChange> for WsMessage {
    fn from(change: &TaxonomyDiffChange) -> Self {
        WsMessage::TaxonomyDiffChange {
            id: change.id,
            diff: change.diff.clone(),
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    /// Handler to register with the taxonomy service.
    ///
    /// Only pushes into the channel, so it never blocks a cycle.
    pub fn change_handler(&self) -> TaxonomyChangeHandler {
        let broadcaster = self.clone();
        Arc::new(move |change: &TaxonomyDiffChange| {
            broadcaster.broadcast(WsMessage::from(change));
        })
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &WsMessage,
) -> bool {
    WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();

    match serde_json::to_string(msg) {
        Ok(json) => {
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!("WebSocket send failed, client disconnected");
                return false;
            }
            true
        }
        Err(e) => {
            error!("Failed to serialize WsMessage: {}", e);
            true
        }
    }
}

/// Drop everything buffered in `rx` and return the current snapshot.
///
/// Both happen under the taxonomy read lock, and cycles broadcast while
/// holding the write lock, so every diff received afterwards applies on top
/// of the returned snapshot.
async fn resync(
    taxonomy: &RwLock<TaxonomyService>,
    rx: &mut broadcast::Receiver<WsMessage>,
) -> WsMessage {
    let taxonomy = taxonomy.read().await;
    *rx = rx.resubscribe();
    WsMessage::from(taxonomy.get_taxonomy())
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe and take the baseline under the same read lock, so no diff
    // can fall between the two.
    let (mut rx, baseline) = {
        let taxonomy = state.taxonomy().read().await;
        (
            state.ws_broadcaster().subscribe(),
            WsMessage::from(taxonomy.get_taxonomy()),
        )
    };

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        if !send_message(&mut sender, &baseline).await {
            return;
        }

        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if !send_message(&mut sender, &msg).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Skipped diffs can't be replayed; resend the full snapshot.
                    // Diffs still buffered predate it and are discarded.
                    warn!("WebSocket client lagged, skipped {} messages", n);
                    WS_LAG_EVENTS.inc();
                    let full = resync(state.taxonomy(), &mut rx).await;
                    if !send_message(&mut sender, &full).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring client text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_message_format() {
        let change = TaxonomyDiffChange {
            id: 42,
            diff: vec![PatchOperation::Replace {
                path: "/statusCounts/".to_string(),
                value: 3,
            }],
        };

        let json = serde_json::to_value(WsMessage::from(&change)).unwrap();
        assert_eq!(json["type"], "taxonomy_diff_change");
        assert_eq!(json["id"], 42);
        assert_eq!(json["diff"][0]["op"], "replace");
        assert_eq!(json["diff"][0]["path"], "/statusCounts/");
        assert_eq!(json["diff"][0]["value"], 3);
    }

    #[test]
    fn test_full_update_message_format() {
        let msg = WsMessage::from(TaxonomyResponse {
            id: 7,
            taxonomy: TaxonomySnapshot::new(),
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "taxonomy_full_update");
        assert_eq!(json["taxonomy"]["tagCounts"]["untagged"], 0);
    }

    #[tokio::test]
    async fn test_change_handler_broadcasts() {
        let broadcaster = WsBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();
        let handler = broadcaster.change_handler();

        let change = TaxonomyDiffChange {
            id: 1,
            diff: Vec::new(),
        };
        handler(&change);

        assert_eq!(rx.recv().await.unwrap(), WsMessage::from(&change));
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ignored() {
        let broadcaster = WsBroadcaster::default();
        broadcaster.broadcast(WsMessage::TaxonomyDiffChange {
            id: 1,
            diff: Vec::new(),
        });
    }

    #[tokio::test]
    async fn test_lagged_client_resyncs_without_stale_diffs() {
        use taxonomy_core::{apply, testing::fixtures, torrent_list, TorrentStatus};

        let broadcaster = WsBroadcaster::new(2);
        let mut rx = broadcaster.subscribe();
        let mut service = TaxonomyService::new();
        service.on_taxonomy_change(broadcaster.change_handler());
        let taxonomy = RwLock::new(service);

        let plain = fixtures::torrent("a");
        let mut tagged = plain.clone();
        tagged.tags = vec!["x".to_string()];
        let mut moved = plain.clone();
        moved.directory = "/archive".to_string();

        // Four changing cycles overflow a channel of two.
        for listing in [&plain, &tagged, &plain, &moved] {
            let change = taxonomy
                .write()
                .await
                .process_list(&torrent_list(vec![listing.clone()]))
                .unwrap();
            assert!(change.is_some());
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));

        let mut mirror = match resync(&taxonomy, &mut rx).await {
            WsMessage::TaxonomyFullUpdate { taxonomy, .. } => taxonomy,
            other => panic!("unexpected message: {:?}", other),
        };
        assert!(rx.try_recv().is_err());

        let paused = fixtures::torrent_with(
            "a",
            &[TorrentStatus::Paused],
            &[],
            &["tracker.example.org"],
            "/downloads",
            100,
        );
        taxonomy
            .write()
            .await
            .process_list(&torrent_list(vec![paused]))
            .unwrap();

        match rx.recv().await.unwrap() {
            WsMessage::TaxonomyDiffChange { diff, .. } => apply(&mut mirror, &diff).unwrap(),
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(&mirror, taxonomy.read().await.taxonomy());
    }
}

//! WebSocket handler for the live notification channel.
//!
//! Each connection subscribes to the single occasion-notification topic.
//! Inbound publishes are stamped with the session's editor identity before
//! fan-out, so clients cannot forge attribution. When a connection closes,
//! every edit notice it owned is retired and other clients are told to
//! unlock with the `"*"` sentinel.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use folio_core::{Action, Editor, Notice, NoticeDraft, UNLOCK_ALL};

use crate::identity::EditorIdentity;
use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    EditorIdentity(editor): EditorIdentity,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, editor))
}

/// Handle individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState, editor: Editor) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.tx.subscribe();

    let receiver_count = state.tx.receiver_count();
    info!(editor_id = %editor.id, receiver_count, "WebSocket client connected");

    // Replay active edit notices so a late subscriber learns current locks.
    let replay = state.store.lock().unwrap().active();
    if !replay.is_empty() {
        let json = serde_json::to_string(&replay).unwrap();
        debug!(count = replay.len(), "Replaying active notices to new subscriber");
        if sender.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    // Forward broadcast frames to this client, interleaved with heartbeats.
    let heartbeat = state.config.heartbeat;
    let mut send_task = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(heartbeat);
        loop {
            tokio::select! {
                frame = rx.recv() => match frame {
                    Ok(frame) => {
                        let json = serde_json::to_string(&frame).unwrap();
                        debug!(frame = %json, "Sending frame to WebSocket client");
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            debug!("WebSocket send failed, client disconnected");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "WebSocket client lagged, frames dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = ping_interval.tick() => {
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Handle publishes from this client.
    let recv_state = state.clone();
    let recv_editor = editor.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_publish(&recv_state, &recv_editor, text.as_str()),
                Message::Close(_) => {
                    debug!("WebSocket client sent close frame");
                    break;
                }
                _ => {}
            }
        }
    });

    // When one pump finishes, abort the other and wait for it to wind
    // down. Cleanup below must not run while the receive pump can still
    // apply a buffered publish to the store.
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
    }

    // Disconnect cleanup: retire this editor's locks and tell everyone.
    let removed = state.store.lock().unwrap().remove_all_for_editor(&editor.id);
    if !removed.is_empty() {
        state.broadcast(vec![Notice {
            data: String::new(),
            id: UNLOCK_ALL.to_string(),
            action: Action::Stop,
            editor_id: editor.id.clone(),
            editor_name: editor.name.clone(),
        }]);
    }
    info!(editor_id = %editor.id, "WebSocket client disconnected");
}

/// Stamp one inbound publish and fan it out as a single-notice frame.
///
/// A malformed body is logged and dropped; it must never take the
/// connection down.
fn handle_publish(state: &AppState, editor: &Editor, body: &str) {
    let draft: NoticeDraft = match serde_json::from_str(body) {
        Ok(draft) => draft,
        Err(error) => {
            debug!(%error, body, "Ignoring malformed publish body");
            return;
        }
    };
    let notice = draft.stamp(editor);
    info!(
        action = %notice.action,
        data = %notice.data,
        id = %notice.id,
        editor_id = %notice.editor_id,
        "Relaying notice"
    );
    state.store.lock().unwrap().apply(&notice);
    state.broadcast(vec![notice]);
}

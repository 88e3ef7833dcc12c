//! Broadcast channel for fanning notice frames out to WebSocket sessions.

use folio_core::Frame;
use tokio::sync::broadcast;

/// Type alias for the broadcast sender.
pub type FrameSender = broadcast::Sender<Frame>;

/// Type alias for the broadcast receiver.
pub type FrameReceiver = broadcast::Receiver<Frame>;

/// Create a new broadcast channel with default capacity.
pub fn frame_channel() -> FrameSender {
    let (tx, _rx) = broadcast::channel(100);
    tx
}

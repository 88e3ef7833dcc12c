//! Application state.

use std::sync::{Arc, Mutex};

use folio_broker::{frame_channel, FrameSender, NoticeStore};
use folio_core::Frame;

use crate::config::ServerConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<NoticeStore>>,
    pub tx: FrameSender,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(NoticeStore::new())),
            tx: frame_channel(),
            config,
        }
    }

    /// Broadcast a frame to every connected WebSocket session.
    pub fn broadcast(&self, frame: Frame) {
        let _ = self.tx.send(frame);
    }
}

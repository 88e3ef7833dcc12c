//! Outbound notifier.
//!
//! A thin, fire-and-forget publish handle shared by every feature module.
//! Call it only after the corresponding REST mutation has succeeded, so
//! notices always describe committed state.

use folio_core::{Action, NoticeDraft, OccasionKind};
use tokio::sync::mpsc;
use tracing::debug;

/// Publishes notices over the channel. Cheap to clone.
///
/// The local identity is never attached; the broker stamps it from the
/// authenticated connection.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<NoticeDraft>,
}

impl Notifier {
    pub(crate) fn new(tx: mpsc::UnboundedSender<NoticeDraft>) -> Self {
        Self { tx }
    }

    /// Publish one notice. No acknowledgement is expected; while the channel
    /// is down, notices queue locally and flush in order once it reconnects.
    pub fn send(&self, data: impl Into<String>, id: impl Into<String>, action: Action) {
        let draft = NoticeDraft::new(data, id, action);
        if self.tx.send(draft).is_err() {
            debug!("Notification channel closed, dropping outbound notice");
        }
    }

    /// Publish an occasion notice without spelling the kind as a string.
    pub fn send_occasion(&self, kind: OccasionKind, id: impl Into<String>, action: Action) {
        self.send(kind.as_str(), id, action);
    }
}

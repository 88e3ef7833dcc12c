//! Active-edit notice storage.
//!
//! Retained notices describe in-progress edits. They are replayed to clients
//! that subscribe after the edit began, and dropped either on a matching
//! `stop` or when the editing client's connection goes away.

use std::collections::{HashMap, HashSet};

use folio_core::{Action, Notice};
use tracing::{debug, info};

/// In-memory table of currently active edit notices.
///
/// Keys are `data:id`. A secondary index maps editor ids to the keys of the
/// notices they own, so disconnect cleanup does not scan the whole table.
#[derive(Debug, Default)]
pub struct NoticeStore {
    active: HashMap<String, Notice>,
    by_editor: HashMap<String, HashSet<String>>,
}

impl NoticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the table for one stamped notice.
    ///
    /// Retained actions are stored; `stop` removes the matching entry;
    /// everything else passes through untouched (its effect is instantaneous).
    pub fn apply(&mut self, notice: &Notice) {
        if notice.action.is_retained() {
            self.insert(notice.clone());
        } else if notice.action == Action::Stop {
            self.remove(&notice.key(), &notice.editor_id);
        }
    }

    fn insert(&mut self, notice: Notice) {
        let key = notice.key();
        debug!(%key, editor_id = %notice.editor_id, "Storing active notice");
        self.by_editor
            .entry(notice.editor_id.clone())
            .or_default()
            .insert(key.clone());
        self.active.insert(key, notice);
    }

    fn remove(&mut self, key: &str, editor_id: &str) {
        if self.active.remove(key).is_some() {
            debug!(%key, %editor_id, "Removing active notice");
        }
        if let Some(keychain) = self.by_editor.get_mut(editor_id) {
            keychain.remove(key);
            if keychain.is_empty() {
                self.by_editor.remove(editor_id);
            }
        }
    }

    /// Remove every active notice owned by one editor, returning the removed
    /// notices. Used when that editor's connection closes.
    pub fn remove_all_for_editor(&mut self, editor_id: &str) -> Vec<Notice> {
        let keychain = self.by_editor.remove(editor_id).unwrap_or_default();
        let mut removed = Vec::with_capacity(keychain.len());
        for key in keychain {
            if let Some(notice) = self.active.remove(&key) {
                removed.push(notice);
            }
        }
        if !removed.is_empty() {
            info!(
                %editor_id,
                count = removed.len(),
                "Removed active notices for disconnected editor"
            );
        }
        removed
    }

    /// Snapshot of every active notice, for replay to a new subscriber.
    pub fn active(&self) -> Vec<Notice> {
        self.active.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

//! Notice types: the unit of communication between clients and the broker.

use serde::{Deserialize, Deserializer, Serialize};

use crate::action::Action;
use crate::editor::Editor;
use crate::error::NoticeResult;

/// Sentinel id used with `stop`: unlock everything owned by the editor.
pub const UNLOCK_ALL: &str = "*";

/// Sentinel id meaning "no single affected entity, refetch the collection".
pub const WHOLE_COLLECTION: &str = "0";

/// A stamped notice, as fanned out by the broker to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    /// Occasion kind, role name, or a serialized payload depending on action.
    pub data: String,
    /// Entity id, or one of the sentinels.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub action: Action,
    /// Attribution supplied by the broker from the authenticated session.
    pub editor_id: String,
    pub editor_name: String,
}

impl Notice {
    /// Storage key for the broker's active-notice table.
    pub fn key(&self) -> String {
        format!("{}:{}", self.data, self.id)
    }

    pub fn editor(&self) -> Editor {
        Editor::new(self.editor_id.clone(), self.editor_name.clone())
    }

    /// True for the disconnect-cleanup message: `stop` with the `"*"` id.
    pub fn is_unlock_all(&self) -> bool {
        self.action == Action::Stop && self.id == UNLOCK_ALL
    }
}

/// An unstamped notice, as published by a client.
///
/// Deliberately has no identity fields; the broker attributes it to the
/// authenticated connection it arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeDraft {
    pub data: String,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub action: Action,
}

impl NoticeDraft {
    pub fn new(data: impl Into<String>, id: impl Into<String>, action: Action) -> Self {
        Self {
            data: data.into(),
            id: id.into(),
            action,
        }
    }

    /// Attach the sender's identity, producing the outbound notice.
    pub fn stamp(self, editor: &Editor) -> Notice {
        Notice {
            data: self.data,
            id: self.id,
            action: self.action,
            editor_id: editor.id.clone(),
            editor_name: editor.name.clone(),
        }
    }
}

/// One delivered channel frame: an ordered batch of notices.
pub type Frame = Vec<Notice>;

/// Decode a frame body. The body is always a JSON array, even for one notice.
pub fn parse_frame(body: &str) -> NoticeResult<Frame> {
    Ok(serde_json::from_str(body)?)
}

/// Clients may publish numeric ids; normalize them to strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

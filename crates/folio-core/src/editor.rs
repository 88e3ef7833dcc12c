//! Editor identity, as supplied by the authenticated session.

use serde::{Deserialize, Serialize};

/// The user a notice is attributed to.
///
/// Stamped onto outbound notices by the broker, never by the sending client,
/// so attribution cannot be forged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    pub id: String,
    pub name: String,
}

impl Editor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

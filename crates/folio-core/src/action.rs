//! The fixed action vocabulary carried by every notice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a notice announces about an entity.
///
/// Wire strings match the protocol exactly (several contain spaces).
/// Unrecognized strings deserialize to [`Action::Unknown`] so a message from
/// a newer peer never fails the whole frame; dispatchers ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Create,
    Update,
    Delete,
    Edit,
    Stop,
    AddRole,
    DeleteRole,
    UpdateUserDetails,
    UpdateUserPhoto,
    NewGroup,
    UpdateGroup,
    DeleteGroup,
    Unknown(String),
}

impl Action {
    /// Parse a wire string. Never fails; unrecognized input becomes `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "edit" => Self::Edit,
            "stop" => Self::Stop,
            "add role" => Self::AddRole,
            "delete role" => Self::DeleteRole,
            "update user details" => Self::UpdateUserDetails,
            "update user photo" => Self::UpdateUserPhoto,
            "newGroup" => Self::NewGroup,
            "updateGroup" => Self::UpdateGroup,
            "deleteGroup" => Self::DeleteGroup,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The exact string sent on the wire.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Edit => "edit",
            Self::Stop => "stop",
            Self::AddRole => "add role",
            Self::DeleteRole => "delete role",
            Self::UpdateUserDetails => "update user details",
            Self::UpdateUserPhoto => "update user photo",
            Self::NewGroup => "newGroup",
            Self::UpdateGroup => "updateGroup",
            Self::DeleteGroup => "deleteGroup",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the broker keeps this notice until a matching `stop`.
    ///
    /// Only `edit` describes an in-progress state worth replaying to clients
    /// that subscribe later; everything else takes effect instantly.
    pub fn is_retained(&self) -> bool {
        matches!(self, Self::Edit)
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_wire().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Direction of a role-change notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Add,
    Delete,
}

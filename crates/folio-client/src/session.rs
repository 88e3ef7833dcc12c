//! The signed-in user, as seen by the notification layer.

/// Roles granted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
    CourseAdministrator,
}

impl Role {
    /// Elevated roles see advisory edit notices; students do not.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Teacher | Self::CourseAdministrator)
    }
}

/// Identity and privileges of the local user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub user_name: String,
    pub roles: Vec<Role>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            roles,
        }
    }

    /// Whether lock banners and control hiding apply to this viewer at all.
    pub fn can_view_edit_notices(&self) -> bool {
        self.roles.iter().any(Role::is_elevated)
    }

    /// Whether a notice was produced by this user's own actions.
    pub fn is_self(&self, editor_id: &str) -> bool {
        self.user_id == editor_id
    }
}

//! Principals and the per-action permission table
//!
//! The owner holds every capability. Share links act with a reduced level:
//! viewers read, editors additionally create tasks. List deletion,
//! re-sharing and credential actions stay with the owner.

use serde::Serialize;
use std::fmt;

use super::share::ShareRole;
use crate::types::BoggaError;

/// Access levels, ordered from least to most capable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AccessLevel {
    /// Share link with the viewer role
    Viewer = 0,
    /// Share link with the editor role
    Editor = 1,
    /// Authenticated owner
    Owner = 2,
}

impl From<ShareRole> for AccessLevel {
    fn from(role: ShareRole) -> Self {
        match role {
            ShareRole::Viewer => AccessLevel::Viewer,
            ShareRole::Editor => AccessLevel::Editor,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Viewer => write!(f, "VIEWER"),
            AccessLevel::Editor => write!(f, "EDITOR"),
            AccessLevel::Owner => write!(f, "OWNER"),
        }
    }
}

/// The identity or capability a request acts as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Owner authenticated by session token
    Owner { user_id: String },
    /// Holder of a share link for one list
    Share { list_id: String, role: ShareRole },
}

impl Principal {
    pub fn access_level(&self) -> AccessLevel {
        match self {
            Principal::Owner { .. } => AccessLevel::Owner,
            Principal::Share { role, .. } => AccessLevel::from(*role),
        }
    }

    /// Check an action against this principal's level
    pub fn can(&self, action: Action) -> bool {
        is_action_allowed(action, self.access_level())
    }

    /// 403 unless this principal may perform `action`
    pub fn require(&self, action: Action) -> Result<(), BoggaError> {
        if self.can(action) {
            return Ok(());
        }
        tracing::warn!(action = ?action, level = %self.access_level(), "Action forbidden");
        Err(BoggaError::forbidden())
    }

    /// User id of an owner allowed to perform `action`, or 403
    pub fn require_owner(&self, action: Action) -> Result<&str, BoggaError> {
        self.require(action)?;
        match self {
            Principal::Owner { user_id } => Ok(user_id.as_str()),
            Principal::Share { .. } => Err(BoggaError::forbidden()),
        }
    }
}

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewList,
    CreateTask,
    BrowseLists,
    ViewTrash,
    UpdateTask,
    DeleteTask,
    RestoreTask,
    PurgeTask,
    CreateList,
    DeleteList,
    ManageShare,
}

impl Action {
    /// Minimum level required for the action
    pub const fn required_level(self) -> AccessLevel {
        match self {
            Action::ViewList => AccessLevel::Viewer,
            Action::CreateTask => AccessLevel::Editor,
            Action::BrowseLists
            | Action::ViewTrash
            | Action::UpdateTask
            | Action::DeleteTask
            | Action::RestoreTask
            | Action::PurgeTask
            | Action::CreateList
            | Action::DeleteList
            | Action::ManageShare => AccessLevel::Owner,
        }
    }
}

/// Check if an action is allowed at the given level
pub fn is_action_allowed(action: Action, level: AccessLevel) -> bool {
    level >= action.required_level()
}

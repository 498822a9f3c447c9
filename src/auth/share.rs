//! Share tokens
//!
//! A share token is a bearer capability for one list. Its first two
//! characters are a role sigil: `v_` grants the viewer role, anything else
//! (normally `e_`) grants the editor role. The token is parsed once at the
//! request boundary into a [`ShareToken`]; nothing deeper re-reads the sigil.

use serde::{Deserialize, Serialize};
use std::fmt;

const VIEWER_SIGIL: &str = "v_";
const EDITOR_SIGIL: &str = "e_";

/// Random characters following the sigil
const TOKEN_BODY_LEN: usize = 16;

/// Role granted by a share link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    Viewer,
    #[default]
    Editor,
}

impl ShareRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
        }
    }

    const fn sigil(self) -> &'static str {
        match self {
            Self::Viewer => VIEWER_SIGIL,
            Self::Editor => EDITOR_SIGIL,
        }
    }

    /// Parse the role requested when generating a link.
    ///
    /// Unknown values fall back to the editor role.
    pub fn from_request(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("viewer") => Self::Viewer,
            _ => Self::Editor,
        }
    }
}

impl fmt::Display for ShareRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A share token together with the role its sigil encodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareToken {
    value: String,
    role: ShareRole,
}

impl ShareToken {
    /// Interpret a token taken from a request path
    pub fn parse(value: &str) -> Self {
        let role = if value.starts_with(VIEWER_SIGIL) {
            ShareRole::Viewer
        } else {
            ShareRole::Editor
        };
        Self {
            value: value.to_string(),
            role,
        }
    }

    /// Mint a fresh token for the given role
    pub fn generate(role: ShareRole) -> Self {
        let body = uuid::Uuid::new_v4().simple().to_string();
        Self {
            value: format!("{}{}", role.sigil(), &body[..TOKEN_BODY_LEN]),
            role,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn role(&self) -> ShareRole {
        self.role
    }
}

//! Statement sets and lifecycle roles.

use serde::{Deserialize, Serialize};

/// Classifies which lifecycle phase a SQL template applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementRole {
    /// Create the ephemeral user
    Creation,
    /// Extend an existing user's validity
    Renewal,
    /// Strip grants and drop the user
    Revocation,
    /// Best-effort cleanup after a failed creation
    Rollback,
    /// Assign a password to an existing (static or root) user
    Rotation,
}

impl StatementRole {
    /// Lowercase label used in error messages and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creation => "creation",
            Self::Renewal => "renewal",
            Self::Revocation => "revocation",
            Self::Rollback => "rollback",
            Self::Rotation => "rotation",
        }
    }
}

impl std::fmt::Display for StatementRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered SQL statement templates, partitioned by lifecycle role.
///
/// Every sequence may be empty. An empty `creation` set is rejected at
/// create time; empty `renewal` / `revocation` sets select the backend's
/// built-in defaults; an empty `rotation` set is rejected when assigning
/// static credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Statements {
    /// Templates executed by `create_user`
    pub creation: Vec<String>,
    /// Templates executed by `renew_user`
    pub renewal: Vec<String>,
    /// Templates executed by `revoke_user`
    pub revocation: Vec<String>,
    /// Templates executed after a failed creation, best-effort
    pub rollback: Vec<String>,
    /// Templates executed by `set_credentials` and `rotate_root_credentials`
    pub rotation: Vec<String>,
}

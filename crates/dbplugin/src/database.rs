//! The host-facing plugin seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::secure::SecureString;
use crate::statements::Statements;

/// Inputs used only to build a generated username; never persisted beyond
/// one `create_user` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsernameConfig {
    /// Human-readable requester identity, e.g. a token display name
    pub display_name: String,
    /// Role the credential is issued for
    pub role_name: String,
}

/// Target identity for static credential assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticUserConfig {
    /// Existing database user to assign the password to
    pub username: String,
    /// Password to assign
    pub password: SecureString,
}

/// A dynamic-credential database backend.
///
/// One value serves one configured database connection; the host calls it
/// concurrently from many leases. Configuration crosses this boundary as
/// loose JSON maps (what a host RPC layer marshals) and comes back resolved
/// so the host can persist it.
///
/// Cancellation is the caller's: every operation is a future, and dropping
/// it aborts the in-flight round-trip; an un-committed transaction rolls
/// back when its connection returns to the pool.
#[async_trait]
pub trait Database: Send + Sync {
    /// Backend type tag, e.g. `"redshift"`.
    fn db_type(&self) -> &'static str;

    /// Decode and store configuration, open the connection, optionally
    /// verify liveness. Returns the resolved configuration for persistence.
    async fn init(&self, config: Value, verify_connection: bool) -> Result<Value>;

    /// Create an ephemeral user valid until `expiration`. Returns the
    /// generated `(username, password)`.
    async fn create_user(
        &self,
        statements: &Statements,
        username_config: &UsernameConfig,
        expiration: DateTime<Utc>,
    ) -> Result<(String, String)>;

    /// Extend an existing user's validity. Never regenerates the password.
    async fn renew_user(
        &self,
        statements: &Statements,
        username: &str,
        expiration: DateTime<Utc>,
    ) -> Result<()>;

    /// Strip the user's grants and drop it. Succeeds when the user is
    /// already absent.
    async fn revoke_user(&self, statements: &Statements, username: &str) -> Result<()>;

    /// Rotate the root credential this backend connects with. On success
    /// the returned configuration carries the new password and must be
    /// persisted by the host; on failure the stored configuration is
    /// untouched so a retry can reuse the old credential.
    async fn rotate_root_credentials(&self, statements: &Statements) -> Result<Value>;

    /// Assign a caller-chosen password to an existing static user. Returns
    /// the `(username, password)` pair that is now live.
    async fn set_credentials(
        &self,
        statements: &Statements,
        static_config: &StaticUserConfig,
    ) -> Result<(String, String)>;

    /// Release the connection. Idempotent; safe when never initialized.
    async fn close(&self);
}

//! Error types shared by all database backends.

use thiserror::Error;

use crate::statements::StatementRole;

/// Errors surfaced by plugin lifecycle operations.
///
/// Driver errors are wrapped with the failing statement's role for
/// diagnosability but never swallowed: the `source` chain always carries the
/// original [`sqlx::Error`] for the host to inspect.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Missing or invalid statements/configuration. Fatal to the call; the
    /// host should not retry without changing its input.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What was missing or invalid
        reason: String,
    },

    /// The backend could not be reached or a pooled connection could not be
    /// acquired. The host may retry `init` with corrected settings.
    #[error("database connection failed: {source}")]
    Connection {
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },

    /// A statement failed mid-operation; the surrounding transaction was
    /// rolled back and no partial state remains visible.
    #[error("{role} statement {index} failed: {source}")]
    Statement {
        /// Lifecycle role of the failing statement
        role: StatementRole,
        /// Zero-based position within the expanded statement sequence
        index: usize,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },

    /// The connection URL was empty or unparseable after credential
    /// substitution.
    #[error("invalid connection URL: {reason}")]
    InvalidConnectionUrl {
        /// Why the URL was rejected
        reason: String,
    },
}

impl PluginError {
    /// Shorthand for [`PluginError::Configuration`].
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = PluginError::configuration("creation statements are required");
        assert_eq!(
            err.to_string(),
            "configuration error: creation statements are required"
        );
    }

    #[test]
    fn test_statement_display_carries_role_and_index() {
        let err = PluginError::Statement {
            role: StatementRole::Revocation,
            index: 2,
            source: sqlx::Error::PoolClosed,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("revocation"));
        assert!(rendered.contains("statement 2"));
    }

    #[test]
    fn test_invalid_url_display() {
        let err = PluginError::InvalidConnectionUrl {
            reason: "resolved to an empty DSN".to_string(),
        };
        assert!(err.to_string().contains("invalid connection URL"));
    }
}

//! The Redshift credential lifecycle engine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use umbra_dbplugin::{
    Database, PluginError, Result, SecureString, StatementRole, Statements, StaticUserConfig,
    UsernameConfig, credentials, txn,
};

use crate::connection::ConnectionManager;

/// Layout for the `{{expiration}}` token, e.g. `2026-08-06 17:00:00+0000`.
const EXPIRATION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Built-in renewal when no renewal statements are configured.
const DEFAULT_RENEW_SQL: &str = r#"
ALTER USER "{{name}}" VALID UNTIL '{{expiration}}';
"#;

/// Built-in root rotation when no rotation statements are supplied.
const DEFAULT_ROTATE_ROOT_SQL: &str = r#"
ALTER USER "{{username}}" WITH PASSWORD '{{password}}';
"#;

/// Built-in revocation sequence: strip grants, then drop.
const DEFAULT_REVOKE_SQL: &str = r#"
REVOKE ALL PRIVILEGES ON ALL TABLES IN SCHEMA public FROM "{{name}}";
REVOKE USAGE ON SCHEMA public FROM "{{name}}";
DROP USER IF EXISTS "{{name}}";
"#;

/// SQLSTATE `undefined_object`: the user vanished mid-sequence.
const UNDEFINED_OBJECT: &str = "42704";

/// Dynamic-credential engine for Redshift/PostgreSQL-compatible clusters.
///
/// One value per configured connection; safe to share across concurrent
/// lifecycle calls. Each operation runs its statements in its own
/// transaction, so isolation between concurrent calls is the backend's
/// transaction isolation, nothing weaker.
pub struct Redshift {
    connection: ConnectionManager,
}

impl Redshift {
    pub fn new() -> Self {
        Self {
            connection: ConnectionManager::new(),
        }
    }

    /// One transaction over the expanded statements: commit on success,
    /// roll back on the first failure.
    async fn execute_in_transaction(
        &self,
        role: StatementRole,
        templates: &[String],
        values: &HashMap<&str, String>,
    ) -> Result<()> {
        let pool = self.connection.connection().await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(|source| PluginError::Connection { source })?;
        txn::execute_templated(&mut tx, role, templates, values).await?;
        tx.commit()
            .await
            .map_err(|source| PluginError::Connection { source })
    }

    /// Best-effort cleanup after a failed creation. Failures here are only
    /// logged; they never mask the creation error.
    async fn run_rollback_statements(
        &self,
        pool: &PgPool,
        statements: &Statements,
        username: &str,
    ) {
        if statements.rollback.is_empty() {
            return;
        }
        let mut values = HashMap::new();
        values.insert("name", username.to_string());

        let outcome = async {
            let mut tx = pool
                .begin()
                .await
                .map_err(|source| PluginError::Connection { source })?;
            txn::execute_templated(&mut tx, StatementRole::Rollback, &statements.rollback, &values)
                .await?;
            tx.commit()
                .await
                .map_err(|source| PluginError::Connection { source })
        }
        .await;

        if let Err(error) = outcome {
            warn!(username = %username, error = %error, "rollback statements failed after aborted creation");
        }
    }

    /// Built-in revocation. An absent user is success (the desired end
    /// state already holds), and so is a user dropped concurrently
    /// mid-sequence.
    async fn default_revoke(&self, username: &str) -> Result<()> {
        let pool = self.connection.connection().await?;
        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM pg_user WHERE usename = $1")
            .bind(username)
            .fetch_optional(&pool)
            .await
            .map_err(|source| PluginError::Connection { source })?
            .is_some();
        if !exists {
            debug!(username = %username, "user already absent, nothing to revoke");
            return Ok(());
        }

        let mut values = HashMap::new();
        values.insert("name", username.to_string());
        let templates = [DEFAULT_REVOKE_SQL.to_string()];
        match self
            .execute_in_transaction(StatementRole::Revocation, &templates, &values)
            .await
        {
            Err(PluginError::Statement { source, .. }) if is_undefined_object(&source) => Ok(()),
            other => other,
        }
    }
}

impl Default for Redshift {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Database for Redshift {
    fn db_type(&self) -> &'static str {
        "redshift"
    }

    async fn init(&self, config: Value, verify_connection: bool) -> Result<Value> {
        let resolved = self.connection.init(config, verify_connection).await?;
        resolved.to_value()
    }

    async fn create_user(
        &self,
        statements: &Statements,
        username_config: &UsernameConfig,
        expiration: DateTime<Utc>,
    ) -> Result<(String, String)> {
        if statements.creation.is_empty() {
            return Err(PluginError::configuration(
                "creation statements are required",
            ));
        }

        let username = credentials::generate_username(
            &username_config.display_name,
            &username_config.role_name,
        );
        let password = credentials::generate_password();

        let mut values = HashMap::new();
        values.insert("name", username.clone());
        values.insert("password", password.clone());
        values.insert("expiration", expiration.format(EXPIRATION_FORMAT).to_string());

        let pool = self.connection.connection().await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(|source| PluginError::Connection { source })?;
        if let Err(err) =
            txn::execute_templated(&mut tx, StatementRole::Creation, &statements.creation, &values)
                .await
        {
            // dropping the transaction rolls it back; no partial user remains
            drop(tx);
            self.run_rollback_statements(&pool, statements, &username)
                .await;
            return Err(err);
        }
        tx.commit()
            .await
            .map_err(|source| PluginError::Connection { source })?;

        info!(username = %username, "database user created");
        Ok((username, password))
    }

    async fn renew_user(
        &self,
        statements: &Statements,
        username: &str,
        expiration: DateTime<Utc>,
    ) -> Result<()> {
        let templates = if statements.renewal.is_empty() {
            vec![DEFAULT_RENEW_SQL.to_string()]
        } else {
            statements.renewal.clone()
        };

        let mut values = HashMap::new();
        values.insert("name", username.to_string());
        values.insert("expiration", expiration.format(EXPIRATION_FORMAT).to_string());

        self.execute_in_transaction(StatementRole::Renewal, &templates, &values)
            .await?;
        info!(username = %username, "database user renewed");
        Ok(())
    }

    async fn revoke_user(&self, statements: &Statements, username: &str) -> Result<()> {
        if statements.revocation.is_empty() {
            self.default_revoke(username).await?;
        } else {
            let mut values = HashMap::new();
            values.insert("name", username.to_string());
            self.execute_in_transaction(StatementRole::Revocation, &statements.revocation, &values)
                .await?;
        }
        info!(username = %username, "database user revoked");
        Ok(())
    }

    async fn rotate_root_credentials(&self, statements: &Statements) -> Result<Value> {
        let Some(config) = self.connection.stored_config().await else {
            return Err(PluginError::configuration(
                "connection manager is not initialized",
            ));
        };
        if config.username.is_empty() {
            return Err(PluginError::configuration(
                "root rotation requires a configured username",
            ));
        }

        let password = credentials::generate_password();
        let templates = if statements.rotation.is_empty() {
            vec![DEFAULT_ROTATE_ROOT_SQL.to_string()]
        } else {
            statements.rotation.clone()
        };

        let mut values = HashMap::new();
        values.insert("username", config.username.clone());
        values.insert("name", config.username.clone());
        values.insert("password", password.clone());

        self.execute_in_transaction(StatementRole::Rotation, &templates, &values)
            .await?;

        // only after the database accepted the new password does the stored
        // config change; a failure above leaves the old credential in place
        let updated = self
            .connection
            .replace_root_password(SecureString::new(password))
            .await?;
        info!(username = %config.username, "root credentials rotated");
        updated.to_value()
    }

    async fn set_credentials(
        &self,
        statements: &Statements,
        static_config: &StaticUserConfig,
    ) -> Result<(String, String)> {
        if statements.rotation.is_empty() {
            return Err(PluginError::configuration(
                "rotation statements are required",
            ));
        }

        let username = static_config.username.clone();
        let password = static_config.password.expose().to_string();

        let mut values = HashMap::new();
        values.insert("name", username.clone());
        values.insert("password", password.clone());

        self.execute_in_transaction(StatementRole::Rotation, &statements.rotation, &values)
            .await?;
        info!(username = %username, "static credentials assigned");
        Ok((username, password))
    }

    async fn close(&self) {
        self.connection.close().await;
    }
}

fn is_undefined_object(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNDEFINED_OBJECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_user_requires_creation_statements() {
        let db = Redshift::new();
        let result = db
            .create_user(
                &Statements::default(),
                &UsernameConfig {
                    display_name: "test".to_string(),
                    role_name: "test".to_string(),
                },
                Utc::now() + chrono::Duration::seconds(60),
            )
            .await;
        // rejected before any connection is acquired; no config was ever set
        assert!(matches!(result, Err(PluginError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_set_credentials_requires_rotation_statements() {
        let db = Redshift::new();
        let result = db
            .set_credentials(
                &Statements::default(),
                &StaticUserConfig {
                    username: "statictest".to_string(),
                    password: SecureString::new("A1a-password"),
                },
            )
            .await;
        assert!(matches!(result, Err(PluginError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_rotate_root_requires_initialization() {
        let db = Redshift::new();
        let result = db.rotate_root_credentials(&Statements::default()).await;
        assert!(matches!(result, Err(PluginError::Configuration { .. })));
    }

    #[test]
    fn test_default_statements_carry_documented_tokens() {
        assert!(DEFAULT_RENEW_SQL.contains("{{name}}"));
        assert!(DEFAULT_RENEW_SQL.contains("{{expiration}}"));
        assert!(DEFAULT_ROTATE_ROOT_SQL.contains("{{username}}"));
        assert!(DEFAULT_ROTATE_ROOT_SQL.contains("{{password}}"));
        assert!(DEFAULT_REVOKE_SQL.contains("DROP USER IF EXISTS"));
    }

    #[test]
    fn test_expiration_format_round_trips_through_display() {
        let expiration = Utc::now();
        let rendered = expiration.format(EXPIRATION_FORMAT).to_string();
        // `YYYY-MM-DD HH:MM:SS+ZZZZ`
        assert_eq!(rendered.len(), 24);
        assert!(rendered.ends_with("+0000"));
    }
}

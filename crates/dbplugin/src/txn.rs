//! Transactional execution of templated statements.

use std::collections::HashMap;

use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::error::{PluginError, Result};
use crate::statements::StatementRole;
use crate::template;

/// Expands each template with `values` and executes every non-empty segment
/// on `tx`, in order.
///
/// The first failure aborts immediately, labelled with `role` and the
/// segment's position; the caller owns the rollback (dropping the
/// transaction rolls it back). Statement text is never logged since it can
/// embed passwords.
pub async fn execute_templated(
    tx: &mut Transaction<'_, Postgres>,
    role: StatementRole,
    templates: &[String],
    values: &HashMap<&str, String>,
) -> Result<()> {
    let mut index = 0;
    for raw in templates {
        let expanded = template::expand(raw, values);
        for statement in template::split(&expanded) {
            sqlx::query(statement)
                .execute(&mut **tx)
                .await
                .map_err(|source| PluginError::Statement {
                    role,
                    index,
                    source,
                })?;
            debug!(role = %role, index, "statement executed");
            index += 1;
        }
    }
    Ok(())
}

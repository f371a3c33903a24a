//! Lazy table provisioning with existence caching.

use std::collections::HashSet;

use parking_lot::RwLock;
use sqlx::PgPool;

use crate::adapter::BackendKind;
use crate::error::AdapterError;
use crate::Result;

/// SQL type suffix shared by every provisioned table.
///
/// Both translators assume exactly this layout: synthetic identity, opaque
/// JSONB payload, and column-level timestamps that never appear inside the
/// payload itself.
const TABLE_COLUMNS: &str = "(
    id          BIGSERIAL PRIMARY KEY,
    data        JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// Validate a collection name and quote it as a SQL identifier.
///
/// Identifiers cannot be bound as parameters, so anything outside the safe
/// character set is rejected before it reaches the SQL text.
pub fn quote_ident(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(AdapterError::Translation(format!(
            "invalid collection name '{}'",
            name
        )))
    }
}

/// Guarantees a table exists before CRUD touches it, without re-querying the
/// catalog on every call.
///
/// The known-name set is local to one adapter instance; out-of-band schema
/// changes are only noticed on the next drop/create through this adapter.
pub struct TableProvisioner {
    known: RwLock<HashSet<String>>,
}

impl TableProvisioner {
    pub fn new() -> Self {
        Self {
            known: RwLock::new(HashSet::new()),
        }
    }

    /// Forget every cached name (called on disconnect).
    pub fn clear(&self) {
        self.known.write().clear();
    }

    /// True when the table is already known to exist, without touching the
    /// backend.
    pub fn is_known(&self, name: &str) -> bool {
        self.known.read().contains(name)
    }

    async fn exists_in_catalog(&self, pool: &PgPool, name: &str) -> Result<bool> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = current_schema() AND table_name = $1
            )",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AdapterError::operation(BackendKind::Postgres, "createCollection", name, e)
        })?;
        Ok(row.0)
    }

    /// Ensure the table exists, creating it with the default layout on a
    /// cache miss.
    pub async fn ensure(&self, pool: &PgPool, name: &str) -> Result<()> {
        if self.is_known(name) {
            return Ok(());
        }

        let ident = quote_ident(name)?;
        if !self.exists_in_catalog(pool, name).await? {
            tracing::debug!(table = name, "provisioning table");
            sqlx::query(&format!("CREATE TABLE IF NOT EXISTS {} {}", ident, TABLE_COLUMNS))
                .execute(pool)
                .await
                .map_err(|e| {
                    AdapterError::operation(BackendKind::Postgres, "createCollection", name, e)
                })?;
        }

        self.known.write().insert(name.to_string());
        Ok(())
    }

    /// Drop the table. Returns `true` only when the table actually existed;
    /// the cache entry is evicted either way.
    pub async fn drop(&self, pool: &PgPool, name: &str) -> Result<bool> {
        self.known.write().remove(name);

        let ident = quote_ident(name)?;
        if !self.exists_in_catalog(pool, name).await? {
            return Ok(false);
        }

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", ident))
            .execute(pool)
            .await
            .map_err(|e| {
                AdapterError::operation(BackendKind::Postgres, "dropCollection", name, e)
            })?;
        Ok(true)
    }
}

impl Default for TableProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_accepts_safe_names() {
        assert_eq!(quote_ident("users").unwrap(), "\"users\"");
        assert_eq!(quote_ident("_bench_01").unwrap(), "\"_bench_01\"");
    }

    #[test]
    fn test_quote_ident_rejects_unsafe_names() {
        assert!(quote_ident("").is_err());
        assert!(quote_ident("1users").is_err());
        assert!(quote_ident("users; DROP TABLE x").is_err());
        assert!(quote_ident("us\"ers").is_err());
    }

    #[test]
    fn test_cache_tracks_names_locally() {
        let provisioner = TableProvisioner::new();
        assert!(!provisioner.is_known("users"));

        provisioner.known.write().insert("users".to_string());
        assert!(provisioner.is_known("users"));

        provisioner.clear();
        assert!(!provisioner.is_known("users"));
    }
}

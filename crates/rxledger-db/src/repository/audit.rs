//! # Audit Log Repository
//!
//! The append-only compliance trail.
//!
//! ## Append-Only Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Audit Log Guarantees                               │
//! │                                                                         │
//! │  WRITE PATH                                                            │
//! │  └── append_entry() - INSERT only, callable inside the ledger          │
//! │                       transaction so the audit record commits or       │
//! │                       rolls back with the transaction it describes     │
//! │                                                                         │
//! │  READ PATH                                                             │
//! │  └── list()/count() - newest first, optional entityType filter         │
//! │                                                                         │
//! │  There is NO update and NO delete. Not here, not anywhere.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `details` is stored as a JSON text column; its shape varies per action
//! code and is decoded as loosely-typed JSON on the way out.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use rxledger_core::{AuditLogEntry, AuditLogFilter, AuditLogView, PageParams, UserSummary};

/// Inserts one audit entry using any SQLite executor.
///
/// Generic over the executor so the ledger can call it with its open
/// transaction, making the audit append part of the same atomic unit.
pub async fn append_entry<'e, E>(executor: E, entry: &AuditLogEntry) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let details = serde_json::to_string(&entry.details)
        .map_err(|e| DbError::Internal(format!("audit details not serializable: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO audit_log (
            id, action, entity_type, entity_id, performed_by_id,
            details, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.action)
    .bind(&entry.entity_type)
    .bind(&entry.entity_id)
    .bind(&entry.performed_by_id)
    .bind(details)
    .bind(entry.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Repository for reading the audit trail.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends an entry outside any surrounding transaction.
    pub async fn append(&self, entry: &AuditLogEntry) -> DbResult<()> {
        append_entry(&self.pool, entry).await
    }

    /// Lists audit entries for one page, newest first, with the performing
    /// user joined in.
    pub async fn list(
        &self,
        filter: &AuditLogFilter,
        params: PageParams,
    ) -> DbResult<Vec<AuditLogView>> {
        debug!(?filter, page = params.page, limit = params.limit, "Listing audit log");

        let limit = params.limit as i64;
        let offset = params.offset();

        let rows = match filter.entity_type.as_deref() {
            Some(entity_type) => {
                sqlx::query(
                    r#"
                    SELECT a.id, a.action, a.entity_type, a.entity_id,
                           a.performed_by_id, a.details, a.created_at,
                           u.id AS u_id, u.name AS u_name, u.email AS u_email
                    FROM audit_log a
                    INNER JOIN users u ON u.id = a.performed_by_id
                    WHERE a.entity_type = ?1
                    ORDER BY a.created_at DESC, a.id DESC
                    LIMIT ?2 OFFSET ?3
                    "#,
                )
                .bind(entity_type)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT a.id, a.action, a.entity_type, a.entity_id,
                           a.performed_by_id, a.details, a.created_at,
                           u.id AS u_id, u.name AS u_name, u.email AS u_email
                    FROM audit_log a
                    INNER JOIN users u ON u.id = a.performed_by_id
                    ORDER BY a.created_at DESC, a.id DESC
                    LIMIT ?1 OFFSET ?2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(view_from_row).collect()
    }

    /// Counts audit entries matching the same filter as [`Self::list`].
    pub async fn count(&self, filter: &AuditLogFilter) -> DbResult<i64> {
        let count: i64 = match filter.entity_type.as_deref() {
            Some(entity_type) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM audit_log WHERE entity_type = ?1")
                    .bind(entity_type)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count)
    }
}

/// Maps a joined row to an AuditLogView.
///
/// Manual mapping because `details` is a JSON text column.
fn view_from_row(row: &SqliteRow) -> DbResult<AuditLogView> {
    let details_raw: String = row.try_get("details")?;
    let details = serde_json::from_str(&details_raw)
        .map_err(|e| DbError::Internal(format!("stored audit details not valid JSON: {e}")))?;

    Ok(AuditLogView {
        entry: AuditLogEntry {
            id: row.try_get("id")?,
            action: row.try_get("action")?,
            entity_type: row.try_get("entity_type")?,
            entity_id: row.try_get("entity_id")?,
            performed_by_id: row.try_get("performed_by_id")?,
            details,
            created_at: row.try_get("created_at")?,
        },
        performed_by: UserSummary {
            id: row.try_get("u_id")?,
            name: row.try_get("u_name")?,
            email: row.try_get("u_email")?,
        },
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

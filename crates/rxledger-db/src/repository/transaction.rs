//! # Transaction Repository
//!
//! The stock ledger: chain-of-custody transaction processing.
//!
//! ## The Atomic Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 create() - All or Nothing                               │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    │                                                                    │
//! │    ├── 1. Load medication        ── missing? → MedicationNotFound      │
//! │    ├── 2. Load nurse             ── missing? → NurseNotFound           │
//! │    ├── 3. Load witness           ── missing? → WitnessNotFound         │
//! │    │                                                                    │
//! │    ├── 4. CHECKOUT? stock check  ── short?   → InsufficientStock       │
//! │    │                                                                    │
//! │    ├── 5. Move the counter                                             │
//! │    │      CHECKOUT: UPDATE ... SET stock_quantity = stock_quantity - q │
//! │    │                WHERE id = ? AND stock_quantity >= q  ← guarded    │
//! │    │      RETURN:   UPDATE ... SET stock_quantity = stock_quantity + q │
//! │    │      WASTE:    (counter untouched)                                │
//! │    │                                                                    │
//! │    ├── 6. INSERT transaction row                                       │
//! │    └── 7. INSERT audit entry (point-in-time snapshot)                  │
//! │    │                                                                    │
//! │  COMMIT ── any failure above rolls the whole unit back                 │
//! │                                                                         │
//! │  Partial states cannot exist: no stock move without its record, no     │
//! │  record without its audit entry.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::audit::append_entry;
use rxledger_core::{
    AuditLogEntry, CoreError, CreateTransaction, Medication, PageParams, Transaction,
    TransactionFilter, TransactionType, TransactionView, TransactionWithActors, UserSummary,
};

/// Repository for transaction processing and listing.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Processes one chain-of-custody transaction atomically.
    ///
    /// Takes a validated command; entity existence, the stock invariant,
    /// the counter mutation, the transaction record, and the audit entry
    /// are all resolved under a single database transaction.
    ///
    /// ## Returns
    /// The created transaction joined with the (post-mutation) medication
    /// and both actor summaries, matching what the API responds with.
    ///
    /// ## Errors
    /// * `CoreError::MedicationNotFound` / `NurseNotFound` / `WitnessNotFound`
    /// * `CoreError::InsufficientStock` - CHECKOUT would drive stock negative
    /// * `DbError::StockConflict` - the guarded UPDATE matched nothing
    pub async fn create(&self, cmd: &CreateTransaction) -> DbResult<TransactionView> {
        debug!(
            medication_id = %cmd.medication_id,
            kind = %cmd.kind,
            quantity = cmd.quantity,
            "Processing transaction"
        );

        let mut tx = self.pool.begin().await?;

        // Entity lookup gate, under the same transaction that mutates.
        let mut medication = sqlx::query_as::<_, Medication>(
            r#"
            SELECT id, name, schedule, unit, stock_quantity, slug,
                   created_at, updated_at
            FROM medications
            WHERE id = ?1
            "#,
        )
        .bind(&cmd.medication_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::MedicationNotFound)?;

        let nurse = fetch_summary(&mut tx, &cmd.nurse_id)
            .await?
            .ok_or(CoreError::NurseNotFound)?;
        let witness = fetch_summary(&mut tx, &cmd.witness_id)
            .await?
            .ok_or(CoreError::WitnessNotFound)?;

        // Stock invariant: rejected up front, never clamped.
        if cmd.kind == TransactionType::Checkout && medication.stock_quantity < cmd.quantity {
            return Err(CoreError::InsufficientStock {
                available: medication.stock_quantity,
                unit: medication.unit,
                requested: cmd.quantity,
            }
            .into());
        }

        let now = Utc::now();

        match cmd.kind {
            TransactionType::Checkout => {
                // Guard repeats the invariant at the UPDATE itself; a zero
                // row count means the counter moved underneath us.
                let result = sqlx::query(
                    r#"
                    UPDATE medications
                    SET stock_quantity = stock_quantity - ?2, updated_at = ?3
                    WHERE id = ?1 AND stock_quantity >= ?2
                    "#,
                )
                .bind(&cmd.medication_id)
                .bind(cmd.quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(DbError::StockConflict);
                }

                medication.stock_quantity -= cmd.quantity;
                medication.updated_at = now;
            }
            TransactionType::Return => {
                sqlx::query(
                    r#"
                    UPDATE medications
                    SET stock_quantity = stock_quantity + ?2, updated_at = ?3
                    WHERE id = ?1
                    "#,
                )
                .bind(&cmd.medication_id)
                .bind(cmd.quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                medication.stock_quantity += cmd.quantity;
                medication.updated_at = now;
            }
            // WASTE documents disposal of already-checked-out stock
            TransactionType::Waste => {}
        }

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            medication_id: cmd.medication_id.clone(),
            nurse_id: cmd.nurse_id.clone(),
            witness_id: cmd.witness_id.clone(),
            kind: cmd.kind,
            quantity: cmd.quantity,
            notes: cmd.notes.clone(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, medication_id, nurse_id, witness_id, type, quantity,
                notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.medication_id)
        .bind(&transaction.nurse_id)
        .bind(&transaction.witness_id)
        .bind(transaction.kind)
        .bind(transaction.quantity)
        .bind(&transaction.notes)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        // Point-in-time snapshot: medication name and unit are captured at
        // call time, so later renames never rewrite audit history.
        let audit = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            action: cmd.kind.audit_action().to_string(),
            entity_type: "Transaction".to_string(),
            entity_id: transaction.id.clone(),
            performed_by_id: cmd.nurse_id.clone(),
            details: serde_json::json!({
                "transactionType": cmd.kind,
                "medicationId": cmd.medication_id,
                "medicationName": medication.name,
                "quantity": cmd.quantity,
                "unit": medication.unit,
                "witnessId": cmd.witness_id,
                "notes": cmd.notes,
            }),
            created_at: now,
        };
        append_entry(&mut *tx, &audit).await?;

        tx.commit().await?;

        debug!(id = %transaction.id, "Transaction committed");

        Ok(TransactionView {
            transaction,
            medication,
            nurse,
            witness,
        })
    }

    /// Lists transactions for one page, newest first, with medication and
    /// both actors joined in.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        params: PageParams,
    ) -> DbResult<Vec<TransactionView>> {
        debug!(?filter, page = params.page, limit = params.limit, "Listing transactions");

        let (where_clause, binds) = filter_clause(filter);
        let sql = format!(
            r#"
            SELECT t.id, t.medication_id, t.nurse_id, t.witness_id, t.type,
                   t.quantity, t.notes, t.created_at,
                   m.id AS m_id, m.name AS m_name, m.schedule AS m_schedule,
                   m.unit AS m_unit, m.stock_quantity AS m_stock_quantity,
                   m.slug AS m_slug, m.created_at AS m_created_at,
                   m.updated_at AS m_updated_at,
                   n.id AS n_id, n.name AS n_name, n.email AS n_email,
                   w.id AS w_id, w.name AS w_name, w.email AS w_email
            FROM transactions t
            INNER JOIN medications m ON m.id = t.medication_id
            INNER JOIN users n ON n.id = t.nurse_id
            INNER JOIN users w ON w.id = t.witness_id
            {where_clause}
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT ? OFFSET ?
            "#
        );

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query
            .bind(params.limit as i64)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(view_from_row).collect()
    }

    /// Counts transactions matching the same filter as [`Self::list`].
    pub async fn count(&self, filter: &TransactionFilter) -> DbResult<i64> {
        let (where_clause, binds) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM transactions t {where_clause}");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    /// Full transaction history for one medication, newest first, with both
    /// actors joined in. Used by the medication detail endpoint.
    pub async fn list_for_medication(
        &self,
        medication_id: &str,
    ) -> DbResult<Vec<TransactionWithActors>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.medication_id, t.nurse_id, t.witness_id, t.type,
                   t.quantity, t.notes, t.created_at,
                   n.id AS n_id, n.name AS n_name, n.email AS n_email,
                   w.id AS w_id, w.name AS w_name, w.email AS w_email
            FROM transactions t
            INNER JOIN users n ON n.id = t.nurse_id
            INNER JOIN users w ON w.id = t.witness_id
            WHERE t.medication_id = ?1
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .bind(medication_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(with_actors_from_row).collect()
    }
}

/// Looks up a user's join-safe projection inside the ledger transaction.
async fn fetch_summary(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: &str,
) -> DbResult<Option<UserSummary>> {
    let summary =
        sqlx::query_as::<_, UserSummary>("SELECT id, name, email FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

    Ok(summary)
}

/// Builds the WHERE clause and bind list for transaction filters.
fn filter_clause(filter: &TransactionFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(kind) = filter.kind {
        conditions.push("t.type = ?");
        binds.push(kind.as_str().to_string());
    }
    if let Some(medication_id) = &filter.medication_id {
        conditions.push("t.medication_id = ?");
        binds.push(medication_id.clone());
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (clause, binds)
}

/// Maps the unprefixed `t.*` columns of a joined row.
fn transaction_from_row(row: &SqliteRow) -> DbResult<Transaction> {
    Ok(Transaction {
        id: row.try_get("id")?,
        medication_id: row.try_get("medication_id")?,
        nurse_id: row.try_get("nurse_id")?,
        witness_id: row.try_get("witness_id")?,
        kind: row.try_get("type")?,
        quantity: row.try_get("quantity")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn view_from_row(row: &SqliteRow) -> DbResult<TransactionView> {
    Ok(TransactionView {
        transaction: transaction_from_row(row)?,
        medication: Medication {
            id: row.try_get("m_id")?,
            name: row.try_get("m_name")?,
            schedule: row.try_get("m_schedule")?,
            unit: row.try_get("m_unit")?,
            stock_quantity: row.try_get("m_stock_quantity")?,
            slug: row.try_get("m_slug")?,
            created_at: row.try_get("m_created_at")?,
            updated_at: row.try_get("m_updated_at")?,
        },
        nurse: UserSummary {
            id: row.try_get("n_id")?,
            name: row.try_get("n_name")?,
            email: row.try_get("n_email")?,
        },
        witness: UserSummary {
            id: row.try_get("w_id")?,
            name: row.try_get("w_name")?,
            email: row.try_get("w_email")?,
        },
    })
}

fn with_actors_from_row(row: &SqliteRow) -> DbResult<TransactionWithActors> {
    Ok(TransactionWithActors {
        transaction: transaction_from_row(row)?,
        nurse: UserSummary {
            id: row.try_get("n_id")?,
            name: row.try_get("n_name")?,
            email: row.try_get("n_email")?,
        },
        witness: UserSummary {
            id: row.try_get("w_id")?,
            name: row.try_get("w_name")?,
            email: row.try_get("w_email")?,
        },
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

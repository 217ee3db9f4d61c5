//! # Medication Repository
//!
//! Database operations for medications.
//!
//! ## Key Operations
//! - Paged listing with optional schedule filter
//! - Lookup by id (relations) and by slug (detail endpoint)
//! - Insert
//!
//! ## Stock Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Who May Touch stock_quantity                               │
//! │                                                                         │
//! │  MedicationRepository (this file)                                      │
//! │  ├── insert()  → sets the initial value only                           │
//! │  └── (no update path exists here at all)                               │
//! │                                                                         │
//! │  TransactionRepository                                                 │
//! │  └── create() → the ONLY code that moves the counter, inside a         │
//! │                 single guarded database transaction                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use rxledger_core::{CreateMedication, Medication, MedicationFilter, PageParams};

/// Repository for medication database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = MedicationRepository::new(pool);
///
/// let meds = repo.list(&filter, params).await?;
/// let med = repo.get_by_slug("morphine-sulfate").await?;
/// ```
#[derive(Debug, Clone)]
pub struct MedicationRepository {
    pool: SqlitePool,
}

impl MedicationRepository {
    /// Creates a new MedicationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MedicationRepository { pool }
    }

    /// Lists medications for one page, name ascending.
    ///
    /// ## Arguments
    /// * `filter` - Optional schedule filter
    /// * `params` - Validated pagination (page >= 1, limit <= 100)
    pub async fn list(
        &self,
        filter: &MedicationFilter,
        params: PageParams,
    ) -> DbResult<Vec<Medication>> {
        debug!(?filter, page = params.page, limit = params.limit, "Listing medications");

        let limit = params.limit as i64;
        let offset = params.offset();

        let medications = match filter.schedule {
            Some(schedule) => {
                sqlx::query_as::<_, Medication>(
                    r#"
                    SELECT id, name, schedule, unit, stock_quantity, slug,
                           created_at, updated_at
                    FROM medications
                    WHERE schedule = ?1
                    ORDER BY name ASC, id ASC
                    LIMIT ?2 OFFSET ?3
                    "#,
                )
                .bind(schedule)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Medication>(
                    r#"
                    SELECT id, name, schedule, unit, stock_quantity, slug,
                           created_at, updated_at
                    FROM medications
                    ORDER BY name ASC, id ASC
                    LIMIT ?1 OFFSET ?2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(medications)
    }

    /// Counts medications matching the same filter as [`Self::list`].
    ///
    /// A true row count: the pagination envelope must describe the full
    /// filtered set, not the page that happened to come back.
    pub async fn count(&self, filter: &MedicationFilter) -> DbResult<i64> {
        let count: i64 = match filter.schedule {
            Some(schedule) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM medications WHERE schedule = ?1")
                    .bind(schedule)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM medications")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count)
    }

    /// Gets a medication by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Medication>> {
        let medication = sqlx::query_as::<_, Medication>(
            r#"
            SELECT id, name, schedule, unit, stock_quantity, slug,
                   created_at, updated_at
            FROM medications
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(medication)
    }

    /// Gets a medication by its slug (the detail-endpoint lookup key).
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Medication>> {
        let medication = sqlx::query_as::<_, Medication>(
            r#"
            SELECT id, name, schedule, unit, stock_quantity, slug,
                   created_at, updated_at
            FROM medications
            WHERE slug = ?1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(medication)
    }

    /// Inserts a new medication.
    ///
    /// ## Returns
    /// * `Ok(Medication)` - The stored row, with generated id and timestamps
    /// * `Err(DbError::UniqueViolation)` - Slug already exists
    pub async fn insert(&self, cmd: &CreateMedication) -> DbResult<Medication> {
        debug!(slug = %cmd.slug, "Inserting medication");

        let now = Utc::now();
        let medication = Medication {
            id: Uuid::new_v4().to_string(),
            name: cmd.name.clone(),
            schedule: cmd.schedule,
            unit: cmd.unit,
            stock_quantity: cmd.stock_quantity,
            slug: cmd.slug.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO medications (
                id, name, schedule, unit, stock_quantity, slug,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&medication.id)
        .bind(&medication.name)
        .bind(medication.schedule)
        .bind(medication.unit)
        .bind(medication.stock_quantity)
        .bind(&medication.slug)
        .bind(medication.created_at)
        .bind(medication.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(medication)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use rxledger_core::{
        CreateMedication, MedicationFilter, PageParams, Schedule, Unit,
    };

    fn med(name: &str, slug: &str, schedule: Schedule) -> CreateMedication {
        CreateMedication {
            name: name.to_string(),
            schedule,
            unit: Unit::Mg,
            slug: slug.to_string(),
            stock_quantity: 100,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_slug() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.medications();

        let created = repo
            .insert(&med("Morphine Sulfate", "morphine-sulfate", Schedule::II))
            .await
            .unwrap();

        let found = repo.get_by_slug("morphine-sulfate").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.stock_quantity, 100);
        assert_eq!(found.schedule, Schedule::II);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.medications();

        repo.insert(&med("Codeine", "codeine", Schedule::III))
            .await
            .unwrap();
        let err = repo
            .insert(&med("Codeine Phosphate", "codeine", Schedule::III))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_filters_by_schedule() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.medications();

        repo.insert(&med("Diazepam", "diazepam", Schedule::IV))
            .await
            .unwrap();
        repo.insert(&med("Codeine", "codeine", Schedule::III))
            .await
            .unwrap();
        repo.insert(&med("Alprazolam", "alprazolam", Schedule::IV))
            .await
            .unwrap();

        let all = repo
            .list(&MedicationFilter::default(), PageParams::default())
            .await
            .unwrap();
        let names: Vec<&str> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Alprazolam", "Codeine", "Diazepam"]);

        let filter = MedicationFilter {
            schedule: Some(Schedule::IV),
        };
        let iv = repo.list(&filter, PageParams::default()).await.unwrap();
        assert_eq!(iv.len(), 2);
        assert_eq!(repo.count(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_ignores_pagination() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.medications();

        for i in 0..5 {
            repo.insert(&med(&format!("Med {i}"), &format!("med-{i}"), Schedule::II))
                .await
                .unwrap();
        }

        let page = repo
            .list(
                &MedicationFilter::default(),
                PageParams { page: 1, limit: 2 },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(repo.count(&MedicationFilter::default()).await.unwrap(), 5);
    }
}

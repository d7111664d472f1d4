//! # Budget Repository
//!
//! Persists priced budgets with their per-store number.
//!
//! ## Insert Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION                                    │
//! │                                                                         │
//! │  1. UPSERT budget_sequences SET last_number = last_number + 1          │
//! │     RETURNING last_number                     ← write lock taken here  │
//! │                                                                         │
//! │  2. INSERT INTO budgets (..., budget_number = "ORC-000042",            │
//! │                          input = <json>, calculation = <json>)          │
//! │                                                                         │
//! │  3. approval.required?                                                  │
//! │     └── INSERT INTO approval_requests (pending)                        │
//! │         budgets.status = pending_approval                              │
//! │                                                                         │
//! │  COMMIT ← number, budget and request appear together or not at all    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculation is stored verbatim as JSON; the scalar columns next to
//! it exist for listing and reporting only.

use chrono::{DateTime, Utc};
use orca_core::validation::validate_identifier;
use orca_core::{BudgetCalculation, BudgetInput};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::approval::{open_request, ApprovalRequest};
use crate::error::{DbError, DbResult};

/// Budget workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Priced within the vendor's own discount limit.
    Open,
    /// Waiting on a manager or admin.
    PendingApproval,
    Approved,
    Rejected,
}

/// What the caller supplies besides the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBudget {
    pub client_id: String,
    /// The request the calculation was produced from (kept for re-verification).
    pub input: BudgetInput,
}

/// A persisted budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBudget {
    pub id: String,
    pub store_id: String,
    pub sequence: i64,
    /// Human-facing number, e.g. `ORC-000042`.
    pub budget_number: String,
    pub client_id: String,
    pub status: BudgetStatus,
    pub input: BudgetInput,
    pub calculation: BudgetCalculation,
    /// Set when the insert opened an approval request.
    pub approval_request: Option<ApprovalRequest>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BudgetRow {
    id: String,
    store_id: String,
    sequence: i64,
    budget_number: String,
    client_id: String,
    status: BudgetStatus,
    input: String,
    calculation: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BudgetRow> for StoredBudget {
    type Error = DbError;

    fn try_from(row: BudgetRow) -> DbResult<Self> {
        let input =
            serde_json::from_str(&row.input).map_err(|e| DbError::invalid_data("input", e))?;
        let calculation = serde_json::from_str(&row.calculation)?;

        Ok(StoredBudget {
            id: row.id,
            store_id: row.store_id,
            sequence: row.sequence,
            budget_number: row.budget_number,
            client_id: row.client_id,
            status: row.status,
            input,
            calculation,
            approval_request: None,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BUDGET_COLUMNS: &str = r#"
    id, store_id, sequence, budget_number, client_id, status,
    input, calculation, created_at, updated_at
"#;

/// Repository for budgets.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    pool: SqlitePool,
    number_prefix: String,
}

impl BudgetRepository {
    pub fn new(pool: SqlitePool, number_prefix: impl Into<String>) -> Self {
        BudgetRepository {
            pool,
            number_prefix: number_prefix.into(),
        }
    }

    /// Stores a calculated budget under the store's next number.
    ///
    /// Opens a pending approval request in the same transaction when the
    /// calculation says approval is required.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a blank client id
    /// - `InvalidState` when the calculation was not produced from `new.input`
    pub async fn insert(
        &self,
        new: &NewBudget,
        calculation: &BudgetCalculation,
    ) -> DbResult<StoredBudget> {
        validate_identifier("client_id", &new.client_id)?;

        if calculation.store_id != new.input.store_id
            || calculation.ambient_value != new.input.ambient_value
            || calculation.discount_fraction != new.input.discount
        {
            return Err(DbError::InvalidState(
                "calculation does not belong to this budget input".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let input_json = serde_json::to_string(&new.input)?;
        let calculation_json = serde_json::to_string(calculation)?;

        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO budget_sequences (store_id, last_number) VALUES (?1, 1)
            ON CONFLICT (store_id) DO UPDATE SET last_number = last_number + 1
            RETURNING last_number
            "#,
        )
        .bind(&calculation.store_id)
        .fetch_one(&mut *tx)
        .await?;

        let budget_number = format_budget_number(&self.number_prefix, sequence);

        debug!(id = %id, budget_number = %budget_number, "Inserting budget");

        sqlx::query(
            r#"
            INSERT INTO budgets (
                id, store_id, sequence, budget_number, client_id,
                vendor_id, manager_id,
                ambient_value_cents, discount_fraction, final_value_cents,
                total_costs_cents, margin_cents, margin_percentage,
                approval_level, status,
                input, calculation, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7,
                ?8, ?9, ?10,
                ?11, ?12, ?13,
                ?14, ?15,
                ?16, ?17, ?18, ?18
            )
            "#,
        )
        .bind(&id)
        .bind(&calculation.store_id)
        .bind(sequence)
        .bind(&budget_number)
        .bind(&new.client_id)
        .bind(&calculation.vendor_id)
        .bind(&calculation.manager_id)
        .bind(calculation.ambient_value.cents())
        .bind(calculation.discount_fraction.to_string())
        .bind(calculation.final_value.cents())
        .bind(calculation.costs.total_costs.cents())
        .bind(calculation.margin.cents())
        .bind(calculation.margin_percentage.to_string())
        .bind(calculation.approval.level)
        .bind(BudgetStatus::Open)
        .bind(&input_json)
        .bind(&calculation_json)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let approval_request = if calculation.approval.required {
            Some(open_request(&mut *tx, &id, calculation.approval.level).await?)
        } else {
            None
        };

        tx.commit().await?;

        info!(
            id = %id,
            budget_number = %budget_number,
            store_id = %calculation.store_id,
            approval = %calculation.approval.level,
            "Budget stored"
        );

        Ok(StoredBudget {
            id,
            store_id: calculation.store_id.clone(),
            sequence,
            budget_number,
            client_id: new.client_id.clone(),
            status: if approval_request.is_some() {
                BudgetStatus::PendingApproval
            } else {
                BudgetStatus::Open
            },
            input: new.input.clone(),
            calculation: calculation.clone(),
            approval_request,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a budget by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StoredBudget>> {
        let row: Option<BudgetRow> =
            sqlx::query_as(&format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(StoredBudget::try_from).transpose()
    }

    /// Lists a store's budgets, newest number first.
    pub async fn list_by_store(&self, store_id: &str, limit: u32) -> DbResult<Vec<StoredBudget>> {
        let rows: Vec<BudgetRow> = sqlx::query_as(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE store_id = ?1 ORDER BY sequence DESC LIMIT ?2"
        ))
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredBudget::try_from).collect()
    }

    /// Counts a store's budgets.
    pub async fn count_by_store(&self, store_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM budgets WHERE store_id = ?1")
            .bind(store_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Renders `{prefix}-{sequence:06}`, e.g. `ORC-000042`.
pub fn format_budget_number(prefix: &str, sequence: i64) -> String {
    format!("{prefix}-{sequence:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use orca_core::{BudgetEngine, Money, PricingContext, Rate};

    fn input(store_id: &str, discount_bps: u32) -> BudgetInput {
        BudgetInput {
            store_id: store_id.to_string(),
            vendor_id: "vendedor-7".to_string(),
            manager_id: "gerente-2".to_string(),
            ambient_value: Money::from_major_minor(30_000, 0),
            discount: Rate::from_bps(discount_bps),
            additional_costs: vec![],
            measurer_cost: None,
            assembly_cost: None,
        }
    }

    async fn store(db: &Database, client: &str, input: BudgetInput) -> StoredBudget {
        let calculation = BudgetEngine::default()
            .calculate(&input, &PricingContext::default())
            .unwrap();
        db.budgets()
            .insert(
                &NewBudget {
                    client_id: client.to_string(),
                    input,
                },
                &calculation,
            )
            .await
            .unwrap()
    }

    #[test]
    fn test_format_budget_number() {
        assert_eq!(format_budget_number("ORC", 1), "ORC-000001");
        assert_eq!(format_budget_number("SP", 1_234_567), "SP-1234567");
    }

    #[tokio::test]
    async fn test_numbers_are_sequential_per_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let a1 = store(&db, "cliente-1", input("loja-a", 0)).await;
        let a2 = store(&db, "cliente-2", input("loja-a", 0)).await;
        let b1 = store(&db, "cliente-3", input("loja-b", 0)).await;
        let a3 = store(&db, "cliente-1", input("loja-a", 0)).await;

        assert_eq!(a1.budget_number, "ORC-000001");
        assert_eq!(a2.budget_number, "ORC-000002");
        assert_eq!(a3.budget_number, "ORC-000003");
        assert_eq!(b1.budget_number, "ORC-000001");
        assert_eq!(db.budgets().count_by_store("loja-a").await.unwrap(), 3);

        let listed: Vec<i64> = db
            .budgets()
            .list_by_store("loja-a", 10)
            .await
            .unwrap()
            .iter()
            .map(|b| b.sequence)
            .collect();
        assert_eq!(listed, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_configured_prefix() {
        let db = Database::new(DbConfig::in_memory().budget_number_prefix("SP"))
            .await
            .unwrap();
        let stored = store(&db, "cliente-1", input("loja-a", 0)).await;
        assert_eq!(stored.budget_number, "SP-000001");
    }

    #[tokio::test]
    async fn test_snapshot_stored_verbatim() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stored = store(&db, "cliente-1", input("loja-a", 500)).await;

        let loaded = db.budgets().get_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.calculation, stored.calculation);
        assert_eq!(loaded.input, stored.input);
        assert_eq!(loaded.status, BudgetStatus::Open);
        assert!(stored.approval_request.is_none());

        assert!(db.budgets().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_discount_above_vendor_limit_opens_request() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // default limits: vendor 10%, manager 20%
        let stored = store(&db, "cliente-1", input("loja-a", 1500)).await;

        assert_eq!(stored.status, BudgetStatus::PendingApproval);
        let request = stored.approval_request.unwrap();
        assert_eq!(request.level, orca_core::ApprovalLevel::Manager);

        let loaded = db.budgets().get_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, BudgetStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_mismatched_calculation_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let calculation = BudgetEngine::default()
            .calculate(&input("loja-a", 0), &PricingContext::default())
            .unwrap();

        let err = db
            .budgets()
            .insert(
                &NewBudget {
                    client_id: "cliente-1".to_string(),
                    input: input("loja-b", 0),
                },
                &calculation,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidState(_)));
        assert_eq!(db.budgets().count_by_store("loja-a").await.unwrap(), 0);
    }
}

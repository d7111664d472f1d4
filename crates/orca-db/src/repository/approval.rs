//! # Approval Repository
//!
//! Discount approval requests opened when a budget's discount exceeds what
//! the vendor may grant alone.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open(budget, Manager|Admin)                                           │
//! │     ├── approval_requests: status = pending                            │
//! │     └── budgets:           status = pending_approval                   │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  resolve(request, Approve|Reject, resolver)                            │
//! │     ├── approval_requests: status = approved|rejected, resolved_at      │
//! │     └── budgets:           status = approved|rejected                  │
//! │                                                                         │
//! │  Both steps run in one transaction each. A budget has at most one      │
//! │  pending request (partial unique index).                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use orca_core::validation::validate_identifier;
use orca_core::ApprovalLevel;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::budget::BudgetStatus;
use crate::error::{DbError, DbResult};

/// State of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// The approver's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Approve,
    Reject,
}

impl Resolution {
    fn request_status(self) -> ApprovalStatus {
        match self {
            Resolution::Approve => ApprovalStatus::Approved,
            Resolution::Reject => ApprovalStatus::Rejected,
        }
    }

    fn budget_status(self) -> BudgetStatus {
        match self {
            Resolution::Approve => BudgetStatus::Approved,
            Resolution::Reject => BudgetStatus::Rejected,
        }
    }
}

/// A stored approval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApprovalRequest {
    pub id: String,
    pub budget_id: String,
    pub level: ApprovalLevel,
    pub status: ApprovalStatus,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolver_id: Option<String>,
}

/// Repository for approval requests.
#[derive(Debug, Clone)]
pub struct ApprovalRepository {
    pool: SqlitePool,
}

impl ApprovalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ApprovalRepository { pool }
    }

    /// Opens a pending request for `budget_id` at `level`.
    ///
    /// ## Errors
    /// - `InvalidState` for `ApprovalLevel::None` (nothing to approve)
    /// - `UniqueViolation` when the budget already has a pending request
    /// - `NotFound` when the budget does not exist
    pub async fn open(&self, budget_id: &str, level: ApprovalLevel) -> DbResult<ApprovalRequest> {
        let mut tx = self.pool.begin().await?;
        let request = open_request(&mut *tx, budget_id, level).await?;
        tx.commit().await?;
        Ok(request)
    }

    /// Records the approver's decision on a pending request.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown request
    /// - `InvalidState` when the request was already resolved
    pub async fn resolve(
        &self,
        request_id: &str,
        resolution: Resolution,
        resolver_id: &str,
    ) -> DbResult<ApprovalRequest> {
        validate_identifier("resolver_id", resolver_id)?;

        let mut tx = self.pool.begin().await?;

        // Write first: the transaction takes the write lock before reading,
        // and only one resolver can move the request out of pending.
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE approval_requests
            SET status = ?1, resolved_at = ?2, resolver_id = ?3
            WHERE id = ?4 AND status = 'pending'
            "#,
        )
        .bind(resolution.request_status())
        .bind(now)
        .bind(resolver_id)
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let existing = fetch_request(&mut *tx, request_id).await?;
            return Err(match existing {
                Some(request) => DbError::InvalidState(format!(
                    "approval request {request_id} is already {:?}",
                    request.status
                )),
                None => DbError::not_found("ApprovalRequest", request_id),
            });
        }

        let resolved = fetch_request(&mut *tx, request_id)
            .await?
            .ok_or_else(|| DbError::not_found("ApprovalRequest", request_id))?;

        sqlx::query("UPDATE budgets SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(resolution.budget_status())
            .bind(now)
            .bind(&resolved.budget_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            request_id = %request_id,
            budget_id = %resolved.budget_id,
            resolution = ?resolution,
            resolver_id = %resolver_id,
            "Approval request resolved"
        );

        Ok(resolved)
    }

    /// Gets a request by id.
    pub async fn get_by_id(&self, request_id: &str) -> DbResult<Option<ApprovalRequest>> {
        let mut conn = self.pool.acquire().await?;
        fetch_request(&mut *conn, request_id).await
    }

    /// Most recent request for a budget, if any was ever opened.
    pub async fn get_for_budget(&self, budget_id: &str) -> DbResult<Option<ApprovalRequest>> {
        let request: Option<ApprovalRequest> = sqlx::query_as(
            r#"
            SELECT id, budget_id, level, status, requested_at, resolved_at, resolver_id
            FROM approval_requests
            WHERE budget_id = ?1
            ORDER BY requested_at DESC, rowid DESC
            LIMIT 1
            "#,
        )
        .bind(budget_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }
}

/// Inserts a pending request and flags the budget, on the caller's
/// connection (so budget creation can do it inside its own transaction).
pub(crate) async fn open_request(
    conn: &mut SqliteConnection,
    budget_id: &str,
    level: ApprovalLevel,
) -> DbResult<ApprovalRequest> {
    if level == ApprovalLevel::None {
        return Err(DbError::InvalidState(format!(
            "budget {budget_id} needs no approval"
        )));
    }

    let now = Utc::now();
    let updated = sqlx::query("UPDATE budgets SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(BudgetStatus::PendingApproval)
        .bind(now)
        .bind(budget_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(DbError::not_found("Budget", budget_id));
    }

    let request = ApprovalRequest {
        id: Uuid::new_v4().to_string(),
        budget_id: budget_id.to_string(),
        level,
        status: ApprovalStatus::Pending,
        requested_at: now,
        resolved_at: None,
        resolver_id: None,
    };

    debug!(
        request_id = %request.id,
        budget_id = %budget_id,
        level = %level,
        "Opening approval request"
    );

    sqlx::query(
        r#"
        INSERT INTO approval_requests (id, budget_id, level, status, requested_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&request.id)
    .bind(&request.budget_id)
    .bind(request.level)
    .bind(request.status)
    .bind(request.requested_at)
    .execute(&mut *conn)
    .await?;

    Ok(request)
}

async fn fetch_request(
    conn: &mut SqliteConnection,
    request_id: &str,
) -> DbResult<Option<ApprovalRequest>> {
    let request: Option<ApprovalRequest> = sqlx::query_as(
        r#"
        SELECT id, budget_id, level, status, requested_at, resolved_at, resolver_id
        FROM approval_requests
        WHERE id = ?1
        "#,
    )
    .bind(request_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::budget::NewBudget;
    use crate::{Database, DbConfig};
    use orca_core::{BudgetEngine, BudgetInput, Money, PricingContext, Rate};

    async fn budget_with_discount(db: &Database, discount_bps: u32) -> String {
        let input = BudgetInput {
            store_id: "loja-1".to_string(),
            vendor_id: "vendedor-7".to_string(),
            manager_id: "gerente-2".to_string(),
            ambient_value: Money::from_major_minor(20_000, 0),
            discount: Rate::from_bps(discount_bps),
            additional_costs: vec![],
            measurer_cost: None,
            assembly_cost: None,
        };
        let calculation = BudgetEngine::default()
            .calculate(&input, &PricingContext::default())
            .unwrap();
        db.budgets()
            .insert(
                &NewBudget {
                    client_id: "cliente-1".to_string(),
                    input,
                },
                &calculation,
            )
            .await
            .unwrap()
            .id
    }

    async fn budget_status(db: &Database, id: &str) -> BudgetStatus {
        db.budgets().get_by_id(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_approve_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let budget_id = budget_with_discount(&db, 2500).await;

        let pending = db.approvals().get_for_budget(&budget_id).await.unwrap().unwrap();
        assert_eq!(pending.level, ApprovalLevel::Admin);
        assert_eq!(pending.status, ApprovalStatus::Pending);
        assert_eq!(budget_status(&db, &budget_id).await, BudgetStatus::PendingApproval);

        let resolved = db
            .approvals()
            .resolve(&pending.id, Resolution::Approve, "admin-1")
            .await
            .unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Approved);
        assert_eq!(resolved.resolver_id.as_deref(), Some("admin-1"));
        assert!(resolved.resolved_at.is_some());
        assert_eq!(budget_status(&db, &budget_id).await, BudgetStatus::Approved);

        let err = db
            .approvals()
            .resolve(&pending.id, Resolution::Reject, "admin-2")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_reject_then_reopen() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let budget_id = budget_with_discount(&db, 1500).await;
        let pending = db.approvals().get_for_budget(&budget_id).await.unwrap().unwrap();

        db.approvals()
            .resolve(&pending.id, Resolution::Reject, "gerente-2")
            .await
            .unwrap();
        assert_eq!(budget_status(&db, &budget_id).await, BudgetStatus::Rejected);

        let reopened = db.approvals().open(&budget_id, ApprovalLevel::Admin).await.unwrap();
        assert_eq!(budget_status(&db, &budget_id).await, BudgetStatus::PendingApproval);
        assert_eq!(
            db.approvals().get_by_id(&reopened.id).await.unwrap().map(|r| r.status),
            Some(ApprovalStatus::Pending)
        );
    }

    #[tokio::test]
    async fn test_single_pending_request_per_budget() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let budget_id = budget_with_discount(&db, 1500).await;

        let err = db
            .approvals()
            .open(&budget_id, ApprovalLevel::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_resolvers_one_wins() {
        let path = std::env::temp_dir().join(format!("orca-approval-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(path.clone()).max_connections(2))
            .await
            .unwrap();
        let budget_id = budget_with_discount(&db, 2500).await;
        let pending = db.approvals().get_for_budget(&budget_id).await.unwrap().unwrap();

        let approvals = db.approvals();
        let (approve, reject) = tokio::join!(
            approvals.resolve(&pending.id, Resolution::Approve, "admin-1"),
            approvals.resolve(&pending.id, Resolution::Reject, "admin-2"),
        );

        let (winner, loser) = match (approve, reject) {
            (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
            other => panic!("expected exactly one resolution, got {other:?}"),
        };
        assert!(matches!(loser, DbError::InvalidState(_)));

        let expected = match winner.status {
            ApprovalStatus::Approved => BudgetStatus::Approved,
            _ => BudgetStatus::Rejected,
        };
        assert_eq!(budget_status(&db, &budget_id).await, expected);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[tokio::test]
    async fn test_open_rejects_nothing_to_approve_and_unknown_budget() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let budget_id = budget_with_discount(&db, 500).await;

        assert!(db.approvals().get_for_budget(&budget_id).await.unwrap().is_none());
        assert!(matches!(
            db.approvals().open(&budget_id, ApprovalLevel::None).await,
            Err(DbError::InvalidState(_))
        ));
        assert!(matches!(
            db.approvals().open("missing", ApprovalLevel::Manager).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.approvals().resolve("missing", Resolution::Approve, "admin-1").await,
            Err(DbError::NotFound { .. })
        ));
    }
}

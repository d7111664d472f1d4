//! # Commission Tier Repository
//!
//! Commission schedules per store and role.
//!
//! A schedule is replaced as a whole: partial edits of individual bands make
//! it too easy to leave a gap or overlap behind. Every replacement is audited
//! and the findings are returned (and logged), but a flawed schedule is still
//! stored; the engine treats uncovered values as zero commission and flags them.

use chrono::Utc;
use orca_core::commission::{audit_tier_schedule, TierScheduleIssue};
use orca_core::validation::{validate_commission_tier, validate_identifier};
use orca_core::{CommissionTier, Money, Role, ValidationError};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::parse_rate;
use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct CommissionTierRow {
    role: Role,
    min_value_cents: i64,
    max_value_cents: Option<i64>,
    percentage: String,
    tier_order: i32,
}

impl TryFrom<CommissionTierRow> for CommissionTier {
    type Error = crate::error::DbError;

    fn try_from(row: CommissionTierRow) -> DbResult<Self> {
        Ok(CommissionTier {
            role: row.role,
            min_value: Money::from_cents(row.min_value_cents),
            max_value: row.max_value_cents.map(Money::from_cents),
            percentage: parse_rate("percentage", &row.percentage)?,
            order: row.tier_order,
        })
    }
}

/// Repository for commission tiers.
#[derive(Debug, Clone)]
pub struct CommissionTierRepository {
    pool: SqlitePool,
}

impl CommissionTierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CommissionTierRepository { pool }
    }

    /// Lists a role's tiers for a store. An unconfigured role yields an
    /// empty list, never an error.
    pub async fn list(&self, store_id: &str, role: Role) -> DbResult<Vec<CommissionTier>> {
        let rows: Vec<CommissionTierRow> = sqlx::query_as(
            r#"
            SELECT role, min_value_cents, max_value_cents, percentage, tier_order
            FROM commission_tiers
            WHERE store_id = ?1 AND role = ?2
            ORDER BY tier_order, min_value_cents
            "#,
        )
        .bind(store_id)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        debug!(store_id = %store_id, role = %role, count = rows.len(), "Loaded commission tiers");

        rows.into_iter().map(CommissionTier::try_from).collect()
    }

    /// Replaces a role's whole schedule in one transaction.
    ///
    /// ## Errors
    /// Rejects (before touching the table) a band whose role differs from
    /// `role`, with a negative minimum, an inverted range, or a percentage
    /// outside `[0, 1]`.
    ///
    /// ## Returns
    /// The schedule audit: gaps, overlaps, duplicate orders, a bounded top
    /// band. Empty when the schedule partitions `[0, ∞)`.
    pub async fn replace_schedule(
        &self,
        store_id: &str,
        role: Role,
        tiers: &[CommissionTier],
    ) -> DbResult<Vec<TierScheduleIssue>> {
        validate_identifier("store_id", store_id)?;
        for tier in tiers {
            if tier.role != role {
                return Err(ValidationError::InvalidFormat {
                    field: "role".to_string(),
                    reason: format!(
                        "tier {} is for {}, schedule is for {}",
                        tier.order, tier.role, role
                    ),
                }
                .into());
            }
            validate_commission_tier(tier)?;
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM commission_tiers WHERE store_id = ?1 AND role = ?2")
            .bind(store_id)
            .bind(role)
            .execute(&mut *tx)
            .await?;

        for tier in tiers {
            sqlx::query(
                r#"
                INSERT INTO commission_tiers (
                    store_id, role, min_value_cents, max_value_cents,
                    percentage, tier_order, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(store_id)
            .bind(role)
            .bind(tier.min_value.cents())
            .bind(tier.max_value.map(|m| m.cents()))
            .bind(tier.percentage.to_string())
            .bind(tier.order)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            store_id = %store_id,
            role = %role,
            tiers = tiers.len(),
            "Replaced commission schedule"
        );

        let issues = audit_tier_schedule(tiers);
        for issue in &issues {
            warn!(store_id = %store_id, role = %role, ?issue, "Commission schedule issue");
        }

        Ok(issues)
    }
}

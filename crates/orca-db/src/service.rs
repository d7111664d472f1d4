//! # Budget Service
//!
//! Wires the repositories to the pure engine.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price(input)                                                           │
//! │     1. validate input                      (no writes on bad input)     │
//! │     2. store_configs().get_or_create       (lazy provisioning)          │
//! │     3. commission_tiers().list × 2         (vendor, manager)            │
//! │     4. BudgetEngine::calculate             (pure)                       │
//! │     5. warn! for each calculation warning                               │
//! │                                                                         │
//! │  create(client_id, input)                                               │
//! │     price(input) ──► budgets().insert ──► approval request if required  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use orca_core::validation::{validate_budget_input, validate_identifier};
use orca_core::{
    BudgetCalculation, BudgetEngine, BudgetInput, CalculationWarning, PricingContext, Role,
};
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::budget::{NewBudget, StoredBudget};

/// Loads collaborator data, prices, and persists budgets.
#[derive(Debug, Clone)]
pub struct BudgetService {
    db: Database,
    engine: BudgetEngine,
}

impl BudgetService {
    /// The engine uses the same provisioning defaults as the database, so a
    /// store priced before and after provisioning gets identical costs.
    pub fn new(db: Database) -> Self {
        let engine = BudgetEngine::new(*db.store_defaults());
        BudgetService { db, engine }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Fetches the store config and both tier schedules.
    ///
    /// A store priced for the first time is provisioned here; the context
    /// then carries no config so the engine records `StoreConfigDefaulted`.
    pub async fn load_context(&self, store_id: &str) -> DbResult<PricingContext> {
        let provisioned = self.db.store_configs().get_or_create(store_id).await?;
        let tiers = self.db.commission_tiers();

        Ok(PricingContext {
            store_config: (!provisioned.created).then_some(provisioned.config),
            vendor_tiers: tiers.list(store_id, Role::Vendor).await?,
            manager_tiers: tiers.list(store_id, Role::Manager).await?,
        })
    }

    /// Prices a budget without storing it.
    pub async fn price(&self, input: &BudgetInput) -> DbResult<BudgetCalculation> {
        validate_budget_input(input)?;

        let context = self.load_context(&input.store_id).await?;
        let calculation = self.engine.calculate(input, &context)?;

        for warning in &calculation.warnings {
            warn!(
                store_id = %input.store_id,
                vendor_id = %input.vendor_id,
                ?warning,
                "Budget calculation warning"
            );
        }

        Ok(calculation)
    }

    /// Prices and stores a budget, opening an approval request when the
    /// discount requires one.
    pub async fn create(&self, client_id: &str, input: &BudgetInput) -> DbResult<StoredBudget> {
        validate_identifier("client_id", client_id)?;

        let calculation = self.price(input).await?;
        let stored = self
            .db
            .budgets()
            .insert(
                &NewBudget {
                    client_id: client_id.to_string(),
                    input: input.clone(),
                },
                &calculation,
            )
            .await?;

        info!(
            budget_number = %stored.budget_number,
            final_value = %stored.calculation.final_value,
            margin = %stored.calculation.margin,
            status = ?stored.status,
            "Budget created"
        );

        Ok(stored)
    }

    /// Recalculates a stored budget against today's collaborator data.
    ///
    /// `false` means the store config or a tier schedule changed since the
    /// budget was priced (or the snapshot was altered).
    pub async fn verify(&self, budget_id: &str) -> DbResult<bool> {
        let stored = self
            .db
            .budgets()
            .get_by_id(budget_id)
            .await?
            .ok_or_else(|| DbError::not_found("Budget", budget_id))?;

        let mut context = self.load_context(&stored.store_id).await?;
        // The original pricing ran on defaults; keep it comparable.
        if stored.calculation.warnings.contains(&CalculationWarning::StoreConfigDefaulted)
            && context.store_config.as_ref() == Some(&stored.calculation.store_config)
        {
            context.store_config = None;
        }

        let matches = self.engine.verify(&stored.calculation, &stored.input, &context)?;
        if !matches {
            warn!(
                budget_id = %budget_id,
                budget_number = %stored.budget_number,
                "Stored budget no longer reproduces"
            );
        }
        Ok(matches)
    }
}

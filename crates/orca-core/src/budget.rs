//! # Budget Orchestrator
//!
//! The single entry point that turns a budget request into a priced,
//! persistable `BudgetCalculation`.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    calculate_budget(input, context)                     │
//! │                                                                         │
//! │  1. validate_budget_input ──► ValidationError? stop                    │
//! │  2. final = ambient × (1 − discount)                                    │
//! │  3. store config ──► context value, or defaults (+ warning)            │
//! │  4. audit vendor / manager tier schedules (warnings only)              │
//! │  5. aggregate_costs ──► cost lines, commissions, margin                │
//! │  6. evaluate_for_store(requested discount) ──► approval                │
//! │  7. assemble BudgetCalculation                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! No clock, no random ids, no I/O. The caller fetches the store config and
//! tier tables once (`PricingContext`) and persists the result. Identical
//! inputs therefore always produce an identical calculation, which is what
//! makes "recalculate and compare" auditing possible.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::approval::{evaluate_for_store, ApprovalDecision};
use crate::commission::{audit_tier_schedule, TierScheduleIssue};
use crate::costs::{aggregate_costs, CostBreakdown, CostInputs};
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{AdditionalCost, CommissionTier, Rate, Role, StoreConfig, StoreConfigDefaults};
use crate::validation::validate_budget_input;

// =============================================================================
// Input
// =============================================================================

/// A budget creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetInput {
    pub store_id: String,
    pub vendor_id: String,
    pub manager_id: String,
    /// Sum of the selected environments' list prices.
    pub ambient_value: Money,
    /// Requested discount as a fraction (0.2 = 20%).
    pub discount: Rate,
    #[serde(default)]
    pub additional_costs: Vec<AdditionalCost>,
    /// Overrides the store's default measurer cost.
    #[serde(default)]
    pub measurer_cost: Option<Money>,
    #[serde(default)]
    pub assembly_cost: Option<Money>,
}

/// The collaborator data for one calculation, fetched by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingContext {
    /// `None` for a store that has never been configured.
    pub store_config: Option<StoreConfig>,
    pub vendor_tiers: Vec<CommissionTier>,
    pub manager_tiers: Vec<CommissionTier>,
}

// =============================================================================
// Output
// =============================================================================

/// Something an operator should look at. Never stops a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationWarning {
    /// The store had no configuration; defaults were used.
    StoreConfigDefaulted,
    /// No commission tier covered the final value for this role.
    NoTierMatched { role: Role, value: Money },
    /// The role's tier schedule has a data-quality problem.
    TierSchedule { role: Role, issue: TierScheduleIssue },
}

/// The engine's output: a complete, persistable pricing snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetCalculation {
    pub store_id: String,
    pub vendor_id: String,
    pub manager_id: String,
    pub ambient_value: Money,
    pub discount_fraction: Rate,
    pub discount_amount: Money,
    pub final_value: Money,
    pub costs: CostBreakdown,
    pub vendor_tier_order: Option<i32>,
    pub manager_tier_order: Option<i32>,
    pub margin: Money,
    /// Margin over final value × 100, two decimals.
    #[ts(type = "string")]
    pub margin_percentage: Decimal,
    pub approval: ApprovalDecision,
    /// The store config the costs were derived from.
    pub store_config: StoreConfig,
    pub warnings: Vec<CalculationWarning>,
}

impl BudgetCalculation {
    /// Checks the snapshot's arithmetic invariants.
    ///
    /// - `total_costs` is the sum of its components
    /// - `margin + total_costs == final_value`
    /// - `discount_amount + final_value == ambient_value`
    ///
    /// A snapshot whose sums overflow does not reconcile.
    pub fn reconciles(&self) -> bool {
        self.costs.component_sum().ok() == Some(self.costs.total_costs)
            && self.margin.checked_add(self.costs.total_costs).ok() == Some(self.final_value)
            && self.discount_amount.checked_add(self.final_value).ok() == Some(self.ambient_value)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// =============================================================================
// Orchestration
// =============================================================================

/// Prices a budget.
///
/// ## Errors
/// - `CoreError::Validation` when the input is rejected (nothing is computed)
/// - `CoreError::AmountOverflow` for amounts beyond `i64` centavos
///
/// ## Example
/// ```rust
/// use orca_core::budget::{calculate_budget, BudgetInput, PricingContext};
/// use orca_core::money::Money;
/// use orca_core::types::{Rate, StoreConfigDefaults};
///
/// let input = BudgetInput {
///     store_id: "loja-1".into(),
///     vendor_id: "vendedor-7".into(),
///     manager_id: "gerente-2".into(),
///     ambient_value: Money::from_major_minor(50_000, 0),
///     discount: Rate::from_bps(2000),
///     additional_costs: vec![],
///     measurer_cost: None,
///     assembly_cost: None,
/// };
///
/// let calc = calculate_budget(&input, &PricingContext::default(), &StoreConfigDefaults::standard())
///     .unwrap();
/// assert_eq!(calc.final_value, Money::from_major_minor(40_000, 0));
/// assert!(calc.reconciles());
/// ```
pub fn calculate_budget(
    input: &BudgetInput,
    context: &PricingContext,
    defaults: &StoreConfigDefaults,
) -> CoreResult<BudgetCalculation> {
    validate_budget_input(input)?;

    let final_value = input.ambient_value.apply_rate(input.discount.complement())?;

    let mut warnings = Vec::new();

    let store_config = match &context.store_config {
        Some(config) => config.clone(),
        None => {
            warnings.push(CalculationWarning::StoreConfigDefaulted);
            StoreConfig::with_defaults(input.store_id.clone(), defaults)
        }
    };

    for (role, tiers) in [
        (Role::Vendor, &context.vendor_tiers),
        (Role::Manager, &context.manager_tiers),
    ] {
        warnings.extend(
            audit_tier_schedule(tiers)
                .into_iter()
                .map(|issue| CalculationWarning::TierSchedule { role, issue }),
        );
    }

    let aggregation = aggregate_costs(&CostInputs {
        ambient_value: input.ambient_value,
        final_value,
        store_config: &store_config,
        vendor_tiers: &context.vendor_tiers,
        manager_tiers: &context.manager_tiers,
        additional_costs: &input.additional_costs,
        measurer_cost: input.measurer_cost,
        assembly_cost: input.assembly_cost,
    })?;

    for (role, resolution) in [
        (Role::Vendor, aggregation.vendor),
        (Role::Manager, aggregation.manager),
    ] {
        if !resolution.is_matched() {
            warnings.push(CalculationWarning::NoTierMatched {
                role,
                value: final_value,
            });
        }
    }

    let approval = evaluate_for_store(input.discount, &store_config);

    Ok(BudgetCalculation {
        store_id: input.store_id.clone(),
        vendor_id: input.vendor_id.clone(),
        manager_id: input.manager_id.clone(),
        ambient_value: input.ambient_value,
        discount_fraction: input.discount,
        discount_amount: input.ambient_value.checked_sub(final_value)?,
        final_value,
        costs: aggregation.costs,
        vendor_tier_order: aggregation.vendor.matched_tier_order,
        manager_tier_order: aggregation.manager.matched_tier_order,
        margin: aggregation.margin,
        margin_percentage: aggregation.margin_percentage,
        approval,
        store_config,
        warnings,
    })
}

// =============================================================================
// Engine
// =============================================================================

/// The orchestrator with its provisioning defaults injected.
///
/// ## Usage
/// ```rust,ignore
/// let engine = BudgetEngine::new(config.store_defaults);
/// let calculation = engine.calculate(&input, &context)?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetEngine {
    defaults: StoreConfigDefaults,
}

impl BudgetEngine {
    pub fn new(defaults: StoreConfigDefaults) -> Self {
        BudgetEngine { defaults }
    }

    pub fn defaults(&self) -> &StoreConfigDefaults {
        &self.defaults
    }

    pub fn calculate(
        &self,
        input: &BudgetInput,
        context: &PricingContext,
    ) -> CoreResult<BudgetCalculation> {
        calculate_budget(input, context, &self.defaults)
    }

    /// Recalculates and compares against a stored snapshot.
    ///
    /// Returns `true` when the stored calculation is exactly what the engine
    /// produces today for the same input and collaborator data.
    pub fn verify(
        &self,
        stored: &BudgetCalculation,
        input: &BudgetInput,
        context: &PricingContext,
    ) -> CoreResult<bool> {
        Ok(self.calculate(input, context)? == *stored)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Cost Aggregator
//!
//! Computes every cost line of a priced budget and the resulting margin.
//!
//! ## Cost Lines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line                     Formula                                       │
//! │  ──────────────────────   ───────────────────────────────────────────   │
//! │  factory_cost             ambient × factory_cost_deflator               │
//! │  vendor_commission        resolve(final, vendor tiers)                  │
//! │  manager_commission       resolve(final, manager tiers)                 │
//! │  measurer_cost            override or default_measurer_cost             │
//! │  assembly_cost            supplied by caller (default 0)                │
//! │  freight_cost             final × freight_percentage                    │
//! │  additional_costs_total   Σ additional_costs[i].amount                  │
//! │  ──────────────────────                                                 │
//! │  total_costs              sum of the seven lines above                  │
//! │  margin                   final − total_costs                           │
//! │  margin_percentage        margin / final × 100  (0 when final = 0)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each line is rounded half-up to centavos when it is produced. Totals are
//! sums of rounded lines, so `margin + total_costs == final_value` exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::commission::{resolve_commission, CommissionResolution};
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{AdditionalCost, CommissionTier, StoreConfig};

/// Everything the aggregator needs, already resolved by the caller.
#[derive(Debug, Clone, Copy)]
pub struct CostInputs<'a> {
    /// Pre-discount list price of the selected environments.
    pub ambient_value: Money,
    /// Post-discount sale price.
    pub final_value: Money,
    pub store_config: &'a StoreConfig,
    pub vendor_tiers: &'a [CommissionTier],
    pub manager_tiers: &'a [CommissionTier],
    pub additional_costs: &'a [AdditionalCost],
    /// Replaces `store_config.default_measurer_cost` when present.
    pub measurer_cost: Option<Money>,
    pub assembly_cost: Option<Money>,
}

/// The cost lines of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostBreakdown {
    pub factory_cost: Money,
    pub vendor_commission: Money,
    pub manager_commission: Money,
    pub measurer_cost: Money,
    pub assembly_cost: Money,
    pub freight_cost: Money,
    pub additional_costs_total: Money,
    pub total_costs: Money,
}

impl CostBreakdown {
    /// Recomputes the sum of the individual lines (for reconciliation).
    ///
    /// ## Errors
    /// `CoreError::AmountOverflow` when the lines do not fit in one `Money`.
    pub fn component_sum(&self) -> CoreResult<Money> {
        Money::checked_sum([
            self.factory_cost,
            self.vendor_commission,
            self.manager_commission,
            self.measurer_cost,
            self.assembly_cost,
            self.freight_cost,
            self.additional_costs_total,
        ])
    }
}

/// Aggregator output: cost lines, per-role tier resolutions and margin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostAggregation {
    pub costs: CostBreakdown,
    pub vendor: CommissionResolution,
    pub manager: CommissionResolution,
    pub margin: Money,
    pub margin_percentage: Decimal,
}

/// Computes all cost lines and the margin.
pub fn aggregate_costs(inputs: &CostInputs<'_>) -> CoreResult<CostAggregation> {
    let config = inputs.store_config;

    let factory_cost = inputs
        .ambient_value
        .apply_rate(config.factory_cost_deflator)?;
    let vendor = resolve_commission(inputs.final_value, inputs.vendor_tiers)?;
    let manager = resolve_commission(inputs.final_value, inputs.manager_tiers)?;
    let measurer_cost = inputs
        .measurer_cost
        .unwrap_or(config.default_measurer_cost);
    let assembly_cost = inputs.assembly_cost.unwrap_or_default();
    let freight_cost = inputs.final_value.apply_rate(config.freight_percentage)?;
    let additional_costs_total =
        Money::checked_sum(inputs.additional_costs.iter().map(|c| c.amount))?;

    let mut costs = CostBreakdown {
        factory_cost,
        vendor_commission: vendor.amount,
        manager_commission: manager.amount,
        measurer_cost,
        assembly_cost,
        freight_cost,
        additional_costs_total,
        total_costs: Money::zero(),
    };
    costs.total_costs = costs.component_sum()?;

    let margin = inputs.final_value.checked_sub(costs.total_costs)?;
    let margin_percentage = margin.percentage_of(inputs.final_value);

    Ok(CostAggregation {
        costs,
        vendor,
        manager,
        margin,
        margin_percentage,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{Rate, Role, StoreConfigDefaults};
    use rust_decimal_macros::dec;

    fn reais(major: i64, minor: i64) -> Money {
        Money::from_major_minor(major, minor)
    }

    fn config() -> StoreConfig {
        StoreConfig {
            store_id: "loja-1".to_string(),
            factory_cost_deflator: Rate::new(dec!(0.35)),
            freight_percentage: Rate::new(dec!(0.03)),
            default_measurer_cost: reais(200, 0),
            vendor_discount_limit: Rate::new(dec!(0.10)),
            manager_discount_limit: Rate::new(dec!(0.20)),
        }
    }

    fn flat(role: Role, pct: Rate) -> Vec<CommissionTier> {
        vec![CommissionTier {
            role,
            min_value: Money::zero(),
            max_value: None,
            percentage: pct,
            order: 1,
        }]
    }

    #[test]
    fn test_full_breakdown() {
        let config = config();
        let vendor = flat(Role::Vendor, Rate::new(dec!(0.06)));
        let manager = flat(Role::Manager, Rate::new(dec!(0.01)));
        let extras = vec![
            AdditionalCost::new("Içamento", reais(300, 0)),
            AdditionalCost::new("Pedra", reais(1_200, 50)),
        ];

        let result = aggregate_costs(&CostInputs {
            ambient_value: reais(50_000, 0),
            final_value: reais(40_000, 0),
            store_config: &config,
            vendor_tiers: &vendor,
            manager_tiers: &manager,
            additional_costs: &extras,
            measurer_cost: None,
            assembly_cost: Some(reais(800, 0)),
        })
        .unwrap();

        let costs = result.costs;
        assert_eq!(costs.factory_cost, reais(17_500, 0));
        assert_eq!(costs.vendor_commission, reais(2_400, 0));
        assert_eq!(costs.manager_commission, reais(400, 0));
        assert_eq!(costs.measurer_cost, reais(200, 0));
        assert_eq!(costs.assembly_cost, reais(800, 0));
        assert_eq!(costs.freight_cost, reais(1_200, 0));
        assert_eq!(costs.additional_costs_total, reais(1_500, 50));
        assert_eq!(costs.total_costs, reais(24_000, 50));
        assert_eq!(result.margin, reais(15_999, 50));
        assert_eq!(result.margin_percentage, dec!(40.00));
        assert_eq!(result.vendor.matched_tier_order, Some(1));
    }

    #[test]
    fn test_measurer_override() {
        let config = config();
        let result = aggregate_costs(&CostInputs {
            ambient_value: reais(1_000, 0),
            final_value: reais(1_000, 0),
            store_config: &config,
            vendor_tiers: &[],
            manager_tiers: &[],
            additional_costs: &[],
            measurer_cost: Some(Money::zero()),
            assembly_cost: None,
        })
        .unwrap();
        assert!(result.costs.measurer_cost.is_zero());
        assert!(result.costs.assembly_cost.is_zero());
    }

    #[test]
    fn test_missing_tiers_are_zero_and_unmatched() {
        let config = config();
        let result = aggregate_costs(&CostInputs {
            ambient_value: reais(10_000, 0),
            final_value: reais(10_000, 0),
            store_config: &config,
            vendor_tiers: &[],
            manager_tiers: &[],
            additional_costs: &[],
            measurer_cost: None,
            assembly_cost: None,
        })
        .unwrap();
        assert!(result.costs.vendor_commission.is_zero());
        assert!(!result.vendor.is_matched());
        assert!(!result.manager.is_matched());
    }

    #[test]
    fn test_all_zero_inputs() {
        let config = StoreConfig {
            default_measurer_cost: Money::zero(),
            ..StoreConfig::with_defaults("loja-0", &StoreConfigDefaults::standard())
        };
        let result = aggregate_costs(&CostInputs {
            ambient_value: Money::zero(),
            final_value: Money::zero(),
            store_config: &config,
            vendor_tiers: &[],
            manager_tiers: &[],
            additional_costs: &[],
            measurer_cost: None,
            assembly_cost: None,
        })
        .unwrap();
        assert_eq!(result.costs, CostBreakdown::default());
        assert!(result.margin.is_zero());
        assert_eq!(result.margin_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_zero_final_value_with_costs_has_zero_percentage() {
        let config = config();
        let result = aggregate_costs(&CostInputs {
            ambient_value: reais(1_000, 0),
            final_value: Money::zero(),
            store_config: &config,
            vendor_tiers: &[],
            manager_tiers: &[],
            additional_costs: &[],
            measurer_cost: None,
            assembly_cost: None,
        })
        .unwrap();
        assert!(result.margin.is_negative());
        assert_eq!(result.margin_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_lines_rounded_individually() {
        // 333.33 × 0.035 = 11.66655 → 11.67 ; 333.33 × 0.03 = 9.9999 → 10.00
        let config = StoreConfig {
            factory_cost_deflator: Rate::new(dec!(0.035)),
            ..config()
        };
        let result = aggregate_costs(&CostInputs {
            ambient_value: reais(333, 33),
            final_value: reais(333, 33),
            store_config: &config,
            vendor_tiers: &[],
            manager_tiers: &[],
            additional_costs: &[],
            measurer_cost: Some(Money::zero()),
            assembly_cost: None,
        })
        .unwrap();
        assert_eq!(result.costs.factory_cost, reais(11, 67));
        assert_eq!(result.costs.freight_cost, reais(10, 0));
        assert_eq!(result.costs.total_costs, reais(21, 67));
        assert_eq!(result.margin + result.costs.total_costs, reais(333, 33));
    }

    #[test]
    fn test_additional_costs_overflow_is_an_error() {
        let half = Money::from_cents(i64::MAX / 2 + 1);
        let additional = [
            AdditionalCost::new("Içamento", half),
            AdditionalCost::new("Tampo", half),
        ];

        let result = aggregate_costs(&CostInputs {
            ambient_value: reais(1_000, 0),
            final_value: reais(1_000, 0),
            store_config: &config(),
            vendor_tiers: &[],
            manager_tiers: &[],
            additional_costs: &additional,
            measurer_cost: Some(Money::zero()),
            assembly_cost: None,
        });

        assert!(matches!(result, Err(CoreError::AmountOverflow { .. })));
    }

    #[test]
    fn test_total_costs_overflow_is_an_error() {
        // Each line fits; factory + freight does not
        let config = StoreConfig {
            factory_cost_deflator: Rate::new(dec!(1)),
            freight_percentage: Rate::new(dec!(1)),
            ..config()
        };
        let value = Money::from_cents(i64::MAX / 2 + 10);

        let result = aggregate_costs(&CostInputs {
            ambient_value: value,
            final_value: value,
            store_config: &config,
            vendor_tiers: &[],
            manager_tiers: &[],
            additional_costs: &[],
            measurer_cost: None,
            assembly_cost: None,
        });

        assert!(matches!(result, Err(CoreError::AmountOverflow { .. })));
    }
}

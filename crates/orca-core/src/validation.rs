//! # Validation Module
//!
//! Input validation run before any calculation begins.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request handler (outside this workspace)                     │
//! │  └── Deserialization, authentication, tenant isolation                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Negative amounts, fractions outside [0, 1]                        │
//! │  └── Missing identifiers, malformed cost lines                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / UNIQUE constraints                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error names the offending field so the caller can point at it.

use crate::budget::BudgetInput;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{AdditionalCost, CommissionTier, Rate, StoreConfig};
use crate::{MAX_ADDITIONAL_COSTS, MAX_DESCRIPTION_LEN, MAX_IDENTIFIER_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an identifier (store, vendor, manager, client).
///
/// ## Rules
/// - Must not be blank
/// - At most 64 characters
///
/// ## Example
/// ```rust
/// use orca_core::validation::validate_identifier;
///
/// assert!(validate_identifier("vendor_id", "v-001").is_ok());
/// assert!(validate_identifier("vendor_id", "  ").is_err());
/// ```
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

/// Validates that a monetary value is not negative. Zero is allowed.
pub fn validate_non_negative(field: &str, value: Money) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that a rate is a fraction in `[0, 1]`.
///
/// ## Example
/// ```rust
/// use orca_core::types::Rate;
/// use orca_core::validation::validate_fraction;
///
/// assert!(validate_fraction("discount", Rate::from_bps(2000)).is_ok());
/// assert!(validate_fraction("discount", "20".parse().unwrap()).is_err()); // 20 means 2000%
/// ```
pub fn validate_fraction(field: &str, rate: Rate) -> ValidationResult<()> {
    if !rate.is_fraction() {
        return Err(ValidationError::FractionOutOfRange {
            field: field.to_string(),
            value: rate.as_decimal(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the caller's additional cost lines.
///
/// ## Rules
/// - At most 100 lines
/// - Each description non-blank, at most 200 characters
/// - Each amount non-negative
pub fn validate_additional_costs(costs: &[AdditionalCost]) -> ValidationResult<()> {
    if costs.len() > MAX_ADDITIONAL_COSTS {
        return Err(ValidationError::TooMany {
            field: "additional_costs".to_string(),
            max: MAX_ADDITIONAL_COSTS,
        });
    }

    for (index, cost) in costs.iter().enumerate() {
        let description = cost.description.trim();
        if description.is_empty() {
            return Err(ValidationError::Required {
                field: format!("additional_costs[{index}].description"),
            });
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: format!("additional_costs[{index}].description"),
                max: MAX_DESCRIPTION_LEN,
            });
        }
        validate_non_negative(&format!("additional_costs[{index}].amount"), cost.amount)?;
    }

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates a budget request before pricing.
///
/// ## Checks (in order)
/// ```text
/// store_id, vendor_id, manager_id   → non-blank
/// ambient_value                     → ≥ 0
/// discount                          → in [0, 1]
/// measurer_cost, assembly_cost      → ≥ 0 when present
/// additional_costs                  → see validate_additional_costs
/// ```
pub fn validate_budget_input(input: &BudgetInput) -> ValidationResult<()> {
    validate_identifier("store_id", &input.store_id)?;
    validate_identifier("vendor_id", &input.vendor_id)?;
    validate_identifier("manager_id", &input.manager_id)?;
    validate_non_negative("ambient_value", input.ambient_value)?;
    validate_fraction("discount", input.discount)?;

    if let Some(measurer) = input.measurer_cost {
        validate_non_negative("measurer_cost", measurer)?;
    }
    if let Some(assembly) = input.assembly_cost {
        validate_non_negative("assembly_cost", assembly)?;
    }

    validate_additional_costs(&input.additional_costs)
}

/// Validates a store configuration written by an administrator.
pub fn validate_store_config(config: &StoreConfig) -> ValidationResult<()> {
    validate_identifier("store_id", &config.store_id)?;
    validate_fraction("factory_cost_deflator", config.factory_cost_deflator)?;
    validate_fraction("freight_percentage", config.freight_percentage)?;
    validate_non_negative("default_measurer_cost", config.default_measurer_cost)?;
    validate_fraction("vendor_discount_limit", config.vendor_discount_limit)?;
    validate_fraction("manager_discount_limit", config.manager_discount_limit)?;

    if config.vendor_discount_limit > config.manager_discount_limit {
        return Err(ValidationError::LimitsInverted {
            vendor: config.vendor_discount_limit.as_decimal(),
            manager: config.manager_discount_limit.as_decimal(),
        });
    }

    Ok(())
}

/// Validates the structure of a single commission band.
///
/// Gaps and overlaps between bands are NOT errors here; see
/// [`crate::commission::audit_tier_schedule`].
pub fn validate_commission_tier(tier: &CommissionTier) -> ValidationResult<()> {
    validate_non_negative("min_value", tier.min_value)?;
    validate_fraction("percentage", tier.percentage)?;

    if tier.max_value.is_some_and(|max| max < tier.min_value) {
        return Err(ValidationError::InvertedTier { order: tier.order });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, StoreConfigDefaults};
    use rust_decimal_macros::dec;

    fn input() -> BudgetInput {
        BudgetInput {
            store_id: "loja-1".to_string(),
            vendor_id: "vendedor-7".to_string(),
            manager_id: "gerente-2".to_string(),
            ambient_value: Money::from_major_minor(10_000, 0),
            discount: Rate::new(dec!(0.05)),
            additional_costs: vec![],
            measurer_cost: None,
            assembly_cost: None,
        }
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("store_id", "loja-1").is_ok());
        assert!(validate_identifier("store_id", "").is_err());
        assert!(validate_identifier("store_id", &"x".repeat(65)).is_err());
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate_budget_input(&input()).is_ok());
    }

    #[test]
    fn test_negative_ambient_value_rejected() {
        let bad = BudgetInput {
            ambient_value: Money::from_cents(-1),
            ..input()
        };
        let err = validate_budget_input(&bad).unwrap_err();
        assert_eq!(err.field(), "ambient_value");
    }

    #[test]
    fn test_discount_outside_unit_interval_rejected() {
        for discount in [dec!(-0.01), dec!(1.01), dec!(20)] {
            let bad = BudgetInput {
                discount: Rate::new(discount),
                ..input()
            };
            let err = validate_budget_input(&bad).unwrap_err();
            assert_eq!(err.field(), "discount");
        }

        let full = BudgetInput {
            discount: Rate::one(),
            ..input()
        };
        assert!(validate_budget_input(&full).is_ok());
    }

    #[test]
    fn test_overrides_must_be_non_negative() {
        let bad = BudgetInput {
            assembly_cost: Some(Money::from_cents(-100)),
            ..input()
        };
        assert_eq!(validate_budget_input(&bad).unwrap_err().field(), "assembly_cost");

        let bad = BudgetInput {
            measurer_cost: Some(Money::from_cents(-100)),
            ..input()
        };
        assert_eq!(validate_budget_input(&bad).unwrap_err().field(), "measurer_cost");
    }

    #[test]
    fn test_additional_costs() {
        let bad = BudgetInput {
            additional_costs: vec![
                AdditionalCost::new("Frete extra", Money::from_cents(100)),
                AdditionalCost::new("Desconto?", Money::from_cents(-100)),
            ],
            ..input()
        };
        assert_eq!(
            validate_budget_input(&bad).unwrap_err().field(),
            "additional_costs[1].amount"
        );

        let blank = vec![AdditionalCost::new("  ", Money::zero())];
        assert_eq!(
            validate_additional_costs(&blank).unwrap_err().field(),
            "additional_costs[0].description"
        );

        let many = vec![AdditionalCost::new("x", Money::zero()); MAX_ADDITIONAL_COSTS + 1];
        assert!(validate_additional_costs(&many).is_err());
    }

    #[test]
    fn test_validate_store_config() {
        let config = StoreConfig::with_defaults("loja-1", &StoreConfigDefaults::standard());
        assert!(validate_store_config(&config).is_ok());

        let inverted = StoreConfig {
            vendor_discount_limit: Rate::new(dec!(0.3)),
            ..config.clone()
        };
        assert!(matches!(
            validate_store_config(&inverted),
            Err(ValidationError::LimitsInverted { .. })
        ));

        let percent_not_fraction = StoreConfig {
            freight_percentage: Rate::new(dec!(2)),
            ..config
        };
        assert_eq!(
            validate_store_config(&percent_not_fraction).unwrap_err().field(),
            "freight_percentage"
        );
    }

    #[test]
    fn test_validate_commission_tier() {
        let tier = CommissionTier {
            role: Role::Vendor,
            min_value: Money::from_cents(500),
            max_value: Some(Money::from_cents(100)),
            percentage: Rate::new(dec!(0.05)),
            order: 3,
        };
        assert_eq!(
            validate_commission_tier(&tier),
            Err(ValidationError::InvertedTier { order: 3 })
        );

        let ok = CommissionTier {
            max_value: None,
            ..tier
        };
        assert!(validate_commission_tier(&ok).is_ok());
    }
}

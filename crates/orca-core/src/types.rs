//! # Domain Types
//!
//! Core domain types consumed by the budget engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  StoreConfig    │   │ CommissionTier  │   │ AdditionalCost  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  store_id       │   │  role           │   │  description    │       │
//! │  │  deflator       │   │  min / max      │   │  amount         │       │
//! │  │  freight %      │   │  percentage     │   └─────────────────┘       │
//! │  │  measurer cost  │   │  order          │                              │
//! │  │  discount limits│   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │      Rate       │   │      Role       │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Decimal 0..1   │   │  Vendor         │                              │
//! │  │  0.06 = 6%      │   │  Manager        │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fractions, Never Percent Integers
//! Every percentage in the system is a fraction: `0.06` means 6%. There is no
//! constructor that accepts `6` meaning 6%, which removes a whole class of
//! ×100 bugs at the type level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A decimal fraction (0.06 = 6%).
///
/// Serialized as a decimal string (`"0.06"`) so snapshots never carry floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Rate(#[ts(type = "string")] Decimal);

impl Rate {
    #[inline]
    pub const fn new(fraction: Decimal) -> Self {
        Rate(fraction)
    }

    /// Creates a rate from basis points (600 bps = 0.06).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::new(i64::from(bps), 4))
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(Decimal::ZERO)
    }

    #[inline]
    pub const fn one() -> Self {
        Rate(Decimal::ONE)
    }

    #[inline]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `1 − self` (the share kept after a discount).
    #[inline]
    pub fn complement(&self) -> Self {
        Rate(Decimal::ONE - self.0)
    }

    /// Checks the rate lies in `[0, 1]`.
    #[inline]
    pub fn is_fraction(&self) -> bool {
        self.0 >= Decimal::ZERO && self.0 <= Decimal::ONE
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Rate {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Rate)
    }
}

impl From<Decimal> for Rate {
    fn from(fraction: Decimal) -> Self {
        Rate(fraction)
    }
}

// =============================================================================
// Role
// =============================================================================

/// Staff role that earns a commission on a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum Role {
    Vendor,
    Manager,
}

impl Role {
    /// Stable lowercase name used in storage and logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Vendor => "vendor",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vendor" => Ok(Role::Vendor),
            "manager" => Ok(Role::Manager),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// =============================================================================
// Commission Tier
// =============================================================================

/// One band of a store's commission schedule for a role.
///
/// ## Band Convention
/// Bands are inclusive at BOTH ends: a value equal to `max_value` belongs to
/// this band. Adjacent bands abut at the next centavo:
/// ```text
///   order 1: [0.00      .. 25000.00]  5%
///   order 2: [25000.01  .. 50000.00]  6%
///   order 3: [50000.01  .. ∞       ]  8%
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionTier {
    pub role: Role,
    pub min_value: Money,
    /// `None` means "and above".
    pub max_value: Option<Money>,
    pub percentage: Rate,
    /// Evaluation sequence; lowest wins when bands overlap.
    pub order: i32,
}

impl CommissionTier {
    /// Checks whether `value` falls inside this band.
    #[inline]
    pub fn contains(&self, value: Money) -> bool {
        value >= self.min_value && self.max_value.map_or(true, |max| value <= max)
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Per-store numeric pricing policy (one row per store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreConfig {
    pub store_id: String,
    /// Fraction of the ambient value treated as factory cost.
    pub factory_cost_deflator: Rate,
    /// Fraction of the final sale value charged as freight.
    pub freight_percentage: Rate,
    /// Flat measurement visit cost.
    pub default_measurer_cost: Money,
    /// Highest discount a vendor may grant alone.
    pub vendor_discount_limit: Rate,
    /// Highest discount a manager may approve; above it an admin must.
    pub manager_discount_limit: Rate,
}

impl StoreConfig {
    /// Builds a config for `store_id` from a set of defaults.
    pub fn with_defaults(store_id: impl Into<String>, defaults: &StoreConfigDefaults) -> Self {
        StoreConfig {
            store_id: store_id.into(),
            factory_cost_deflator: defaults.factory_cost_deflator,
            freight_percentage: defaults.freight_percentage,
            default_measurer_cost: defaults.default_measurer_cost,
            vendor_discount_limit: defaults.vendor_discount_limit,
            manager_discount_limit: defaults.manager_discount_limit,
        }
    }
}

/// Values used to provision a store the first time it is priced.
///
/// Passed explicitly to the engine and to the store config repository;
/// there is no process-wide default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreConfigDefaults {
    pub factory_cost_deflator: Rate,
    pub freight_percentage: Rate,
    pub default_measurer_cost: Money,
    pub vendor_discount_limit: Rate,
    pub manager_discount_limit: Rate,
}

impl StoreConfigDefaults {
    /// Stock defaults for a brand-new store.
    ///
    /// | Field                  | Value     |
    /// |------------------------|-----------|
    /// | factory_cost_deflator  | 0.30      |
    /// | freight_percentage     | 0.02      |
    /// | default_measurer_cost  | R$ 150.00 |
    /// | vendor_discount_limit  | 0.10      |
    /// | manager_discount_limit | 0.20      |
    pub fn standard() -> Self {
        StoreConfigDefaults {
            factory_cost_deflator: Rate::from_bps(3000),
            freight_percentage: Rate::from_bps(200),
            default_measurer_cost: Money::from_major_minor(150, 0),
            vendor_discount_limit: Rate::from_bps(1000),
            manager_discount_limit: Rate::from_bps(2000),
        }
    }
}

impl Default for StoreConfigDefaults {
    fn default() -> Self {
        StoreConfigDefaults::standard()
    }
}

// =============================================================================
// Additional Cost
// =============================================================================

/// A free-form cost line contributed by the caller (e.g. "Içamento").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdditionalCost {
    pub description: String,
    pub amount: Money,
}

impl AdditionalCost {
    pub fn new(description: impl Into<String>, amount: Money) -> Self {
        AdditionalCost {
            description: description.into(),
            amount,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_from_bps() {
        assert_eq!(Rate::from_bps(600), Rate::new(dec!(0.06)));
        assert_eq!(Rate::from_bps(10000), Rate::one());
    }

    #[test]
    fn test_rate_complement_and_bounds() {
        let discount = Rate::new(dec!(0.2));
        assert_eq!(discount.complement(), Rate::new(dec!(0.8)));
        assert!(discount.is_fraction());
        assert!(Rate::zero().is_fraction());
        assert!(Rate::one().is_fraction());
        assert!(!Rate::new(dec!(1.01)).is_fraction());
        assert!(!Rate::new(dec!(-0.01)).is_fraction());
    }

    #[test]
    fn test_rate_parse_and_serde() {
        let rate: Rate = " 0.125 ".parse().unwrap();
        assert_eq!(rate, Rate::new(dec!(0.125)));
        assert_eq!(rate.percentage(), dec!(12.5));

        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, "\"0.125\"");
        let back: Rate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rate);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Vendor".parse::<Role>().unwrap(), Role::Vendor);
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Manager.to_string(), "manager");
    }

    #[test]
    fn test_tier_contains_is_inclusive() {
        let tier = CommissionTier {
            role: Role::Vendor,
            min_value: Money::from_major_minor(25_000, 1),
            max_value: Some(Money::from_major_minor(50_000, 0)),
            percentage: Rate::new(dec!(0.06)),
            order: 2,
        };
        assert!(tier.contains(Money::from_major_minor(25_000, 1)));
        assert!(tier.contains(Money::from_major_minor(50_000, 0)));
        assert!(!tier.contains(Money::from_major_minor(25_000, 0)));
        assert!(!tier.contains(Money::from_major_minor(50_000, 1)));

        let open = CommissionTier {
            max_value: None,
            ..tier
        };
        assert!(open.contains(Money::from_cents(i64::MAX)));
    }

    #[test]
    fn test_store_config_with_defaults() {
        let config = StoreConfig::with_defaults("loja-1", &StoreConfigDefaults::standard());
        assert_eq!(config.store_id, "loja-1");
        assert_eq!(config.factory_cost_deflator, Rate::new(dec!(0.30)));
        assert_eq!(config.default_measurer_cost.cents(), 15_000);
        assert!(config.vendor_discount_limit <= config.manager_discount_limit);
    }
}

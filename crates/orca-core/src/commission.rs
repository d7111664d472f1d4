//! # Commission Tier Resolver
//!
//! Maps a sale value to exactly one commission amount.
//!
//! ## Single-Tier, Non-Progressive
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Schedule: ≤25k → 5%   |   25k..50k → 6%   |   >50k → 8%                │
//! │                                                                         │
//! │  value = 40,000.00                                                      │
//! │                                                                         │
//! │  ✅ SINGLE TIER:  40,000.00 × 6%                       = 2,400.00       │
//! │  ❌ PROGRESSIVE:  25,000 × 5% + 15,000 × 6%            = 2,150.00       │
//! │                                                                         │
//! │  The band the value falls into applies its rate to the ENTIRE value.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unmatched Values
//! When no band covers the value (empty schedule, gap) the commission is zero
//! and `matched_tier_order` is `None`. There is no fallback rate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{CommissionTier, Rate};

// =============================================================================
// Resolution
// =============================================================================

/// Outcome of resolving one role's commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionResolution {
    pub amount: Money,
    /// The `order` of the tier that was applied, if any.
    pub matched_tier_order: Option<i32>,
}

impl CommissionResolution {
    /// Zero commission, no tier.
    pub const fn unmatched() -> Self {
        CommissionResolution {
            amount: Money::zero(),
            matched_tier_order: None,
        }
    }

    #[inline]
    pub const fn is_matched(&self) -> bool {
        self.matched_tier_order.is_some()
    }
}

/// Resolves the commission owed on `value` under `tiers`.
///
/// ## Algorithm
/// 1. Linear scan over the (small, unsorted) schedule.
/// 2. Keep tiers with `min_value ≤ value ≤ max_value` (inclusive both ends).
/// 3. Lowest `order` wins, then lowest `min_value`.
/// 4. `commission = value × percentage`, rounded half-up to centavos.
///
/// ## Example
/// ```rust
/// use orca_core::commission::resolve_commission;
/// use orca_core::money::Money;
/// use orca_core::types::{CommissionTier, Rate, Role};
///
/// let tiers = vec![CommissionTier {
///     role: Role::Vendor,
///     min_value: Money::zero(),
///     max_value: None,
///     percentage: Rate::from_bps(500),
///     order: 1,
/// }];
/// let resolution = resolve_commission(Money::from_major_minor(1_000, 0), &tiers).unwrap();
/// assert_eq!(resolution.amount, Money::from_major_minor(50, 0));
/// assert_eq!(resolution.matched_tier_order, Some(1));
/// ```
pub fn resolve_commission(
    value: Money,
    tiers: &[CommissionTier],
) -> CoreResult<CommissionResolution> {
    let matched = tiers
        .iter()
        .filter(|tier| tier.contains(value))
        .min_by_key(|tier| (tier.order, tier.min_value));

    match matched {
        Some(tier) => Ok(CommissionResolution {
            amount: value.apply_rate(tier.percentage)?,
            matched_tier_order: Some(tier.order),
        }),
        None => Ok(CommissionResolution::unmatched()),
    }
}

// =============================================================================
// Schedule Audit
// =============================================================================

/// A data-quality problem in a commission schedule.
///
/// None of these stop a calculation; they explain why a value might resolve
/// to no tier (or to a tier chosen by tie-break).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierScheduleIssue {
    /// No tiers configured at all.
    EmptySchedule,
    /// Values below the first band are uncovered.
    DoesNotStartAtZero { first_min: Money },
    /// `max_value < min_value`; the band can never match.
    InvertedRange { order: i32 },
    /// Percentage outside `[0, 1]`.
    PercentageOutOfRange { order: i32, percentage: Rate },
    /// Two tiers share the same `order`, so the tie-break is ambiguous.
    DuplicateOrder { order: i32 },
    /// Values in `[from, to]` fall between two bands.
    Gap {
        after_order: i32,
        before_order: i32,
        from: Money,
        to: Money,
    },
    /// Two bands cover some of the same values.
    Overlap { first_order: i32, second_order: i32 },
    /// The highest band has a ceiling; larger values are uncovered.
    BoundedTop { order: i32, max_value: Money },
}

/// Checks a schedule for gaps, overlaps and malformed bands.
///
/// ## What "Well-Formed" Means
/// ```text
///  0 ───────[order 1]───────┤├───────[order 2]───────┤├──[order 3]── ∞
///           min=0      max=X  min=X+0.01       max=Y  min=Y+0.01  max=None
/// ```
/// An empty result means the schedule partitions `[0, ∞)` exactly.
pub fn audit_tier_schedule(tiers: &[CommissionTier]) -> Vec<TierScheduleIssue> {
    let mut issues = Vec::new();

    if tiers.is_empty() {
        issues.push(TierScheduleIssue::EmptySchedule);
        return issues;
    }

    let mut seen_orders = BTreeSet::new();
    for tier in tiers {
        if !tier.percentage.is_fraction() {
            issues.push(TierScheduleIssue::PercentageOutOfRange {
                order: tier.order,
                percentage: tier.percentage,
            });
        }
        if tier.max_value.is_some_and(|max| max < tier.min_value) {
            issues.push(TierScheduleIssue::InvertedRange { order: tier.order });
        }
        if !seen_orders.insert(tier.order) {
            issues.push(TierScheduleIssue::DuplicateOrder { order: tier.order });
        }
    }

    // Coverage sweep over the bands that can actually match.
    let mut bands: Vec<&CommissionTier> = tiers
        .iter()
        .filter(|tier| tier.max_value.map_or(true, |max| max >= tier.min_value))
        .collect();
    bands.sort_by_key(|tier| (tier.min_value, tier.order));

    let Some(first) = bands.first() else {
        return issues;
    };

    if first.min_value.is_positive() {
        issues.push(TierScheduleIssue::DoesNotStartAtZero {
            first_min: first.min_value,
        });
    }

    // `None` ceiling means everything above is already covered.
    let mut covered_to = first.max_value;
    let mut covering_order = first.order;

    for tier in bands.iter().skip(1) {
        match covered_to {
            None => {
                issues.push(TierScheduleIssue::Overlap {
                    first_order: covering_order,
                    second_order: tier.order,
                });
                continue;
            }
            Some(ceiling) if tier.min_value <= ceiling => {
                issues.push(TierScheduleIssue::Overlap {
                    first_order: covering_order,
                    second_order: tier.order,
                });
            }
            Some(ceiling) if tier.min_value > next_cent(ceiling) => {
                issues.push(TierScheduleIssue::Gap {
                    after_order: covering_order,
                    before_order: tier.order,
                    from: next_cent(ceiling),
                    to: Money::from_cents(tier.min_value.cents() - 1),
                });
            }
            Some(_) => {}
        }

        let extends = match (covered_to, tier.max_value) {
            (_, None) => true,
            (Some(ceiling), Some(max)) => max > ceiling,
            (None, Some(_)) => false,
        };
        if extends {
            covered_to = tier.max_value;
            covering_order = tier.order;
        }
    }

    if let Some(max_value) = covered_to {
        issues.push(TierScheduleIssue::BoundedTop {
            order: covering_order,
            max_value,
        });
    }

    issues
}

#[inline]
fn next_cent(value: Money) -> Money {
    Money::from_cents(value.cents().saturating_add(1))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use rust_decimal_macros::dec;

    fn tier(order: i32, min: Money, max: Option<Money>, pct: Rate) -> CommissionTier {
        CommissionTier {
            role: Role::Vendor,
            min_value: min,
            max_value: max,
            percentage: pct,
            order,
        }
    }

    fn reais(major: i64, minor: i64) -> Money {
        Money::from_major_minor(major, minor)
    }

    /// ≤25,000 → 5%, 25,000.01–50,000 → 6%, >50,000 → 8%
    fn standard_schedule() -> Vec<CommissionTier> {
        vec![
            tier(1, Money::zero(), Some(reais(25_000, 0)), Rate::new(dec!(0.05))),
            tier(2, reais(25_000, 1), Some(reais(50_000, 0)), Rate::new(dec!(0.06))),
            tier(3, reais(50_000, 1), None, Rate::new(dec!(0.08))),
        ]
    }

    #[test]
    fn test_single_tier_not_progressive() {
        let resolution = resolve_commission(reais(40_000, 0), &standard_schedule()).unwrap();
        assert_eq!(resolution.amount, reais(2_400, 0));
        assert_eq!(resolution.matched_tier_order, Some(2));
        // A progressive scheme would have produced 2,150.00
        assert_ne!(resolution.amount, reais(2_150, 0));
    }

    #[test]
    fn test_top_tier_crossing_rounds_half_up() {
        let resolution = resolve_commission(reais(50_000, 1), &standard_schedule()).unwrap();
        assert_eq!(resolution.matched_tier_order, Some(3));
        // 50,000.01 × 8% = 4,000.0008
        assert_eq!(resolution.amount, reais(4_000, 0));
    }

    #[test]
    fn test_max_value_is_inclusive_at_every_boundary() {
        let schedule = standard_schedule();

        let at_first_max = resolve_commission(reais(25_000, 0), &schedule).unwrap();
        assert_eq!(at_first_max.matched_tier_order, Some(1));
        assert_eq!(at_first_max.amount, reais(1_250, 0));

        let at_second_min = resolve_commission(reais(25_000, 1), &schedule).unwrap();
        assert_eq!(at_second_min.matched_tier_order, Some(2));

        let at_second_max = resolve_commission(reais(50_000, 0), &schedule).unwrap();
        assert_eq!(at_second_max.matched_tier_order, Some(2));
        assert_eq!(at_second_max.amount, reais(3_000, 0));

        let at_zero = resolve_commission(Money::zero(), &schedule).unwrap();
        assert_eq!(at_zero.matched_tier_order, Some(1));
        assert!(at_zero.amount.is_zero());
    }

    #[test]
    fn test_unsorted_input() {
        let mut schedule = standard_schedule();
        schedule.reverse();
        let resolution = resolve_commission(reais(10_000, 0), &schedule).unwrap();
        assert_eq!(resolution.matched_tier_order, Some(1));
        assert_eq!(resolution.amount, reais(500, 0));
    }

    #[test]
    fn test_empty_schedule_is_unmatched() {
        let resolution = resolve_commission(reais(10_000, 0), &[]).unwrap();
        assert_eq!(resolution, CommissionResolution::unmatched());
        assert!(!resolution.is_matched());
    }

    #[test]
    fn test_gap_is_unmatched_not_defaulted() {
        let schedule = vec![
            tier(1, Money::zero(), Some(reais(10_000, 0)), Rate::new(dec!(0.05))),
            tier(2, reais(20_000, 0), None, Rate::new(dec!(0.07))),
        ];
        let resolution = resolve_commission(reais(15_000, 0), &schedule).unwrap();
        assert!(resolution.amount.is_zero());
        assert_eq!(resolution.matched_tier_order, None);
    }

    #[test]
    fn test_overlap_lowest_order_wins() {
        let schedule = vec![
            tier(5, Money::zero(), None, Rate::new(dec!(0.10))),
            tier(2, reais(1_000, 0), Some(reais(5_000, 0)), Rate::new(dec!(0.04))),
        ];
        let resolution = resolve_commission(reais(2_000, 0), &schedule).unwrap();
        assert_eq!(resolution.matched_tier_order, Some(2));
        assert_eq!(resolution.amount, reais(80, 0));
    }

    #[test]
    fn test_audit_well_formed_schedule() {
        assert!(audit_tier_schedule(&standard_schedule()).is_empty());
    }

    #[test]
    fn test_audit_empty() {
        assert_eq!(
            audit_tier_schedule(&[]),
            vec![TierScheduleIssue::EmptySchedule]
        );
    }

    #[test]
    fn test_audit_gap_and_bounded_top() {
        let schedule = vec![
            tier(1, Money::zero(), Some(reais(10_000, 0)), Rate::new(dec!(0.05))),
            tier(2, reais(20_000, 0), Some(reais(30_000, 0)), Rate::new(dec!(0.07))),
        ];
        let issues = audit_tier_schedule(&schedule);
        assert_eq!(
            issues,
            vec![
                TierScheduleIssue::Gap {
                    after_order: 1,
                    before_order: 2,
                    from: reais(10_000, 1),
                    to: reais(19_999, 99),
                },
                TierScheduleIssue::BoundedTop {
                    order: 2,
                    max_value: reais(30_000, 0),
                },
            ]
        );
    }

    #[test]
    fn test_audit_overlap_and_start() {
        let schedule = vec![
            tier(1, reais(100, 0), Some(reais(10_000, 0)), Rate::new(dec!(0.05))),
            tier(2, reais(10_000, 0), None, Rate::new(dec!(0.07))),
        ];
        let issues = audit_tier_schedule(&schedule);
        assert!(issues.contains(&TierScheduleIssue::DoesNotStartAtZero {
            first_min: reais(100, 0)
        }));
        assert!(issues.contains(&TierScheduleIssue::Overlap {
            first_order: 1,
            second_order: 2
        }));
    }

    #[test]
    fn test_audit_malformed_bands() {
        let schedule = vec![
            tier(1, Money::zero(), None, Rate::new(dec!(6))),
            tier(1, reais(500, 0), Some(reais(100, 0)), Rate::new(dec!(0.05))),
        ];
        let issues = audit_tier_schedule(&schedule);
        assert!(issues.contains(&TierScheduleIssue::PercentageOutOfRange {
            order: 1,
            percentage: Rate::new(dec!(6)),
        }));
        assert!(issues.contains(&TierScheduleIssue::InvertedRange { order: 1 }));
        assert!(issues.contains(&TierScheduleIssue::DuplicateOrder { order: 1 }));
    }
}

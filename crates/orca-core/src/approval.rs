//! # Discount Approval Policy
//!
//! Decides whether a requested discount needs escalation, and to whom.
//!
//! ## Three-Step Ladder
//! ```text
//! discount ─┬─ ≤ vendor limit ────────────────► NONE     (auto-approved)
//!           ├─ > vendor limit, ≤ manager limit ► MANAGER
//!           └─ > manager limit ────────────────► ADMIN
//! ```
//! A discount exactly at a limit stays on the lower step.
//!
//! The policy only decides. Opening and tracking an approval request is the
//! caller's job once `required` is true.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::{Rate, StoreConfig};

/// Who must sign off on a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum ApprovalLevel {
    None,
    Manager,
    Admin,
}

impl ApprovalLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ApprovalLevel::None => "none",
            ApprovalLevel::Manager => "manager",
            ApprovalLevel::Admin => "admin",
        }
    }
}

impl Default for ApprovalLevel {
    fn default() -> Self {
        ApprovalLevel::None
    }
}

impl fmt::Display for ApprovalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ApprovalDecision {
    pub required: bool,
    pub level: ApprovalLevel,
}

impl ApprovalDecision {
    pub const fn for_level(level: ApprovalLevel) -> Self {
        ApprovalDecision {
            required: !matches!(level, ApprovalLevel::None),
            level,
        }
    }
}

/// Places `discount` on the approval ladder.
///
/// ## Example
/// ```rust
/// use orca_core::approval::{evaluate_discount, ApprovalLevel};
/// use orca_core::types::Rate;
///
/// let vendor = Rate::from_bps(1000);  // 10%
/// let manager = Rate::from_bps(2000); // 20%
///
/// assert_eq!(evaluate_discount(Rate::from_bps(1000), vendor, manager).level, ApprovalLevel::None);
/// assert_eq!(evaluate_discount(Rate::from_bps(2000), vendor, manager).level, ApprovalLevel::Manager);
/// assert_eq!(evaluate_discount(Rate::from_bps(2001), vendor, manager).level, ApprovalLevel::Admin);
/// ```
pub fn evaluate_discount(
    discount: Rate,
    vendor_limit: Rate,
    manager_limit: Rate,
) -> ApprovalDecision {
    let level = if discount <= vendor_limit {
        ApprovalLevel::None
    } else if discount <= manager_limit {
        ApprovalLevel::Manager
    } else {
        ApprovalLevel::Admin
    };

    ApprovalDecision::for_level(level)
}

/// Evaluates `discount` against a store's configured limits.
pub fn evaluate_for_store(discount: Rate, config: &StoreConfig) -> ApprovalDecision {
    evaluate_discount(
        discount,
        config.vendor_discount_limit,
        config.manager_discount_limit,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

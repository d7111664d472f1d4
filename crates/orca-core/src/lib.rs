//! # orca-core: Budget Calculation Engine
//!
//! This crate prices furniture budgets ("orçamentos"). It contains all
//! pricing rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Orca Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Request handler / `price` binary (orca-db)            │   │
//! │  │   loads StoreConfig + tier tables ──► PricingContext            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ orca-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐   ┌────────────┐   ┌────────────────────┐     │   │
//! │  │   │ commission │──►│   costs    │──►│      budget        │     │   │
//! │  │   │  resolver  │   │ aggregator │   │   orchestrator     │     │   │
//! │  │   └────────────┘   └────────────┘   └─────────┬──────────┘     │   │
//! │  │                                               │                 │   │
//! │  │                              ┌────────────────▼───┐             │   │
//! │  │                              │  approval policy   │             │   │
//! │  │                              └────────────────────┘             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ BudgetCalculation                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        orca-db: persistence, numbering, approval requests       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Rate, Role, CommissionTier, StoreConfig, ...)
//! - [`money`] - Money type with integer centavos (no floating point!)
//! - [`commission`] - Single-tier commission resolver and schedule audit
//! - [`costs`] - Cost aggregator and margin
//! - [`approval`] - Discount approval ladder
//! - [`budget`] - Orchestrator producing `BudgetCalculation`
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, byte for byte
//! 2. **No I/O**: collaborators hand in plain values
//! 3. **Integer Money**: centavos in i64, rates as exact decimal fractions
//! 4. **Round Once**: every cost line rounds half-up when produced
//! 5. **Explicit Errors**: typed errors; data gaps become warnings, not guesses
//!
//! ## Example Usage
//!
//! ```rust
//! use orca_core::{BudgetEngine, BudgetInput, Money, PricingContext, Rate};
//!
//! let engine = BudgetEngine::default();
//! let input = BudgetInput {
//!     store_id: "loja-1".into(),
//!     vendor_id: "vendedor-7".into(),
//!     manager_id: "gerente-2".into(),
//!     ambient_value: Money::from_major_minor(50_000, 0),
//!     discount: Rate::from_bps(2000), // 20%
//!     additional_costs: vec![],
//!     measurer_cost: None,
//!     assembly_cost: None,
//! };
//!
//! let calc = engine.calculate(&input, &PricingContext::default()).unwrap();
//! assert_eq!(calc.final_value, Money::from_major_minor(40_000, 0));
//! assert!(calc.approval.required);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod approval;
pub mod budget;
pub mod commission;
pub mod costs;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use approval::{ApprovalDecision, ApprovalLevel};
pub use budget::{BudgetCalculation, BudgetEngine, BudgetInput, CalculationWarning, PricingContext};
pub use commission::{CommissionResolution, TierScheduleIssue};
pub use costs::CostBreakdown;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum additional cost lines on one budget.
///
/// ## Business Reason
/// Budgets carry a handful of ad hoc lines (hoisting, stone tops, travel);
/// hundreds indicate an import bug upstream.
pub const MAX_ADDITIONAL_COSTS: usize = 100;

/// Maximum length of an additional cost description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Maximum length of store/staff/client identifiers.
pub const MAX_IDENTIFIER_LEN: usize = 64;

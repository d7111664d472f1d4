//! # Repository Module
//!
//! Database repository implementations for Orca.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  BudgetService                                                         │
//! │       │                                                                 │
//! │       ├── StoreConfigRepository     get_or_create, upsert              │
//! │       ├── CommissionTierRepository  list, replace_schedule             │
//! │       ├── BudgetRepository          insert, get_by_id, list_by_store   │
//! │       └── ApprovalRepository        open, resolve, get_for_budget      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Column Conventions
//! Money columns hold centavos (`*_cents`, INTEGER). Rates are stored as the
//! decimal string `Rate` displays (`"0.06"`) and parsed back on read.

pub mod approval;
pub mod budget;
pub mod commission_tier;
pub mod store_config;

use orca_core::Rate;

use crate::error::{DbError, DbResult};

/// Parses a rate column, naming the column on failure.
pub(crate) fn parse_rate(column: &str, raw: &str) -> DbResult<Rate> {
    raw.parse().map_err(|e| DbError::invalid_data(column, e))
}

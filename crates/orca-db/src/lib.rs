//! # orca-db: Persistence Layer for Orca
//!
//! This crate provides the data collaborators of the budget engine and the
//! service that ties them together. It uses SQLite with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orca Data Flow                                   │
//! │                                                                         │
//! │  Request handler / `price` binary                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     orca-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │ BudgetService │───►│  Repositories  │──►│   Database   │   │   │
//! │  │   │ (service.rs)  │    │ store_config   │   │  (pool.rs)   │   │   │
//! │  │   │               │    │ commission_tier│   │  SqlitePool  │   │   │
//! │  │   │               │    │ budget         │   │  Migrations  │   │   │
//! │  │   │               │    │ approval       │   │              │   │   │
//! │  │   └───────┬───────┘    └────────────────┘   └──────────────┘   │   │
//! │  │           │ PricingContext                                      │   │
//! │  │           ▼                                                     │   │
//! │  │   orca_core::BudgetEngine (pure)                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (ORCA_DATABASE_PATH)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`service`] - Load → price → persist
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orca_db::{BudgetService, Database, OrcaConfig};
//!
//! let config = OrcaConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let service = BudgetService::new(db);
//!
//! let calculation = service.price(&input).await?;
//! let stored = service.create("cliente-42", &input).await?;
//! println!("{}", stored.budget_number); // ORC-000001
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, OrcaConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::BudgetService;

// Repository re-exports for convenience
pub use repository::approval::{ApprovalRepository, ApprovalRequest, ApprovalStatus, Resolution};
pub use repository::budget::{BudgetRepository, BudgetStatus, NewBudget, StoredBudget};
pub use repository::commission_tier::CommissionTierRepository;
pub use repository::store_config::{ProvisionedConfig, StoreConfigRepository};

//! # teknoroma-db: Database Layer for TeknoRoma
//!
//! SQLite persistence for the TeknoRoma retail chain, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TeknoRoma Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Service (sale workflow, stock, reports)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  teknoroma-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (per table)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 0001_initial │  │   │
//! │  │   │ UnitOfWork    │    │ SaleRepo      │    │ _schema.sql  │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`unit_of_work`] - Explicit transactions spanning several repositories
//! - [`repository`] - Repository implementations (product, sale, report, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use teknoroma_db::{Database, DbConfig, ProductRepository};
//!
//! let db = Database::new(DbConfig::new("teknoroma.db")).await?;
//!
//! // Single statements run on the pool
//! let critical = db.products().list_critical().await?;
//!
//! // Multi-statement writes run in a unit of work
//! let mut uow = db.begin().await?;
//! ProductRepository::decrement_stock_in(uow.conn(), &product_id, 2).await?;
//! uow.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::{
    CategoryRepository, CustomerRepository, DepartmentRepository, EmployeeRepository, ExpenseFilter,
    ExpenseRepository, ProductFilter, ProductRepository, ReportRepository, SaleFilter, SaleRepository,
    SequenceRepository, StockChange, StoreRepository, SupplierRepository, SupplierTransactionFilter,
    SupplierTransactionRepository, TechnicalServiceFilter, TechnicalServiceRepository,
};
pub use repository::sale::load_with_details_in;

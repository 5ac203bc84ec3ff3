//! # Repository Module
//!
//! Database repository implementations for TeknoRoma.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (apps/api)                                                    │
//! │       │                                                                 │
//! │       ├── db.products().list(Visibility::Active)     pool, one stmt    │
//! │       │                                                                 │
//! │       └── let mut uow = db.begin()                                     │
//! │           ProductRepository::decrement_stock_in(uow.conn(), ..)        │
//! │           SaleRepository::insert_in(uow.conn(), ..)                    │
//! │           uow.commit()                         transaction, many stmts │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  • Methods on `&self` run on the pool                                  │
//! │  • Associated `*_in(conn, ..)` functions run inside a UnitOfWork       │
//! │  • Every list takes an explicit `Visibility`                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

pub mod category;
pub mod customer;
pub mod department;
pub mod employee;
pub mod expense;
pub mod product;
pub mod report;
pub mod sale;
pub mod sequence;
pub mod store;
pub mod supplier;
pub mod supplier_transaction;
pub mod technical_service;

pub use category::CategoryRepository;
pub use customer::CustomerRepository;
pub use department::DepartmentRepository;
pub use employee::EmployeeRepository;
pub use expense::{ExpenseFilter, ExpenseRepository};
pub use product::{ProductFilter, ProductRepository, StockChange};
pub use report::ReportRepository;
pub use sale::{SaleFilter, SaleRepository};
pub use sequence::SequenceRepository;
pub use store::StoreRepository;
pub use supplier::SupplierRepository;
pub use supplier_transaction::{SupplierTransactionFilter, SupplierTransactionRepository};
pub use technical_service::{TechnicalServiceFilter, TechnicalServiceRepository};

/// Generates a new entity id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Flips the soft-delete flag of one row.
///
/// Deleting requires the row to be active; restoring only requires it to
/// exist. `table` is always a crate-internal constant.
pub(crate) async fn set_deleted(
    pool: &SqlitePool,
    table: &'static str,
    entity: &'static str,
    id: &str,
    deleted: bool,
) -> DbResult<()> {
    debug!(table = table, id = %id, deleted = deleted, "Setting soft-delete flag");

    let sql = if deleted {
        format!("UPDATE {table} SET is_deleted = 1, modified_at = ? WHERE id = ? AND is_deleted = 0")
    } else {
        format!("UPDATE {table} SET is_deleted = 0, modified_at = ? WHERE id = ?")
    };

    let result = sqlx::query(&sql)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(entity, id));
    }

    Ok(())
}

//! # Domain Types
//!
//! Core domain types used throughout TeknoRoma.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  catalog      Category ◄── Product ──► Supplier                         │
//! │                              ▲                                          │
//! │  sales        Sale ──► SaleDetail (name/price snapshot)                 │
//! │                │                                                        │
//! │  people       ├──► Customer     Employee ──► Store ◄── Department       │
//! │               └──► Employee                                             │
//! │                                                                         │
//! │  operations   Expense   TechnicalService   SupplierTransaction          │
//! │                                                                         │
//! │  Relations are plain foreign-key ids; no navigation graphs.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Common Base Shape
//! Every record carries `id` (UUID v4), `is_deleted` (soft delete) and the
//! audit pair `created_at` / `modified_at`, stamped by the persistence layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

mod catalog;
mod operations;
mod people;
mod sales;

pub use catalog::{Category, Product, Supplier};
pub use operations::{Expense, SupplierTransaction, TechnicalService};
pub use people::{Customer, Department, Employee, Store};
pub use sales::{Sale, SaleDetail, SaleWithDetails};

// =============================================================================
// Visibility
// =============================================================================

/// Which rows a list/query operation returns with respect to soft delete.
///
/// Every repository list function takes this explicitly, so no query can
/// silently bypass the soft-delete filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only rows with `is_deleted = 0` (the default).
    #[default]
    Active,
    /// Soft-deleted rows too.
    IncludeDeleted,
}

impl Visibility {
    /// Maps an `include_deleted` query flag to a visibility.
    pub fn from_flag(include_deleted: bool) -> Self {
        if include_deleted {
            Visibility::IncludeDeleted
        } else {
            Visibility::Active
        }
    }

    /// Whether soft-deleted rows are included.
    #[inline]
    pub fn includes_deleted(&self) -> bool {
        matches!(self, Visibility::IncludeDeleted)
    }
}

// =============================================================================
// Stock Status
// =============================================================================

/// Denormalized classification of a product's stock level.
///
/// Always equal to [`crate::stock::classify`] of the product's current
/// `units_in_stock` and `critical_stock_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Sufficient,
    Critical,
    OutOfStock,
}

impl StockStatus {
    pub const ALL: [StockStatus; 3] = [
        StockStatus::Sufficient,
        StockStatus::Critical,
        StockStatus::OutOfStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Sufficient => "sufficient",
            StockStatus::Critical => "critical",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }

    /// Severity rank: higher is worse.
    pub fn severity(&self) -> u8 {
        match self {
            StockStatus::Sufficient => 0,
            StockStatus::Critical => 1,
            StockStatus::OutOfStock => 2,
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// ```text
///  Pending ──confirm payment──► Preparing ──fulfil──► Completed
///     │                             │
///     └───────────cancel────────────┴──► Cancelled (stock restored)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Created, stock already reserved.
    #[default]
    Pending,
    /// Payment confirmed, goods being prepared.
    Preparing,
    /// Handed over. Terminal.
    Completed,
    /// Cancelled before completion. Terminal.
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Preparing => "preparing",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    Installment,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::CreditCard => "credit_card",
            PaymentType::DebitCard => "debit_card",
            PaymentType::BankTransfer => "bank_transfer",
            PaymentType::Installment => "installment",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Role
// =============================================================================

/// Employee role. Also the key of role-based notification groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    StoreManager,
    Cashier,
    MobileSales,
    Warehouse,
    Accounting,
    TechnicalService,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::StoreManager => "store_manager",
            Role::Cashier => "cashier",
            Role::MobileSales => "mobile_sales",
            Role::Warehouse => "warehouse",
            Role::Accounting => "accounting",
            Role::TechnicalService => "technical_service",
        }
    }

    /// Parses the snake_case name used in URLs and the database.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "store_manager" => Some(Role::StoreManager),
            "cashier" => Some(Role::Cashier),
            "mobile_sales" => Some(Role::MobileSales),
            "warehouse" => Some(Role::Warehouse),
            "accounting" => Some(Role::Accounting),
            "technical_service" => Some(Role::TechnicalService),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Gender
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Other => "other",
        }
    }
}

// =============================================================================
// Currency
// =============================================================================

/// Currencies an expense can be recorded in. Reports are always in TRY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Try,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// ISO 4217 code, as used by the central-bank feed.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Try => "TRY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        match code.trim().to_ascii_uppercase().as_str() {
            "TRY" => Some(Currency::Try),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            _ => None,
        }
    }

    /// Foreign currencies that need a rate snapshot.
    pub const FOREIGN: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Gbp];
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Expense Type
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    EmployeePayment,
    Rent,
    Utility,
    SupplierPayment,
    Maintenance,
    Tax,
    Other,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::EmployeePayment => "employee_payment",
            ExpenseType::Rent => "rent",
            ExpenseType::Utility => "utility",
            ExpenseType::SupplierPayment => "supplier_payment",
            ExpenseType::Maintenance => "maintenance",
            ExpenseType::Tax => "tax",
            ExpenseType::Other => "other",
        }
    }
}

// =============================================================================
// Ticket Priority / Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// Technical-service ticket status. Transitions live in [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    WaitingForParts,
    Resolved,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::WaitingForParts => "waiting_for_parts",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn test_visibility_from_flag() {
        assert_eq!(Visibility::from_flag(false), Visibility::Active);
        assert!(Visibility::from_flag(true).includes_deleted());
        assert_eq!(Visibility::default(), Visibility::Active);
    }

    #[test]
    fn test_enum_names_match_serde() {
        assert_eq!(
            serde_json::to_string(&StockStatus::OutOfStock).unwrap(),
            format!("\"{}\"", StockStatus::OutOfStock.as_str())
        );
        assert_eq!(
            serde_json::to_string(&PaymentType::CreditCard).unwrap(),
            "\"credit_card\""
        );
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        assert_eq!(
            serde_json::to_string(&TicketStatus::WaitingForParts).unwrap(),
            "\"waiting_for_parts\""
        );
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            Role::Admin,
            Role::StoreManager,
            Role::Cashier,
            Role::MobileSales,
            Role::Warehouse,
            Role::Accounting,
            Role::TechnicalService,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::from_code("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_code("XYZ"), None);
        assert_eq!(Currency::Try.to_string(), "TRY");
    }
}

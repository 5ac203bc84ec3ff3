//! # teknoroma-core: Pure Business Logic for TeknoRoma
//!
//! This crate is the **heart** of TeknoRoma. It contains the retail domain
//! model and every business rule as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TeknoRoma Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Dashboards (per role) / REST clients               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + WebSocket                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    SaleService, StockService, ReportService, ...                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ teknoroma-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐  │   │
//! │  │  │ money   │ │ stock   │ │ pricing │ │lifecycle │ │numbering│  │   │
//! │  │  │ Money   │ │classify │ │ lines   │ │SaleStatus│ │S-YYYY-N │  │   │
//! │  │  │ Rate    │ │ alerts  │ │commisn. │ │ Ticket   │ │G/TS/TH  │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └──────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 teknoroma-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, unit of work, reports        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities and enums (Product, Sale, Expense, ...)
//! - [`money`] - Money, Rate and ExchangeRate with integer arithmetic
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Input validation rules
//! - [`stock`] - Stock status classifier
//! - [`pricing`] - Sale line/total math and commission
//! - [`lifecycle`] - Sale and ticket status state machines
//! - [`numbering`] - Per-year sequential document numbers
//! - [`reports`] - Report output shapes and their derived figures
//!
//! ## Example Usage
//!
//! ```rust
//! use teknoroma_core::money::Money;
//! use teknoroma_core::pricing::{price_line, SaleTotals};
//! use teknoroma_core::Rate;
//!
//! let line = price_line(Money::from_cents(10_000), 2, Rate::from_percentage(10.0)).unwrap();
//! assert_eq!(line.total.cents(), 18_000);
//!
//! let totals = SaleTotals::compute(&[line], Money::zero()).unwrap();
//! assert_eq!(totals.tax.cents(), 3_600); // 20% VAT
//! assert_eq!(totals.total.cents(), 21_600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod numbering;
pub mod pricing;
pub mod reports;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::{ExchangeRate, Money, Rate};
pub use numbering::DocumentKind;
pub use stock::classify;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// VAT applied to every sale subtotal (20%).
pub const SALE_TAX_RATE: Rate = Rate::from_bps(2000);

/// Default monthly sales quota per employee (10,000.00 TRY).
pub const DEFAULT_MONTHLY_QUOTA: Money = Money::from_cents(1_000_000);

/// Commission paid on sales above the monthly quota (10%).
pub const COMMISSION_RATE: Rate = Rate::from_bps(1000);

/// Look-back window for the unsold-products report.
pub const DEFAULT_UNSOLD_DAYS: i64 = 90;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum number of lines in a single sale.
pub const MAX_SALE_LINES: usize = 100;

/// Largest price, salary, quota or expense amount accepted (₺100,000,000.00).
///
/// With [`MAX_STOCK_UNITS`] this keeps every price × quantity product and
/// every sale total well inside i64 kuruş.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

/// Largest stock level, or stock movement, accepted in one request.
pub const MAX_STOCK_UNITS: i64 = 10_000_000;

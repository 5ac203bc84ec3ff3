//! # Services
//!
//! Business workflows between the HTTP routes and the repositories.
//!
//! ```text
//! services/
//! ├── sale.rs              ◄─── CreateSale, ConfirmPayment, Complete, Cancel
//! ├── stock.rs             ◄─── Increase / Decrease / Adjust
//! ├── catalog.rs           ◄─── Categories, suppliers, products
//! ├── people.rs            ◄─── Stores, departments, customers, employees
//! ├── expense.rs           ◄─── Expenses with rate snapshots
//! ├── ticket.rs            ◄─── Technical-service tickets
//! ├── supplier_delivery.rs ◄─── Supplier transactions + stock intake
//! ├── report.rs            ◄─── Reporting aggregator
//! ├── exchange_rate.rs     ◄─── Cached currency rates
//! └── notification.rs      ◄─── Notifier trait + broadcast hub
//! ```
//!
//! Services own a cloned [`teknoroma_db::Database`] handle and return
//! [`crate::error::ServiceResult`]. Multi-statement writes run in one
//! `UnitOfWork`; notifications are published only after commit.

pub mod catalog;
pub mod exchange_rate;
pub mod expense;
pub mod notification;
pub mod people;
pub mod report;
pub mod sale;
pub mod stock;
pub mod supplier_delivery;
pub mod ticket;

pub use catalog::CatalogService;
pub use exchange_rate::ExchangeRateService;
pub use expense::ExpenseService;
pub use notification::{NotificationHub, Notifier};
pub use people::PeopleService;
pub use report::ReportService;
pub use sale::SaleService;
pub use stock::StockService;
pub use supplier_delivery::SupplierDeliveryService;
pub use ticket::TicketService;

//! Business logic services for the Point of Sale & Inventory Platform

pub mod auth;
pub mod customer;
pub mod product;
pub mod report;
pub mod request;
pub mod reversal;
pub mod stock;
pub mod transaction;
pub mod workflow;

pub use auth::AuthService;
pub use customer::CustomerService;
pub use product::ProductService;
pub use report::ReportService;
pub use request::ProductRequestService;
pub use reversal::ReversalService;
pub use stock::StockService;
pub use transaction::TransactionService;

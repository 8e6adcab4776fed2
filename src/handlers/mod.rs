//! HTTP handlers for the Point of Sale & Inventory Platform

pub mod auth;
pub mod customer;
pub mod health;
pub mod product;
pub mod report;
pub mod request;
pub mod reversal;
pub mod stock;
pub mod transaction;

pub use auth::*;
pub use customer::*;
pub use health::*;
pub use product::*;
pub use report::*;
pub use request::*;
pub use reversal::*;
pub use stock::*;
pub use transaction::*;

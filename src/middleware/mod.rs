//! Middleware for the Point of Sale & Inventory Platform

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};

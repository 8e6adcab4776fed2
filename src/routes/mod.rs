//! Route definitions for the Point of Sale & Inventory Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public login/refresh, protected account management)
        .nest("/auth", auth_routes())
        // Protected routes - product catalog
        .nest("/products", product_routes())
        // Protected routes - stock ledger and movement workflow
        .nest("/stock", stock_routes())
        // Protected routes - product requests
        .nest("/requests", request_routes())
        // Protected routes - sales transactions
        .nest("/transactions", transaction_routes())
        // Protected routes - reversal workflow
        .nest("/reversals", reversal_routes())
        // Protected routes - customer directory
        .nest("/customers", customer_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .merge(protected_auth_routes())
}

/// Account management routes (protected)
fn protected_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register_user))
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        // Movements
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::submit_movement),
        )
        .route("/movements/:movement_id/approve", post(handlers::approve_movement))
        .route("/movements/:movement_id/reject", post(handlers::reject_movement))
        // Derived levels
        .route("/levels", get(handlers::list_stock_levels))
        .route("/levels/:product_id", get(handlers::get_stock_level))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product request routes (protected)
fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_requests).post(handlers::submit_request))
        .route("/:request_id/approve", post(handlers::approve_request))
        .route("/:request_id/reject", post(handlers::reject_request))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sales transaction routes (protected)
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/:transaction_id", get(handlers::get_transaction))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reversal workflow routes (protected)
fn reversal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_reversals).post(handlers::request_reversal))
        .route("/:request_id/approve", post(handlers::approve_reversal))
        .route("/:request_id/reject", post(handlers::reject_reversal))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer directory routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_customers).post(handlers::create_customer))
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/sales/summary", get(handlers::get_sales_summary))
        .route("/sales/top-products", get(handlers::get_top_products))
        .route("/stock", get(handlers::get_stock_report))
        .route_layer(middleware::from_fn(auth_middleware))
}

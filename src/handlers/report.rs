//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::report::{ReportRange, ReportService, SalesSummary, TopProduct};
use crate::services::stock::{StockLevel, StockService};
use crate::AppState;

/// Query parameters for top products
#[derive(Debug, Deserialize)]
pub struct TopProductsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Sales summary over a date range (owner only)
pub async fn get_sales_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(range): Query<ReportRange>,
) -> AppResult<Json<SalesSummary>> {
    let service = ReportService::new(state.db);
    let summary = service.sales_summary(&current_user.0, range).await?;
    Ok(Json(summary))
}

/// Best-selling products over a date range (owner only)
pub async fn get_top_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TopProductsQuery>,
) -> AppResult<Json<Vec<TopProduct>>> {
    let service = ReportService::new(state.db);
    let range = ReportRange {
        from: query.from,
        to: query.to,
    };
    let products = service
        .top_products(&current_user.0, range, query.limit.unwrap_or(10))
        .await?;
    Ok(Json(products))
}

/// Stock report: per-product base stock, approved in/out and derived stock
pub async fn get_stock_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockLevel>>> {
    let service = StockService::new(state.db);
    let levels = service.stock_levels().await?;
    Ok(Json(levels))
}

//! HTTP handlers for low-stock alert endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::low_stock::{LowStockReport, LowStockService};
use crate::AppState;

/// Get the low-stock alert batch for a company
pub async fn get_low_stock_alerts(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<LowStockReport>> {
    let service = LowStockService::new(state.db);
    let report = service.low_stock_report(company_id).await?;
    Ok(Json(report))
}

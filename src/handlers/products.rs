//! HTTP handlers for product catalog endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::services::product::{CreateProductInput, ProductCreated, ProductService};
use crate::AppState;

/// Create a product together with its initial inventory row
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<ProductCreated>)> {
    let service = ProductService::new(state.db);
    let created = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

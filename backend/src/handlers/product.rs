//! HTTP handlers for product endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::ProductView;
use crate::services::product::{ProductFilter, ProductLookupResponse};
use crate::services::ProductService;
use crate::AppState;

/// List products with derived expiry fields
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<ProductView>>> {
    let service = ProductService::new(state.db);
    let products = service.list(&filter).await?;
    Ok(Json(products))
}

/// Look a product up by (part of) its name
pub async fn lookup_product(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ProductLookupResponse>> {
    let service = ProductService::new(state.db);
    let lookup = service.lookup_by_name(&name).await?;
    Ok(Json(lookup))
}

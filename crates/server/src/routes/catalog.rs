//! Catalog query route handler.
//!
//! One endpoint serves every storefront browse surface: filters, sort keys
//! and the page window all come in as query parameters and compose freely.
//! See [`crate::catalog`] for the accepted parameters and how they combine.

use axum::{
    Json,
    extract::{RawQuery, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::CatalogQuery;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

use super::products::ProductView;

/// Response carrying one catalog page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub success: bool,
    pub message: String,
    pub products: Vec<ProductView>,
    /// Present only for bounded windows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

/// Run a composed catalog query.
///
/// GET /api/products
///
/// Parameters are parsed from the raw query string rather than a typed
/// extractor: repeated keys (`category=A&category=B`) all carry meaning,
/// and a typed map would collapse them.
///
/// # Errors
///
/// Returns `AppError::Validation` with field-keyed messages when any
/// parameter fails to normalize.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<CatalogResponse>> {
    let pairs: Vec<(String, String)> =
        url::form_urlencoded::parse(raw.as_deref().unwrap_or("").as_bytes())
            .into_owned()
            .collect();

    let query = CatalogQuery::from_pairs(&pairs).map_err(AppError::Validation)?;

    let page = ProductRepository::new(state.db())
        .catalog_page(&query)
        .await?;

    Ok(Json(CatalogResponse {
        success: true,
        message: "Products fetched".to_owned(),
        products: page.products.into_iter().map(ProductView::from).collect(),
        total_pages: page.total_pages,
    }))
}

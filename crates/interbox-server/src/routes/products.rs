use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::warn;

use interbox_core::catalog;
use interbox_core::models::Product;

use super::AppState;
use crate::error::ApiError;
use crate::extract::Caller;

/// Where a product list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Database,
    Fallback,
}

impl Source {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Fallback => "fallback",
        }
    }
}

/// Active products, or the compiled-in catalog when the store is down or
/// has none.
pub(super) async fn load_catalog(state: &AppState) -> (Vec<Product>, Source) {
    match state.store.list_products().await {
        Ok(products) if !products.is_empty() => (products, Source::Database),
        Ok(_) => {
            warn!("Product table is empty, serving fallback catalog");
            (catalog::fallback_products(), Source::Fallback)
        }
        Err(e) => {
            warn!(error = %e, "Product listing failed, serving fallback catalog");
            (catalog::fallback_products(), Source::Fallback)
        }
    }
}

/// `GET /get-products`
pub async fn list(
    State(state): State<AppState>,
    Caller(_): Caller,
) -> Result<Json<Value>, ApiError> {
    let (products, source) = load_catalog(&state).await;
    Ok(Json(json!({ "products": products, "source": source.as_str() })))
}

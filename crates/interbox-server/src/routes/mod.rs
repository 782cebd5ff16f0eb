//! HTTP routes.
//!
//! Paths keep the names the site already calls (`/save-inscricao`,
//! `/get-products`, ...) so the frontend needs no changes.

mod charges;
mod insurance;
mod products;
mod registrations;
mod webhook;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use interbox_core::auth::TokenManager;
use interbox_core::config::{ServerConfig, SplitConfig};
use interbox_core::pricing::Pricing;

use crate::mail::{Email, Mailer};
use crate::payments::PaymentGateway;
use crate::store::RecordStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub payments: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: TokenManager,
    pub pricing: Arc<Pricing>,
    pub split: Option<SplitConfig>,
    /// Expected `authorization` header on provider webhooks. Webhooks are
    /// refused while unset.
    pub webhook_secret: Option<String>,
}

impl AppState {
    /// Send without failing the request; the record is already stored.
    pub(crate) async fn send_best_effort(&self, email: &Email) {
        match self.mailer.send(email).await {
            Ok(()) => info!(subject = %email.subject, "E-mail sent"),
            Err(e) => warn!(error = %e, subject = %email.subject, "E-mail failed"),
        }
    }
}

pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/save-inscricao", post(registrations::save))
        .route(
            "/admin-inscricoes",
            get(registrations::list).post(registrations::update_status),
        )
        .route("/save-seguro", post(insurance::save))
        .route("/update-seguro-status", post(insurance::update_status))
        .route("/create-charge", post(charges::create))
        .route("/check-charge/{correlation_id}", get(charges::check))
        .route("/get-products", get(products::list))
        .route("/openpix-webhook", post(webhook::openpix))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// `GET /health`
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

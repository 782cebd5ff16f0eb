use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use interbox_core::models::{InsuranceForm, InsuranceStatus};

use super::AppState;
use crate::error::ApiError;
use crate::extract::{Admin, Caller, JsonBody};
use crate::mail::templates;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub id: String,
    pub status: String,
}

/// `POST /save-seguro`
pub async fn save(
    State(state): State<AppState>,
    Caller(_): Caller,
    JsonBody(form): JsonBody<InsuranceForm>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let row = form.validate(state.pricing.insurance_fee)?;
    let insurance = state.store.insert_insurance(&row).await?;
    info!(id = %insurance.id, status = %insurance.status, "Insurance request saved");
    state
        .send_best_effort(&templates::insurance_received(&insurance))
        .await;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "seguro": insurance })),
    ))
}

/// `POST /update-seguro-status` with `{id, status}`.
pub async fn update_status(
    State(state): State<AppState>,
    Admin(admin): Admin,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> Result<Json<Value>, ApiError> {
    let next: InsuranceStatus = update.status.trim().parse()?;
    let current = state.store.get_insurance(&update.id).await?;
    if current.status.transition(next)? == current.status {
        return Ok(Json(json!({ "success": true, "seguro": current })));
    }
    let updated = state.store.set_insurance_status(&update.id, next).await?;
    info!(
        id = %updated.id,
        from = %current.status,
        to = %updated.status,
        admin = %admin.sub,
        "Insurance status changed"
    );
    Ok(Json(json!({ "success": true, "seguro": updated })))
}

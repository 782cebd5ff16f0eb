use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use interbox_core::models::{
    RegistrationFilter, RegistrationForm, RegistrationStatus, RegistrationType,
};

use super::AppState;
use crate::error::ApiError;
use crate::extract::{Admin, Caller, JsonBody};
use crate::mail::templates;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub tipo: Option<String>,
    pub status: Option<String>,
}

impl ListParams {
    fn filter(&self) -> Result<RegistrationFilter, ApiError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        let kind = present(self.tipo.as_deref())
            .map(str::parse::<RegistrationType>)
            .transpose()?;
        let status = present(self.status.as_deref())
            .map(str::parse::<RegistrationStatus>)
            .transpose()?;
        Ok(RegistrationFilter { kind, status })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub id: String,
    pub status: String,
}

/// `POST /save-inscricao`
pub async fn save(
    State(state): State<AppState>,
    Caller(_): Caller,
    JsonBody(form): JsonBody<RegistrationForm>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let row = form.validate(&state.pricing)?;
    let registration = state.store.insert_registration(&row).await?;
    info!(
        id = %registration.id,
        tipo = %registration.kind,
        valor = registration.fee,
        "Registration saved"
    );
    state
        .send_best_effort(&templates::registration_received(&registration))
        .await;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "inscricao": registration })),
    ))
}

/// `GET /admin-inscricoes?tipo=judge&status=registered`
pub async fn list(
    State(state): State<AppState>,
    Admin(_): Admin,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let filter = params.filter()?;
    let rows = state.store.list_registrations(&filter).await?;
    Ok(Json(json!({ "total": rows.len(), "inscricoes": rows })))
}

/// `POST /admin-inscricoes` with `{id, status}`.
pub async fn update_status(
    State(state): State<AppState>,
    Admin(admin): Admin,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> Result<Json<Value>, ApiError> {
    let next: RegistrationStatus = update.status.trim().parse()?;
    let current = state.store.get_registration(&update.id).await?;
    if current.status.transition(next)? == current.status {
        return Ok(Json(json!({ "success": true, "inscricao": current })));
    }
    let updated = state
        .store
        .set_registration_status(&update.id, next)
        .await?;
    info!(
        id = %updated.id,
        from = %current.status,
        to = %updated.status,
        admin = %admin.sub,
        "Registration status changed"
    );
    Ok(Json(json!({ "success": true, "inscricao": updated })))
}

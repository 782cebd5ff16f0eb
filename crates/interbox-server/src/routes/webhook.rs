//! OpenPix webhook.
//!
//! The provider retries on any non-2xx answer, so only failures worth a
//! retry (store unreachable) produce one. Events we cannot act on are
//! acknowledged with `handled: false`.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use interbox_core::models::{
    Charge, ChargeKind, CorrelationId, InsuranceStatus, RegistrationStatus,
};

use super::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::mail::{Email, templates};
use crate::store::StoreError;

pub const CHARGE_COMPLETED: &str = "OPENPIX:CHARGE_COMPLETED";

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub charge: Option<Charge>,
}

enum Settlement {
    /// Record moved to paid; confirmation to send, if any.
    Paid(Option<Email>),
    /// Nothing changed (already paid, unknown record, cancelled).
    Skipped(&'static str),
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.webhook_secret.as_deref() else {
        warn!("Webhook received but no webhook secret is configured");
        return Err(ApiError::Unauthorized);
    };
    let given = headers.get(AUTHORIZATION).map(|v| v.as_bytes());
    if !given.is_some_and(|given| secret_matches(given, expected.as_bytes())) {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Constant-time in the content; a length mismatch fails early.
fn secret_matches(given: &[u8], expected: &[u8]) -> bool {
    given.ct_eq(expected).into()
}

fn ignore_missing<T>(result: Result<T, StoreError>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(StoreError::NotFound(what)) => {
            warn!(record = %what, "Paid charge references an unknown record");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn settle(
    state: &AppState,
    correlation_id: &CorrelationId,
    charge: &Charge,
) -> Result<Settlement, ApiError> {
    let reference = correlation_id.reference.as_str();
    match correlation_id.kind {
        ChargeKind::Inscricao => {
            let found = ignore_missing(state.store.get_registration(reference).await)?;
            let Some(registration) = found else {
                return Ok(Settlement::Skipped("unknown inscricao"));
            };
            if registration.status == RegistrationStatus::Paid {
                return Ok(Settlement::Skipped("already paid"));
            }
            if let Err(e) = registration.status.transition(RegistrationStatus::Paid) {
                warn!(id = %registration.id, error = %e, "Payment for a closed registration");
                return Ok(Settlement::Skipped("registration closed"));
            }
            let updated = state
                .store
                .set_registration_status(reference, RegistrationStatus::Paid)
                .await?;
            let what = format!("inscrição {}", updated.kind.label());
            Ok(Settlement::Paid(Some(templates::payment_confirmed(
                &updated.email,
                &updated.name,
                &what,
                charge.value,
            ))))
        }
        ChargeKind::Seguro => {
            let found = ignore_missing(state.store.get_insurance(reference).await)?;
            let Some(insurance) = found else {
                return Ok(Settlement::Skipped("unknown seguro"));
            };
            if insurance.status == InsuranceStatus::PagoConfirmado {
                return Ok(Settlement::Skipped("already paid"));
            }
            let updated = state
                .store
                .set_insurance_status(reference, InsuranceStatus::PagoConfirmado)
                .await?;
            Ok(Settlement::Paid(Some(templates::payment_confirmed(
                &updated.email,
                &updated.name,
                "seguro",
                charge.value,
            ))))
        }
        ChargeKind::Ticket | ChargeKind::Product => {
            let what = match correlation_id.kind {
                ChargeKind::Ticket => format!("ingresso {reference}"),
                _ => "pedido na loja".to_string(),
            };
            let email = charge
                .customer
                .as_ref()
                .filter(|c| !c.email.is_empty())
                .map(|c| templates::payment_confirmed(&c.email, &c.name, &what, charge.value));
            Ok(Settlement::Paid(email))
        }
    }
}

/// `POST /openpix-webhook`
pub async fn openpix(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(event): JsonBody<WebhookEvent>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;

    let completed = event.event.as_deref() == Some(CHARGE_COMPLETED);
    let Some(charge) = event.charge.filter(|_| completed) else {
        debug!(event = ?event.event, "Ignoring webhook event");
        return Ok(Json(json!({ "received": true, "handled": false })));
    };

    let correlation_id: CorrelationId = match charge.correlation_id.parse() {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Paid charge with a foreign correlation ID");
            return Ok(Json(json!({ "received": true, "handled": false })));
        }
    };

    match settle(&state, &correlation_id, &charge).await? {
        Settlement::Paid(email) => {
            info!(
                correlation_id = %correlation_id,
                value = charge.value,
                "Payment confirmed"
            );
            if let Some(email) = email {
                state.send_best_effort(&email).await;
            }
            Ok(Json(json!({ "received": true, "handled": true })))
        }
        Settlement::Skipped(reason) => {
            info!(correlation_id = %correlation_id, reason, "Payment webhook skipped");
            Ok(Json(json!({ "received": true, "handled": false, "reason": reason })))
        }
    }
}

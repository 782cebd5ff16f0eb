//! PIX charge creation and status checks.
//!
//! The charge value is always computed here from server-side prices; the
//! browser only says what is being paid for.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use interbox_core::models::{
    CartItem, ChargeKind, CorrelationId, Customer, InsuranceStatus, Quote, RegistrationStatus,
};

use super::AppState;
use super::products::load_catalog;
use crate::error::ApiError;
use crate::extract::{Caller, JsonBody};
use crate::payments::{ChargeRequest, split};

const fn one() -> i64 {
    1
}

/// What the browser wants to pay for.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChargeTarget {
    Ticket {
        lot: String,
        #[serde(default = "one", alias = "quantidade")]
        quantity: i64,
        #[serde(default)]
        customer: Option<Customer>,
    },
    Product {
        items: Vec<CartItem>,
        #[serde(default)]
        customer: Option<Customer>,
    },
    Inscricao {
        id: String,
    },
    Seguro {
        id: String,
    },
}

/// A priced charge ready to send to the provider.
struct Priced {
    correlation_id: CorrelationId,
    value: i64,
    comment: String,
    customer: Option<Customer>,
    quote: Option<Quote>,
}

async fn price(state: &AppState, target: ChargeTarget) -> Result<Priced, ApiError> {
    match target {
        ChargeTarget::Ticket {
            lot,
            quantity,
            customer,
        } => {
            let value = state.pricing.ticket_total(&lot, quantity)?;
            Ok(Priced {
                correlation_id: CorrelationId::new(ChargeKind::Ticket, &lot),
                value,
                comment: format!("{quantity}x ingresso {lot}"),
                customer,
                quote: None,
            })
        }
        ChargeTarget::Product { items, customer } => {
            let (catalog, _) = load_catalog(state).await;
            let quote = Quote::build(&catalog, &items)?;
            Ok(Priced {
                correlation_id: CorrelationId::new(ChargeKind::Product, "cart"),
                value: quote.total,
                comment: quote.describe(),
                customer,
                quote: Some(quote),
            })
        }
        ChargeTarget::Inscricao { id } => {
            let registration = state.store.get_registration(&id).await?;
            if registration.status != RegistrationStatus::Registered {
                return Err(ApiError::Conflict(format!(
                    "inscrição está '{}'",
                    registration.status
                )));
            }
            if registration.fee <= 0 {
                return Err(ApiError::BadRequest("inscrição sem taxa".into()));
            }
            Ok(Priced {
                correlation_id: CorrelationId::new(ChargeKind::Inscricao, &registration.id),
                value: registration.fee,
                comment: format!("Inscrição {}", registration.kind.label()),
                customer: Some(Customer {
                    name: registration.name,
                    email: registration.email,
                    phone: Some(registration.phone),
                    tax_id: registration.cpf,
                }),
                quote: None,
            })
        }
        ChargeTarget::Seguro { id } => {
            let insurance = state.store.get_insurance(&id).await?;
            if insurance.status == InsuranceStatus::PagoConfirmado {
                return Err(ApiError::Conflict("seguro já pago".into()));
            }
            Ok(Priced {
                correlation_id: CorrelationId::new(ChargeKind::Seguro, &insurance.id),
                value: insurance.fee,
                comment: "Seguro INTERBØX 2025".to_string(),
                customer: Some(Customer {
                    name: insurance.name,
                    email: insurance.email,
                    phone: Some(insurance.phone),
                    tax_id: insurance.cpf,
                }),
                quote: None,
            })
        }
    }
}

/// Remember which charge pays for a stored record. Runs before the charge
/// exists so a store failure never leaves a payable charge unlinked.
async fn link_record(state: &AppState, correlation_id: &CorrelationId) -> Result<(), ApiError> {
    let id = correlation_id.to_string();
    match correlation_id.kind {
        ChargeKind::Inscricao => {
            state
                .store
                .set_registration_charge(&correlation_id.reference, &id)
                .await?;
        }
        ChargeKind::Seguro => {
            state
                .store
                .set_insurance_charge(&correlation_id.reference, &id)
                .await?;
        }
        ChargeKind::Ticket | ChargeKind::Product => {}
    }
    Ok(())
}

/// `POST /create-charge`
pub async fn create(
    State(state): State<AppState>,
    Caller(_): Caller,
    JsonBody(target): JsonBody<ChargeTarget>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let priced = price(&state, target).await?;
    let splits = split::entries_for(priced.value, state.split.as_ref())?;
    let request = ChargeRequest {
        correlation_id: priced.correlation_id.to_string(),
        value: priced.value,
        comment: Some(priced.comment),
        customer: priced.customer,
        splits,
    };

    link_record(&state, &priced.correlation_id).await?;
    let charge = state.payments.create_charge(&request).await?;
    info!(
        correlation_id = %request.correlation_id,
        kind = %priced.correlation_id.kind,
        value = request.value,
        split = !request.splits.is_empty(),
        "Charge created"
    );

    let mut body = json!({
        "correlationID": request.correlation_id,
        "charge": charge,
    });
    if let Some(quote) = priced.quote {
        body["quote"] = json!(quote);
    }
    Ok((StatusCode::CREATED, Json(body)))
}

/// `GET /check-charge/{correlation_id}`
pub async fn check(
    State(state): State<AppState>,
    Caller(_): Caller,
    Path(correlation_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let correlation_id: CorrelationId = correlation_id.parse()?;
    let charge = state
        .payments
        .get_charge(&correlation_id.to_string())
        .await?;
    Ok(Json(json!({
        "correlationID": charge.correlation_id,
        "status": charge.status,
        "paid": charge.status.is_paid(),
    })))
}

//! HTTP-facing error type.
//!
//! Every handler returns `Result<_, ApiError>`; the response body is always
//! `{"error": "...", "details": [...]}` so the forms can show one message
//! and optionally highlight fields.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use interbox_core::ValidationErrors;
use interbox_core::pricing::PricingError;

use crate::payments::PaymentError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("dados inválidos")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("token ausente ou inválido")]
    Unauthorized,

    #[error("acesso restrito a administradores")]
    Forbidden,

    #[error("{0} não encontrado")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("falha ao falar com {service}: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        let body = match &self {
            Self::Validation(details) => json!({ "error": self.to_string(), "details": details }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<interbox_core::Error> for ApiError {
    fn from(e: interbox_core::Error) -> Self {
        match e {
            interbox_core::Error::Transition { .. } => Self::Conflict(e.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Conflict(message) => Self::Conflict(message),
            other => Self::Upstream {
                service: "banco de dados",
                message: other.to_string(),
            },
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::NotFound(id) => Self::NotFound(format!("cobrança {id}")),
            other => Self::Upstream {
                service: "provedor de pagamento",
                message: other.to_string(),
            },
        }
    }
}

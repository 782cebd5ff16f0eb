//! PIX payment seam.
//!
//! [`PaymentGateway`] creates and reads charges; the OpenPix/Woovi client is
//! the production implementation.

mod openpix;
pub mod split;

use async_trait::async_trait;
use serde::Serialize;

use interbox_core::models::{Charge, Customer};

pub use openpix::{OpenPixClient, OpenPixConfig};
pub use split::SplitEntry;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Charge {0} not found")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Charge creation body, in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    #[serde(rename = "correlationID")]
    pub correlation_id: String,
    /// Cents.
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<SplitEntry>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, PaymentError>;

    async fn get_charge(&self, correlation_id: &str) -> Result<Charge, PaymentError>;
}

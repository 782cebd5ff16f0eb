//! OpenPix/Woovi REST client.
//!
//! `POST /api/v1/charge` to create, `GET /api/v1/charge/{correlationID}` to
//! read. The app ID goes verbatim in the `Authorization` header.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info};

use interbox_core::models::Charge;

use super::{ChargeRequest, PaymentError, PaymentGateway};

#[derive(Debug, Clone)]
pub struct OpenPixConfig {
    pub base_url: String,
    pub app_id: String,
    pub timeout: std::time::Duration,
}

/// Both endpoints wrap the charge in `{"charge": {...}}`.
#[derive(Debug, Deserialize)]
struct ChargeEnvelope {
    charge: Charge,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug)]
pub struct OpenPixClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenPixClient {
    pub fn new(config: &OpenPixConfig) -> Result<Self, PaymentError> {
        if config.base_url.is_empty() {
            return Err(PaymentError::Config("base_url is empty".into()));
        }
        if config.app_id.is_empty() {
            return Err(PaymentError::Config("app_id is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let app_id = HeaderValue::from_str(&config.app_id)
            .map_err(|_| PaymentError::Config("Invalid app_id format".into()))?;
        headers.insert(AUTHORIZATION, app_id);

        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn read_charge(
        resp: reqwest::Response,
        correlation_id: &str,
    ) -> Result<Charge, PaymentError> {
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PaymentError::NotFound(correlation_id.to_string()));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        let envelope: ChargeEnvelope = resp.json().await?;
        Ok(envelope.charge)
    }
}

/// The provider reports failures as `{"error": "..."}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl PaymentGateway for OpenPixClient {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, PaymentError> {
        debug!(correlation_id = %request.correlation_id, value = request.value, "Creating charge");
        let resp = self
            .http
            .post(self.api_url("/charge"))
            .json(request)
            .send()
            .await?;
        let charge = Self::read_charge(resp, &request.correlation_id).await?;
        info!(
            correlation_id = %charge.correlation_id,
            value = charge.value,
            "Charge created"
        );
        Ok(charge)
    }

    async fn get_charge(&self, correlation_id: &str) -> Result<Charge, PaymentError> {
        let resp = self
            .http
            .get(self.api_url(&format!("/charge/{correlation_id}")))
            .send()
            .await?;
        Self::read_charge(resp, correlation_id).await
    }
}

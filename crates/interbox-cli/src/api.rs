//! Client for the INTERBØX API server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use interbox_core::models::{ChargeStatus, Registration, RegistrationForm};

use crate::poller::StatusSource;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    inscricoes: Vec<Registration>,
}

#[derive(Debug, Deserialize)]
struct Saved {
    inscricao: Registration,
}

/// `GET /check-charge/{id}` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeCheck {
    #[serde(rename = "correlationID")]
    pub correlation_id: String,
    pub status: ChargeStatus,
    pub paid: bool,
}

#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        if base_url.is_empty() {
            return Err(ApiError::Config("API URL is empty".into()));
        }
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::Config("Invalid token format".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Every registration on the server (admin token required).
    pub async fn list_registrations(&self) -> Result<Vec<Registration>, ApiError> {
        let resp = self.http.get(self.url("/admin-inscricoes")).send().await?;
        let listing: Listing = Self::check(resp).await?.json().await?;
        debug!(count = listing.inscricoes.len(), "Fetched remote registrations");
        Ok(listing.inscricoes)
    }

    pub async fn save_registration(
        &self,
        form: &RegistrationForm,
    ) -> Result<Registration, ApiError> {
        let resp = self
            .http
            .post(self.url("/save-inscricao"))
            .json(form)
            .send()
            .await?;
        let saved: Saved = Self::check(resp).await?.json().await?;
        Ok(saved.inscricao)
    }

    pub async fn check_charge(&self, correlation_id: &str) -> Result<ChargeCheck, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/check-charge/{correlation_id}")))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    type Error = ApiError;

    async fn status(&self, correlation_id: &str) -> Result<ChargeStatus, ApiError> {
        Ok(self.check_charge(correlation_id).await?.status)
    }
}

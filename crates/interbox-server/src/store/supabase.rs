//! Supabase PostgREST client.
//!
//! Talks to `{url}/rest/v1/{table}` with the service role key. Filters use
//! PostgREST's `column=eq.value` syntax.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use interbox_core::models::{
    Insurance, InsuranceStatus, NewInsurance, NewRegistration, Product, Registration,
    RegistrationFilter, RegistrationStatus,
};

use super::{RecordStore, StoreError};

const REGISTRATIONS: &str = "inscricoes";
const INSURANCE: &str = "seguros";
const PRODUCTS: &str = "produtos";

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g. "<https://xyz.supabase.co>").
    pub url: String,
    pub service_key: String,
    pub timeout: std::time::Duration,
}

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        if config.url.is_empty() {
            return Err(StoreError::Config("url is empty".into()));
        }
        if config.service_key.is_empty() {
            return Err(StoreError::Config("service key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| StoreError::Config("Invalid service key format".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| StoreError::Config("Invalid service key format".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        // reqwest is built with rustls-no-provider; Err only means a provider
        // is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let base_url = config.url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub(crate) fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// `GET` on a table with `select=*` plus the given filters.
    pub(crate) fn select_request(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> reqwest::RequestBuilder {
        self.http
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(filters)
    }

    /// Map a non-success response to a `StoreError`, reading the PostgREST body.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(Self::classify(status.as_u16(), &text))
    }

    pub(crate) fn classify(status: u16, body: &str) -> StoreError {
        let parsed: Option<PostgrestError> = serde_json::from_str(body).ok();
        let code = parsed.as_ref().and_then(|e| e.code.clone());
        let message = parsed
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.to_string());
        if status == 409 || code.as_deref() == Some(UNIQUE_VIOLATION) {
            StoreError::Conflict(message)
        } else {
            StoreError::Api { status, message }
        }
    }

    async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let resp = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows: Vec<T> = Self::check(resp).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {table} returned no row")))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let resp = self.select_request(table, filters).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, StoreError> {
        self.select(table, &[("id", format!("eq.{id}"))])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{table} {id}")))
    }

    async fn patch<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        body: serde_json::Value,
    ) -> Result<T, StoreError> {
        debug!(table, id, "PATCH row");
        let resp = self
            .http
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        let rows: Vec<T> = Self::check(resp).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{table} {id}")))
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    async fn insert_registration(
        &self,
        row: &NewRegistration,
    ) -> Result<Registration, StoreError> {
        self.insert(REGISTRATIONS, row).await
    }

    async fn get_registration(&self, id: &str) -> Result<Registration, StoreError> {
        self.select_one(REGISTRATIONS, id).await
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, StoreError> {
        let mut filters = vec![("order", "created_at.desc".to_string())];
        if let Some(kind) = filter.kind {
            filters.push(("tipo", format!("eq.{kind}")));
        }
        if let Some(status) = filter.status {
            filters.push(("status", format!("eq.{status}")));
        }
        self.select(REGISTRATIONS, &filters).await
    }

    async fn set_registration_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<Registration, StoreError> {
        self.patch(REGISTRATIONS, id, json!({ "status": status })).await
    }

    async fn set_registration_charge(
        &self,
        id: &str,
        correlation_id: &str,
    ) -> Result<Registration, StoreError> {
        self.patch(REGISTRATIONS, id, json!({ "correlation_id": correlation_id }))
            .await
    }

    async fn insert_insurance(&self, row: &NewInsurance) -> Result<Insurance, StoreError> {
        self.insert(INSURANCE, row).await.map_err(|e| match e {
            StoreError::Conflict(_) => {
                StoreError::Conflict("CPF já possui seguro cadastrado".into())
            }
            other => other,
        })
    }

    async fn get_insurance(&self, id: &str) -> Result<Insurance, StoreError> {
        self.select_one(INSURANCE, id).await
    }

    async fn set_insurance_status(
        &self,
        id: &str,
        status: InsuranceStatus,
    ) -> Result<Insurance, StoreError> {
        self.patch(INSURANCE, id, json!({ "status": status })).await
    }

    async fn set_insurance_charge(
        &self,
        id: &str,
        correlation_id: &str,
    ) -> Result<Insurance, StoreError> {
        self.patch(INSURANCE, id, json!({ "correlation_id": correlation_id }))
            .await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.select(
            PRODUCTS,
            &[
                ("ativo", "eq.true".to_string()),
                ("order", "nome.asc".to_string()),
            ],
        )
        .await
    }
}

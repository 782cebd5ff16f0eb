//! Persistence seam.
//!
//! Handlers talk to [`RecordStore`]; production uses the Supabase PostgREST
//! client, tests use an in-memory fake.

mod supabase;

use async_trait::async_trait;

use interbox_core::models::{
    Insurance, InsuranceStatus, NewInsurance, NewRegistration, Product, Registration,
    RegistrationFilter, RegistrationStatus,
};

pub use supabase::{SupabaseClient, SupabaseConfig};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_registration(&self, row: &NewRegistration)
    -> Result<Registration, StoreError>;

    async fn get_registration(&self, id: &str) -> Result<Registration, StoreError>;

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, StoreError>;

    async fn set_registration_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<Registration, StoreError>;

    async fn set_registration_charge(
        &self,
        id: &str,
        correlation_id: &str,
    ) -> Result<Registration, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the CPF already has a request.
    async fn insert_insurance(&self, row: &NewInsurance) -> Result<Insurance, StoreError>;

    async fn get_insurance(&self, id: &str) -> Result<Insurance, StoreError>;

    async fn set_insurance_status(
        &self,
        id: &str,
        status: InsuranceStatus,
    ) -> Result<Insurance, StoreError>;

    async fn set_insurance_charge(
        &self,
        id: &str,
        correlation_id: &str,
    ) -> Result<Insurance, StoreError>;

    /// Active products only.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

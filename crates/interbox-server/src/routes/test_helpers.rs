//! In-memory fakes for route tests.
//!
//! Each fake records what the handlers asked of it so tests can assert on
//! side effects (rows stored, charges requested, e-mails sent).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;

use interbox_core::auth::{Role, TokenManager};
use interbox_core::config::{ServerConfig, SplitConfig};
use interbox_core::models::{
    Charge, ChargeStatus, Insurance, InsuranceStatus, NewInsurance, NewRegistration, Product,
    Registration, RegistrationFilter, RegistrationStatus,
};
use interbox_core::pricing::Pricing;

use super::{AppState, build_router};
use crate::mail::{Email, MailError, Mailer};
use crate::payments::{ChargeRequest, PaymentError, PaymentGateway};
use crate::store::{RecordStore, StoreError};

pub const SECRET: &[u8] = b"test-secret";
pub const WEBHOOK_SECRET: &str = "webhook-secret";

#[derive(Default)]
pub struct FakeStore {
    pub registrations: Mutex<HashMap<String, Registration>>,
    pub insurance: Mutex<HashMap<String, Insurance>>,
    pub products: Mutex<Vec<Product>>,
    pub calls: AtomicUsize,
    pub fail_products: AtomicBool,
    /// Makes `set_*_charge` fail as if the database were unreachable.
    pub fail_links: AtomicBool,
    next_id: AtomicUsize,
}

impl FakeStore {
    fn id(&self) -> String {
        format!("row-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_link(&self) -> Result<(), StoreError> {
        if self.fail_links.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "upstream unavailable".into(),
            });
        }
        Ok(())
    }

    pub fn registration(&self, id: &str) -> Registration {
        self.registrations.lock().unwrap()[id].clone()
    }

    pub fn insurance(&self, id: &str) -> Insurance {
        self.insurance.lock().unwrap()[id].clone()
    }

    pub fn seed_registration(&self, row: &NewRegistration) -> Registration {
        let registration = Registration {
            id: self.id(),
            name: row.name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            cpf: row.cpf.clone(),
            kind: row.kind,
            fee: row.fee,
            status: row.status,
            experience: row.experience.clone(),
            motivation: row.motivation.clone(),
            availability: row.availability.clone(),
            correlation_id: None,
            created_at: Some("2025-01-10T12:00:00Z".into()),
        };
        self.registrations
            .lock()
            .unwrap()
            .insert(registration.id.clone(), registration.clone());
        registration
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn insert_registration(
        &self,
        row: &NewRegistration,
    ) -> Result<Registration, StoreError> {
        self.touch();
        Ok(self.seed_registration(row))
    }

    async fn get_registration(&self, id: &str) -> Result<Registration, StoreError> {
        self.touch();
        self.registrations
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("inscricoes {id}")))
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> Result<Vec<Registration>, StoreError> {
        self.touch();
        let mut rows: Vec<Registration> = self
            .registrations
            .lock()
            .unwrap()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn set_registration_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<Registration, StoreError> {
        self.touch();
        let mut rows = self.registrations.lock().unwrap();
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("inscricoes {id}")))?;
        row.status = status;
        Ok(row.clone())
    }

    async fn set_registration_charge(
        &self,
        id: &str,
        correlation_id: &str,
    ) -> Result<Registration, StoreError> {
        self.touch();
        self.check_link()?;
        let mut rows = self.registrations.lock().unwrap();
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("inscricoes {id}")))?;
        row.correlation_id = Some(correlation_id.to_string());
        Ok(row.clone())
    }

    async fn insert_insurance(&self, row: &NewInsurance) -> Result<Insurance, StoreError> {
        self.touch();
        let mut rows = self.insurance.lock().unwrap();
        if rows.values().any(|r| r.cpf == row.cpf) {
            return Err(StoreError::Conflict("CPF já possui seguro cadastrado".into()));
        }
        let insurance = Insurance {
            id: self.id(),
            name: row.name.clone(),
            cpf: row.cpf.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            birth_date: row.birth_date.clone(),
            fee: row.fee,
            status: row.status,
            receipt_url: row.receipt_url.clone(),
            correlation_id: None,
            created_at: None,
        };
        rows.insert(insurance.id.clone(), insurance.clone());
        Ok(insurance)
    }

    async fn get_insurance(&self, id: &str) -> Result<Insurance, StoreError> {
        self.touch();
        self.insurance
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("seguros {id}")))
    }

    async fn set_insurance_status(
        &self,
        id: &str,
        status: InsuranceStatus,
    ) -> Result<Insurance, StoreError> {
        self.touch();
        let mut rows = self.insurance.lock().unwrap();
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("seguros {id}")))?;
        row.status = status;
        Ok(row.clone())
    }

    async fn set_insurance_charge(
        &self,
        id: &str,
        correlation_id: &str,
    ) -> Result<Insurance, StoreError> {
        self.touch();
        self.check_link()?;
        let mut rows = self.insurance.lock().unwrap();
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("seguros {id}")))?;
        row.correlation_id = Some(correlation_id.to_string());
        Ok(row.clone())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.touch();
        if self.fail_products.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: "upstream unavailable".into(),
            });
        }
        Ok(self.products.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakePayments {
    pub requests: Mutex<Vec<ChargeRequest>>,
    pub charges: Mutex<HashMap<String, Charge>>,
    pub fail: AtomicBool,
}

impl FakePayments {
    pub fn last_request(&self) -> ChargeRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    pub fn set_status(&self, correlation_id: &str, status: ChargeStatus) {
        if let Some(charge) = self.charges.lock().unwrap().get_mut(correlation_id) {
            charge.status = status;
        }
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentError::Api {
                status: 500,
                message: "internal error".into(),
            });
        }
        let charge = Charge {
            correlation_id: request.correlation_id.clone(),
            value: request.value,
            status: ChargeStatus::Active,
            br_code: Some("00020101021226".into()),
            qr_code_image: None,
            payment_link_url: Some(format!("https://pay.test/{}", request.correlation_id)),
            expires_date: None,
            customer: request.customer.clone(),
        };
        self.charges
            .lock()
            .unwrap()
            .insert(charge.correlation_id.clone(), charge.clone());
        Ok(charge)
    }

    async fn get_charge(&self, correlation_id: &str) -> Result<Charge, PaymentError> {
        self.charges
            .lock()
            .unwrap()
            .get(correlation_id)
            .cloned()
            .ok_or_else(|| PaymentError::NotFound(correlation_id.to_string()))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Api {
                status: 422,
                body: "invalid from".into(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Router plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<FakeStore>,
    pub payments: Arc<FakePayments>,
    pub mailer: Arc<RecordingMailer>,
    pub tokens: TokenManager,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_split(None)
    }

    pub fn with_split(split: Option<SplitConfig>) -> Self {
        let store = Arc::new(FakeStore::default());
        let payments = Arc::new(FakePayments::default());
        let mailer = Arc::new(RecordingMailer::default());
        let tokens = TokenManager::new(SECRET);
        let state = AppState {
            store: Arc::clone(&store) as Arc<dyn RecordStore>,
            payments: Arc::clone(&payments) as Arc<dyn PaymentGateway>,
            mailer: Arc::clone(&mailer) as Arc<dyn Mailer>,
            tokens: tokens.clone(),
            pricing: Arc::new(Pricing::default()),
            split,
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        };
        let router = build_router(state, &ServerConfig::default());
        Self {
            router,
            store,
            payments,
            mailer,
            tokens,
        }
    }

    pub fn token(&self, role: Role) -> String {
        self.tokens.issue("test", role, 3600).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        use tower::ServiceExt;
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str, role: Option<Role>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(role) = role {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(role)));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, role: Option<Role>, body: &serde_json::Value) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(role) = role {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(role)));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

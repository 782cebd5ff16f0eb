//! INTERBØX 2025 API server library.
//!
//! - HTTP routes for registrations, insurance, PIX charges and the catalog
//! - Bearer-token and webhook-secret checks
//! - Clients for Supabase (records), OpenPix (charges) and Resend (e-mail),
//!   each behind a trait so handlers run against fakes in tests

pub mod error;
pub mod extract;
pub mod mail;
pub mod payments;
pub mod routes;
pub mod store;

pub use error::ApiError;
pub use routes::{AppState, build_router};

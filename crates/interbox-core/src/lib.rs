//! INTERBØX 2025 Core Library
//!
//! Shared functionality for the INTERBØX components:
//! - Registration, insurance, product and charge records
//! - Form validation (required fields, email, phone, CPF)
//! - Pricing constants and payment split math
//! - Configuration resolution and bearer-token handling
//! - Common error types

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pricing;
pub mod tracing_init;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use validation::{FieldError, ValidationErrors};

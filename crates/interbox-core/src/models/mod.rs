//! Records mirrored into the hosted database, plus the provider-owned charge.
//!
//! Field names on the wire follow the database columns (Portuguese); the Rust
//! side uses English names.

pub mod charge;
pub mod insurance;
pub mod product;
pub mod registration;

pub use charge::{Charge, ChargeKind, ChargeStatus, CorrelationId, Customer};
pub use insurance::{Insurance, InsuranceForm, InsuranceStatus, NewInsurance};
pub use product::{CartItem, Product, Quote, QuoteLine};
pub use registration::{
    NewRegistration, Registration, RegistrationFilter, RegistrationForm, RegistrationStatus,
    RegistrationType,
};

/// Empty-string-aware conversion for optional free-text fields.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

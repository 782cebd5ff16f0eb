//! `inscricao`: judge, staff and audiovisual registrations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::error::Error;
use crate::pricing::Pricing;
use crate::validation::{ValidationErrors, digits};

/// Which crew the person is signing up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    Judge,
    Staff,
    Audiovisual,
}

impl RegistrationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Judge => "judge",
            Self::Staff => "staff",
            Self::Audiovisual => "audiovisual",
        }
    }

    /// Label used in e-mails.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Judge => "Judge",
            Self::Staff => "Staff",
            Self::Audiovisual => "Audiovisual",
        }
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "judge" | "juiz" => Ok(Self::Judge),
            "staff" => Ok(Self::Staff),
            "audiovisual" => Ok(Self::Audiovisual),
            other => Err(Error::UnknownValue {
                kind: "registration type",
                value: other.to_string(),
            }),
        }
    }
}

/// Soft lifecycle state; registrations are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Paid,
    Cancelled,
}

impl RegistrationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Same-state moves are allowed so repeated webhooks stay harmless.
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Registered, _)
                | (Self::Paid, Self::Paid | Self::Cancelled)
                | (Self::Cancelled, Self::Cancelled)
        )
    }

    pub fn transition(self, next: Self) -> Result<Self, Error> {
        if self.can_become(next) {
            Ok(next)
        } else {
            Err(Error::Transition {
                record: "inscricao",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registered" => Ok(Self::Registered),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::UnknownValue {
                kind: "registration status",
                value: other.to_string(),
            }),
        }
    }
}

/// A stored registration row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    pub cpf: String,
    #[serde(rename = "tipo")]
    pub kind: RegistrationType,
    /// Fee in cents.
    #[serde(rename = "valor")]
    pub fee: i64,
    pub status: RegistrationStatus,
    #[serde(rename = "experiencia", default)]
    pub experience: Option<String>,
    #[serde(rename = "motivacao", default)]
    pub motivation: Option<String>,
    #[serde(rename = "disponibilidade", default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Raw form body. Every field defaults so missing keys become validation
/// errors instead of JSON errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub tipo: String,
    #[serde(default)]
    pub experiencia: Option<String>,
    #[serde(default)]
    pub motivacao: Option<String>,
    #[serde(default)]
    pub disponibilidade: Option<String>,
}

impl RegistrationForm {
    /// Check the form and turn it into an insertable row priced for its type.
    pub fn validate(&self, pricing: &Pricing) -> Result<NewRegistration, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("nome", &self.nome);
        errors.require_email("email", &self.email);
        errors.require_phone("telefone", &self.telefone);
        errors.require_cpf("cpf", &self.cpf);
        let kind = errors
            .require("tipo", &self.tipo)
            .and_then(|t| match t.parse::<RegistrationType>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    errors.push("tipo", "tipo deve ser judge, staff ou audiovisual");
                    None
                }
            });
        errors.into_result()?;

        // into_result returned Ok, so the type parsed.
        let Some(kind) = kind else {
            return Err(ValidationErrors::new());
        };

        Ok(NewRegistration {
            name: self.nome.trim().to_string(),
            email: self.email.trim().to_ascii_lowercase(),
            phone: digits(&self.telefone),
            cpf: digits(&self.cpf),
            kind,
            fee: pricing.registration_fee(kind),
            status: RegistrationStatus::Registered,
            experience: non_blank(self.experiencia.as_deref()),
            motivation: non_blank(self.motivacao.as_deref()),
            availability: non_blank(self.disponibilidade.as_deref()),
        })
    }
}

/// Insert body for the `inscricoes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRegistration {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    pub cpf: String,
    #[serde(rename = "tipo")]
    pub kind: RegistrationType,
    #[serde(rename = "valor")]
    pub fee: i64,
    pub status: RegistrationStatus,
    #[serde(rename = "experiencia", skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(rename = "motivacao", skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    #[serde(rename = "disponibilidade", skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

/// Admin listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub kind: Option<RegistrationType>,
    pub status: Option<RegistrationStatus>,
}

impl RegistrationFilter {
    pub fn matches(&self, registration: &Registration) -> bool {
        self.kind.is_none_or(|k| k == registration.kind)
            && self.status.is_none_or(|s| s == registration.status)
    }
}

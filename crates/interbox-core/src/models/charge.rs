//! PIX charges. The payment provider owns their lifecycle; we only create and
//! read them, and tie them back to our records through the correlation ID.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// What a charge pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeKind {
    Ticket,
    Product,
    Inscricao,
    Seguro,
}

impl ChargeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Product => "product",
            Self::Inscricao => "inscricao",
            Self::Seguro => "seguro",
        }
    }
}

impl fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticket" => Ok(Self::Ticket),
            "product" => Ok(Self::Product),
            "inscricao" => Ok(Self::Inscricao),
            "seguro" => Ok(Self::Seguro),
            other => Err(Error::UnknownValue {
                kind: "charge kind",
                value: other.to_string(),
            }),
        }
    }
}

/// `{kind}_{reference}_{nonce}`.
///
/// The reference is whatever identifies the paid thing (a row id, a ticket
/// lot, a cart tag) and may itself contain `_`; kind and nonce never do.
/// Only ASCII letters, digits, `-` and `_` are accepted, so a parsed ID is
/// always safe to put in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId {
    pub kind: ChargeKind,
    pub reference: String,
    pub nonce: String,
}

impl CorrelationId {
    pub fn new(kind: ChargeKind, reference: &str) -> Self {
        let nonce = uuid::Uuid::new_v4().simple().to_string()[..12].to_string();
        Self {
            kind,
            reference: reference.to_string(),
            nonce,
        }
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.kind, self.reference, self.nonce)
    }
}

impl FromStr for CorrelationId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::CorrelationId(s.to_string());
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
        {
            return Err(invalid());
        }
        let (kind, rest) = s.split_once('_').ok_or_else(invalid)?;
        let (reference, nonce) = rest.rsplit_once('_').ok_or_else(invalid)?;
        if reference.is_empty() || nonce.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            kind: kind.parse().map_err(|_| invalid())?,
            reference: reference.to_string(),
            nonce: nonce.to_string(),
        })
    }
}

/// Provider-side charge state. Unrecognised values are kept as `Unknown`
/// so a new provider status never breaks deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    Active,
    Completed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl ChargeStatus {
    /// Polling stops once a charge reaches one of these.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }

    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Expired => "EXPIRED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Payer identity block sent with a charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "taxID", default, deserialize_with = "tax_id")]
    pub tax_id: String,
}

/// Requests carry `"taxID": "..."`; provider responses nest it as
/// `"taxID": {"taxID": "...", "type": "BR:CPF"}`.
fn tax_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TaxId {
        Plain(String),
        Nested {
            #[serde(rename = "taxID")]
            tax_id: String,
        },
    }
    Ok(match TaxId::deserialize(deserializer)? {
        TaxId::Plain(s) | TaxId::Nested { tax_id: s } => s,
    })
}

/// Charge as reported by the provider (subset of fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    #[serde(rename = "correlationID")]
    pub correlation_id: String,
    /// Value in cents.
    pub value: i64,
    pub status: ChargeStatus,
    #[serde(default)]
    pub br_code: Option<String>,
    #[serde(default)]
    pub qr_code_image: Option<String>,
    #[serde(default)]
    pub payment_link_url: Option<String>,
    #[serde(default)]
    pub expires_date: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_parses_back() {
        let id = CorrelationId::new(ChargeKind::Inscricao, "3f2a-9c_01");
        let text = id.to_string();
        assert!(text.starts_with("inscricao_3f2a-9c_01_"));
        let parsed: CorrelationId = text.parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.nonce.len(), 12);
    }

    #[test]
    fn malformed_correlation_ids() {
        assert!("inscricao".parse::<CorrelationId>().is_err());
        assert!("inscricao_abc".parse::<CorrelationId>().is_err());
        assert!("boleto_abc_123".parse::<CorrelationId>().is_err());
        assert!("ticket__123".parse::<CorrelationId>().is_err());
    }

    #[test]
    fn correlation_id_rejects_path_characters() {
        assert!("../subscription/abc".parse::<CorrelationId>().is_err());
        assert!("ticket_../subscription_abc".parse::<CorrelationId>().is_err());
        assert!("ticket_lote-1_a1b2?x=1".parse::<CorrelationId>().is_err());
        assert!("ticket_lote 1_a1b2".parse::<CorrelationId>().is_err());
        assert!("ticket_lote-1_a1b2c3d4e5f6".parse::<CorrelationId>().is_ok());
    }

    #[test]
    fn charge_from_provider_json() {
        let json = r#"{
            "correlationID": "ticket_lote-1_abcdef123456",
            "value": 15000,
            "status": "ACTIVE",
            "brCode": "000201...",
            "qrCodeImage": "https://api.openpix.com.br/openpix/charge/brcode/image/x.png",
            "paymentLinkUrl": "https://openpix.com.br/pay/x",
            "expiresDate": "2025-03-01T12:00:00.000Z",
            "globalID": "Q2hhcmdlOjY"
        }"#;
        let charge: Charge = serde_json::from_str(json).unwrap();
        assert_eq!(charge.value, 15000);
        assert_eq!(charge.status, ChargeStatus::Active);
        assert!(!charge.status.is_terminal());
        assert!(charge.br_code.is_some());
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let status: ChargeStatus = serde_json::from_str(r#""IN_ANALYSIS""#).unwrap();
        assert_eq!(status, ChargeStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(ChargeStatus::Completed.is_terminal());
        assert!(ChargeStatus::Completed.is_paid());
        assert!(ChargeStatus::Expired.is_terminal());
        assert!(!ChargeStatus::Expired.is_paid());
    }

    #[test]
    fn customer_tax_id_wire_name() {
        let c = Customer {
            name: "Ana".into(),
            email: "a@b.co".into(),
            phone: None,
            tax_id: "52998224725".into(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["taxID"], "52998224725");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn customer_from_provider_response() {
        let json = r#"{
            "name": "Ana",
            "email": "a@b.co",
            "taxID": {"taxID": "52998224725", "type": "BR:CPF"}
        }"#;
        let c: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(c.tax_id, "52998224725");
    }
}

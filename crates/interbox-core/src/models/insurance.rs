//! `seguro`: athlete insurance requests paid by proof of transfer or PIX.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::error::Error;
use crate::validation::{ValidationErrors, digits};

/// Proof-of-payment progress. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    PendenteComprovante,
    ComprovanteEnviado,
    PagoConfirmado,
}

impl InsuranceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendenteComprovante => "pendente_comprovante",
            Self::ComprovanteEnviado => "comprovante_enviado",
            Self::PagoConfirmado => "pago_confirmado",
        }
    }

    pub fn transition(self, next: Self) -> Result<Self, Error> {
        if next >= self {
            Ok(next)
        } else {
            Err(Error::Transition {
                record: "seguro",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for InsuranceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsuranceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pendente_comprovante" => Ok(Self::PendenteComprovante),
            "comprovante_enviado" => Ok(Self::ComprovanteEnviado),
            "pago_confirmado" => Ok(Self::PagoConfirmado),
            other => Err(Error::UnknownValue {
                kind: "insurance status",
                value: other.to_string(),
            }),
        }
    }
}

/// A stored insurance row. CPF is unique per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurance {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    #[serde(rename = "valor")]
    pub fee: i64,
    pub status: InsuranceStatus,
    #[serde(rename = "comprovante_url", default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsuranceForm {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub data_nascimento: String,
    #[serde(default)]
    pub comprovante_url: Option<String>,
}

impl InsuranceForm {
    /// A receipt link on submission skips straight to `comprovante_enviado`.
    pub fn validate(&self, fee: i64) -> Result<NewInsurance, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("nome", &self.nome);
        errors.require_cpf("cpf", &self.cpf);
        errors.require_email("email", &self.email);
        errors.require_phone("telefone", &self.telefone);
        if let Some(date) = errors.require("data_nascimento", &self.data_nascimento) {
            if !is_iso_date(date) {
                errors.push("data_nascimento", "data deve estar no formato AAAA-MM-DD");
            }
        }
        errors.into_result()?;

        let receipt_url = non_blank(self.comprovante_url.as_deref());
        let status = if receipt_url.is_some() {
            InsuranceStatus::ComprovanteEnviado
        } else {
            InsuranceStatus::PendenteComprovante
        };

        Ok(NewInsurance {
            name: self.nome.trim().to_string(),
            cpf: digits(&self.cpf),
            email: self.email.trim().to_ascii_lowercase(),
            phone: digits(&self.telefone),
            birth_date: self.data_nascimento.trim().to_string(),
            fee,
            status,
            receipt_url,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewInsurance {
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "data_nascimento")]
    pub birth_date: String,
    #[serde(rename = "valor")]
    pub fee: i64,
    pub status: InsuranceStatus,
    #[serde(rename = "comprovante_url", skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

/// `YYYY-MM-DD` with a plausible month and day.
fn is_iso_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    let [y, m, d] = parts.as_slice() else {
        return false;
    };
    if y.len() != 4 || m.len() != 2 || d.len() != 2 {
        return false;
    }
    match (y.parse::<u32>(), m.parse::<u32>(), d.parse::<u32>()) {
        (Ok(y), Ok(m), Ok(d)) => {
            (1900..=2100).contains(&y) && (1..=12).contains(&m) && (1..=31).contains(&d)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> InsuranceForm {
        InsuranceForm {
            nome: "Bruno Lima".into(),
            cpf: "111.444.777-35".into(),
            email: "bruno@example.com".into(),
            telefone: "21 99876-5432".into(),
            data_nascimento: "1994-07-21".into(),
            comprovante_url: None,
        }
    }

    #[test]
    fn new_request_waits_for_receipt() {
        let row = form().validate(3990).unwrap();
        assert_eq!(row.status, InsuranceStatus::PendenteComprovante);
        assert_eq!(row.cpf, "11144477735");
        assert_eq!(row.fee, 3990);
    }

    #[test]
    fn receipt_on_submit_advances_status() {
        let mut f = form();
        f.comprovante_url = Some("https://files.example.com/r.pdf".into());
        let row = f.validate(3990).unwrap();
        assert_eq!(row.status, InsuranceStatus::ComprovanteEnviado);
    }

    #[test]
    fn bad_birth_date_is_rejected() {
        let mut f = form();
        f.data_nascimento = "21/07/1994".into();
        let errors = f.validate(3990).unwrap_err();
        assert!(errors.has("data_nascimento"));
    }

    #[test]
    fn status_only_moves_forward() {
        use InsuranceStatus::{ComprovanteEnviado, PagoConfirmado, PendenteComprovante};
        assert!(PendenteComprovante.transition(ComprovanteEnviado).is_ok());
        assert!(PendenteComprovante.transition(PagoConfirmado).is_ok());
        assert!(PagoConfirmado.transition(PagoConfirmado).is_ok());
        assert!(PagoConfirmado.transition(ComprovanteEnviado).is_err());
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_value(InsuranceStatus::ComprovanteEnviado).unwrap(),
            "comprovante_enviado"
        );
        assert_eq!(
            "pago_confirmado".parse::<InsuranceStatus>().unwrap(),
            InsuranceStatus::PagoConfirmado
        );
    }
}

//! Draft records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use interbox_core::models::{RegistrationForm, RegistrationType};
use interbox_core::validation::digits;

/// A draft as parsed from the export, before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDraft {
    pub source_key: String,
    pub kind: RegistrationType,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cpf: String,
    /// The original object, kept for the free-text fields.
    pub payload: Value,
}

impl NewDraft {
    /// Identity used to skip re-imports of the same person.
    pub fn fingerprint(&self) -> String {
        let cpf = digits(&self.cpf);
        if !cpf.is_empty() {
            return format!("{}:cpf:{cpf}", self.kind);
        }
        let email = self.email.trim().to_ascii_lowercase();
        if !email.is_empty() {
            return format!("{}:email:{email}", self.kind);
        }
        format!("{}:raw:{}", self.kind, self.payload)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Draft {
    pub id: String,
    pub source_key: String,
    pub tipo: String,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cpf: String,
    pub payload: String,
    pub fingerprint: String,
    pub remote_id: Option<String>,
    pub synced_at: Option<i64>,
    pub imported_at: i64,
}

impl Draft {
    pub fn kind(&self) -> Result<RegistrationType, interbox_core::Error> {
        self.tipo.parse()
    }

    pub const fn is_synced(&self) -> bool {
        self.synced_at.is_some()
    }

    /// Rebuild the form the site would have posted.
    pub fn to_form(&self) -> RegistrationForm {
        let payload: Value = serde_json::from_str(&self.payload).unwrap_or(Value::Null);
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| payload.get(*k).and_then(Value::as_str))
                .map(str::to_string)
        };
        RegistrationForm {
            nome: self.nome.clone(),
            email: self.email.clone(),
            telefone: self.telefone.clone(),
            cpf: self.cpf.clone(),
            tipo: self.tipo.clone(),
            experiencia: text(&["experiencia", "experience"]),
            motivacao: text(&["motivacao", "motivation"]),
            disponibilidade: text(&["disponibilidade", "availability"]),
        }
    }
}

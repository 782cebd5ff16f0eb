//! Parsing of `localStorage` exports.
//!
//! The export is one JSON object mapping storage keys to values. Browsers
//! store strings, so a value is usually a JSON document encoded as a
//! string; hand-edited exports may hold the array or object directly.

use serde_json::{Map, Value};
use tracing::debug;

use interbox_core::models::RegistrationType;

use super::models::NewDraft;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("export is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export must be a JSON object of storage keys")]
    NotAnObject,
}

/// Drafts found in an export, plus what was left out and why.
#[derive(Debug, Default)]
pub struct ParsedExport {
    pub drafts: Vec<NewDraft>,
    pub skipped: Vec<String>,
}

/// Type implied by the storage key, e.g. `interbox_judge_drafts`.
fn kind_from_key(key: &str) -> Option<RegistrationType> {
    let key = key.to_ascii_lowercase();
    if key.contains("judge") || key.contains("juiz") {
        Some(RegistrationType::Judge)
    } else if key.contains("staff") {
        Some(RegistrationType::Staff)
    } else if key.contains("audiovisual") {
        Some(RegistrationType::Audiovisual)
    } else {
        None
    }
}

/// Unwrap string-encoded JSON. Plain strings yield `None`.
fn decode(value: Value) -> Option<Value> {
    match value {
        Value::String(s) => serde_json::from_str(&s).ok(),
        other => Some(other),
    }
}

fn field(object: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| object.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn parse_export(text: &str) -> Result<ParsedExport, ImportError> {
    let Value::Object(entries) = serde_json::from_str::<Value>(text)? else {
        return Err(ImportError::NotAnObject);
    };

    let mut parsed = ParsedExport::default();
    for (key, raw) in entries {
        let items = match decode(raw) {
            Some(Value::Array(items)) => items,
            Some(object @ Value::Object(_)) => vec![object],
            _ => {
                debug!(key = %key, "Skipping non-draft storage key");
                continue;
            }
        };

        let key_kind = kind_from_key(&key);
        for (index, item) in items.into_iter().enumerate() {
            let Some(Value::Object(object)) = decode(item) else {
                parsed.skipped.push(format!("{key}[{index}]: not an object"));
                continue;
            };
            let tipo = field(&object, &["tipo", "type"]);
            let kind = key_kind.or_else(|| tipo.parse().ok());
            let Some(kind) = kind else {
                parsed
                    .skipped
                    .push(format!("{key}[{index}]: registration type unknown"));
                continue;
            };
            parsed.drafts.push(NewDraft {
                source_key: key.clone(),
                kind,
                nome: field(&object, &["nome", "name"]),
                email: field(&object, &["email"]),
                telefone: field(&object, &["telefone", "phone", "whatsapp"]),
                cpf: field(&object, &["cpf"]),
                payload: Value::Object(object),
            });
        }
    }
    Ok(parsed)
}

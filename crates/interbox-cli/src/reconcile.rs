//! Matching local drafts against registrations already on the server.
//!
//! A draft matches a remote row with the same CPF digits. Drafts without a
//! CPF fall back to lower-cased email plus registration type.

use std::collections::HashMap;

use interbox_core::models::Registration;
use interbox_core::validation::digits;

use crate::drafts::Draft;

#[derive(Debug, Default)]
pub struct Comparison<'a> {
    /// Drafts with a remote twin, paired with the remote id.
    pub present: Vec<(&'a Draft, String)>,
    /// Drafts the server does not know about.
    pub missing: Vec<&'a Draft>,
}

fn email_key(email: &str, tipo: &str) -> String {
    format!("{}|{tipo}", email.trim().to_ascii_lowercase())
}

pub fn compare<'a>(drafts: &'a [Draft], remote: &[Registration]) -> Comparison<'a> {
    let mut by_cpf: HashMap<String, &str> = HashMap::new();
    let mut by_email: HashMap<String, &str> = HashMap::new();
    for row in remote {
        let cpf = digits(&row.cpf);
        if !cpf.is_empty() {
            by_cpf.entry(cpf).or_insert(&row.id);
        }
        if !row.email.trim().is_empty() {
            by_email
                .entry(email_key(&row.email, row.kind.as_str()))
                .or_insert(&row.id);
        }
    }

    let mut comparison = Comparison::default();
    for draft in drafts {
        let cpf = digits(&draft.cpf);
        let found = if cpf.is_empty() {
            by_email.get(&email_key(&draft.email, &draft.tipo))
        } else {
            by_cpf.get(&cpf)
        };
        match found {
            Some(id) => comparison.present.push((draft, (*id).to_string())),
            None => comparison.missing.push(draft),
        }
    }
    comparison
}

#[cfg(test)]
mod tests {
    use interbox_core::models::{RegistrationStatus, RegistrationType};

    use super::*;

    fn draft(id: &str, tipo: &str, email: &str, cpf: &str) -> Draft {
        Draft {
            id: id.into(),
            source_key: "interbox_drafts".into(),
            tipo: tipo.into(),
            nome: "Fulano".into(),
            email: email.into(),
            telefone: String::new(),
            cpf: cpf.into(),
            payload: "{}".into(),
            fingerprint: id.into(),
            remote_id: None,
            synced_at: None,
            imported_at: 0,
        }
    }

    fn remote(id: &str, kind: RegistrationType, email: &str, cpf: &str) -> Registration {
        Registration {
            id: id.into(),
            name: "Fulano".into(),
            email: email.into(),
            phone: "11987654321".into(),
            cpf: cpf.into(),
            kind,
            fee: 0,
            status: RegistrationStatus::Registered,
            experience: None,
            motivation: None,
            availability: None,
            correlation_id: None,
            created_at: None,
        }
    }

    #[test]
    fn cpf_match_ignores_punctuation() {
        let drafts = vec![draft("d1", "judge", "a@x.com", "529.982.247-25")];
        let rows = vec![remote("r1", RegistrationType::Staff, "b@y.com", "52998224725")];
        let result = compare(&drafts, &rows);
        assert_eq!(result.present.len(), 1);
        assert_eq!(result.present[0].1, "r1");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn email_match_needs_same_type() {
        let drafts = vec![
            draft("d1", "judge", "Ana@X.com", ""),
            draft("d2", "staff", "ana@x.com", ""),
        ];
        let rows = vec![remote("r1", RegistrationType::Judge, "ana@x.com", "")];
        let result = compare(&drafts, &rows);
        assert_eq!(result.present.len(), 1);
        assert_eq!(result.present[0].0.id, "d1");
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].id, "d2");
    }

    #[test]
    fn draft_with_cpf_does_not_fall_back_to_email() {
        let drafts = vec![draft("d1", "judge", "ana@x.com", "11144477735")];
        let rows = vec![remote("r1", RegistrationType::Judge, "ana@x.com", "52998224725")];
        let result = compare(&drafts, &rows);
        assert_eq!(result.missing.len(), 1);
    }
}

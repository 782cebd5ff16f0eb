//! Form validation shared by every submission endpoint.
//!
//! Checks are collected rather than fail-fast so a form can show every
//! problem at once.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[allow(clippy::unwrap_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every problem found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Record an error if `value` is blank. Returns the trimmed value when present.
    pub fn require<'a>(&mut self, field: &str, value: &'a str) -> Option<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "campo obrigatório");
            None
        } else {
            Some(trimmed)
        }
    }

    pub fn require_email(&mut self, field: &str, value: &str) {
        if let Some(v) = self.require(field, value) {
            if !is_valid_email(v) {
                self.push(field, "e-mail inválido");
            }
        }
    }

    pub fn require_phone(&mut self, field: &str, value: &str) {
        if let Some(v) = self.require(field, value) {
            if !is_valid_phone(v) {
                self.push(field, "telefone deve ter DDD e 8 ou 9 dígitos");
            }
        }
    }

    pub fn require_cpf(&mut self, field: &str, value: &str) {
        if let Some(v) = self.require(field, value) {
            if !is_valid_cpf(v) {
                self.push(field, "CPF inválido");
            }
        }
    }
}

/// Keep only ASCII digits.
pub fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Brazilian phone: two-digit area code plus an 8 or 9 digit number.
pub fn is_valid_phone(value: &str) -> bool {
    matches!(digits(value).len(), 10 | 11)
}

/// CPF with both mod-11 check digits. Formatting characters are ignored.
pub fn is_valid_cpf(value: &str) -> bool {
    let d: Vec<u32> = digits(value)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if d.len() != 11 || d.iter().all(|&x| x == d[0]) {
        return false;
    }
    cpf_check_digit(&d[..9]) == d[9] && cpf_check_digit(&d[..10]) == d[10]
}

fn cpf_check_digit(prefix: &[u32]) -> u32 {
    // Weights run from len+1 down to 2.
    let weight_start = u32::try_from(prefix.len()).unwrap_or(0) + 1;
    let sum: u32 = prefix
        .iter()
        .zip((2..=weight_start).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 { 0 } else { rest }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_cpfs_pass() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("111.444.777-35"));
    }

    #[test]
    fn invalid_cpfs_fail() {
        assert!(!is_valid_cpf("529.982.247-26"));
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("1234567890"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("atleta@interbox.com.br"));
        assert!(is_valid_email("  juiz@gmail.com "));
        assert!(!is_valid_email("sem-arroba.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn phone_lengths() {
        assert!(is_valid_phone("(11) 98765-4321"));
        assert!(is_valid_phone("1133334444"));
        assert!(!is_valid_phone("98765-4321"));
        assert!(!is_valid_phone("+55 11 98765-4321"));
    }

    #[test]
    fn collects_every_error() {
        let mut errors = ValidationErrors::new();
        errors.require("nome", "  ");
        errors.require_email("email", "nope");
        errors.require_cpf("cpf", "529.982.247-25");
        assert_eq!(errors.errors().len(), 2);
        assert!(errors.has("nome"));
        assert!(errors.has("email"));
        assert!(!errors.has("cpf"));
        assert_eq!(errors.to_string(), "invalid fields: nome, email");
    }

    #[test]
    fn empty_errors_are_ok() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.require("nome", " Ana "), Some("Ana"));
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn serializes_as_list() {
        let mut errors = ValidationErrors::new();
        errors.push("email", "e-mail inválido");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json[0]["field"], "email");
    }
}

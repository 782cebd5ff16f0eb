//! Pricing constants and payment split math.
//!
//! All amounts are integer cents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::RegistrationType;

/// Basis points in 100%.
pub const BPS_SCALE: u32 = 10_000;

/// Most units of one item a single charge may carry.
pub const MAX_QUANTITY: i64 = 50;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("split percentage must be between 0 and 10000 bps, got {0}")]
    Percentage(u32),

    #[error("charge value must be positive, got {0}")]
    Value(i64),

    #[error("unknown ticket lot '{0}'")]
    UnknownTicket(String),

    #[error("quantity must be between 1 and {MAX_QUANTITY}, got {0}")]
    Quantity(i64),

    #[error("amount out of range")]
    Overflow,
}

/// Fee table. Loaded from config; defaults match the 2025 edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pricing {
    pub judge_fee: i64,
    pub staff_fee: i64,
    pub audiovisual_fee: i64,
    pub insurance_fee: i64,
    /// Ticket lot name -> price.
    pub tickets: BTreeMap<String, i64>,
}

impl Default for Pricing {
    fn default() -> Self {
        let tickets = [
            ("lote-1".to_string(), 5_000),
            ("lote-2".to_string(), 7_000),
            ("lote-3".to_string(), 9_000),
            ("vip".to_string(), 25_000),
        ]
        .into_iter()
        .collect();
        Self {
            judge_fee: 0,
            staff_fee: 0,
            audiovisual_fee: 2_990,
            insurance_fee: 3_990,
            tickets,
        }
    }
}

impl Pricing {
    pub const fn registration_fee(&self, kind: RegistrationType) -> i64 {
        match kind {
            RegistrationType::Judge => self.judge_fee,
            RegistrationType::Staff => self.staff_fee,
            RegistrationType::Audiovisual => self.audiovisual_fee,
        }
    }

    pub fn ticket_price(&self, lot: &str) -> Result<i64, PricingError> {
        self.tickets
            .get(lot)
            .copied()
            .ok_or_else(|| PricingError::UnknownTicket(lot.to_string()))
    }

    /// Price of `quantity` tickets from `lot`.
    pub fn ticket_total(&self, lot: &str, quantity: i64) -> Result<i64, PricingError> {
        line_total(self.ticket_price(lot)?, quantity)
    }
}

/// `unit_price × quantity`, with `quantity` in `1..=MAX_QUANTITY`.
pub fn line_total(unit_price: i64, quantity: i64) -> Result<i64, PricingError> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(PricingError::Quantity(quantity));
    }
    unit_price
        .checked_mul(quantity)
        .ok_or(PricingError::Overflow)
}

/// How one charge value is divided between a partner PIX key and the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitShares {
    pub partner: i64,
    pub platform: i64,
}

/// Divide `value` by `bps` basis points.
///
/// The partner share is rounded down; the platform keeps the remainder, so
/// the two always sum to `value`.
pub fn split(value: i64, bps: u32) -> Result<SplitShares, PricingError> {
    if bps > BPS_SCALE {
        return Err(PricingError::Percentage(bps));
    }
    if value <= 0 {
        return Err(PricingError::Value(value));
    }
    let partner = value
        .checked_mul(i64::from(bps))
        .ok_or(PricingError::Overflow)?
        / i64::from(BPS_SCALE);
    Ok(SplitShares {
        partner,
        platform: value - partner,
    })
}

/// `12345` -> `"R$ 123,45"`, with `.` thousands separators.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = (abs / 100).to_string();
    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}R$ {grouped},{:02}", abs % 100)
}

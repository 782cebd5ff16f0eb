//! Partner split attached to charges.
//!
//! The provider does the actual payout; we only tell it how much of each
//! charge goes to the partner's PIX key.

use serde::Serialize;

use interbox_core::config::SplitConfig;
use interbox_core::pricing::{self, PricingError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitEntry {
    pub pix_key: String,
    pub value: i64,
    pub split_type: &'static str,
}

/// Split entries for a charge of `value` cents. The provider rejects
/// zero-value splits, so a zero partner share yields no entry.
pub fn entries_for(
    value: i64,
    config: Option<&SplitConfig>,
) -> Result<Vec<SplitEntry>, PricingError> {
    let Some(config) = config else {
        return Ok(Vec::new());
    };
    let shares = pricing::split(value, config.bps)?;
    if shares.partner == 0 {
        return Ok(Vec::new());
    }
    Ok(vec![SplitEntry {
        pix_key: config.pix_key.clone(),
        value: shares.partner,
        split_type: "SPLIT_PARTNER",
    }])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn partner(bps: u32) -> SplitConfig {
        SplitConfig {
            pix_key: "parceiro@pix.com".into(),
            bps,
        }
    }

    #[test]
    fn no_config_no_split() {
        assert!(entries_for(5_000, None).unwrap().is_empty());
    }

    #[test]
    fn partner_share_in_cents() {
        let entries = entries_for(5_000, Some(&partner(1_000))).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, 500);
        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["pixKey"], "parceiro@pix.com");
        assert_eq!(json["splitType"], "SPLIT_PARTNER");
    }

    #[test]
    fn tiny_share_is_dropped() {
        assert!(entries_for(5, Some(&partner(100))).unwrap().is_empty());
    }

    #[test]
    fn free_item_cannot_be_split() {
        assert!(entries_for(0, Some(&partner(100))).is_err());
    }
}

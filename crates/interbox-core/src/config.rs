//! Configuration resolution for INTERBØX.
//!
//! Resolution order (lowest to highest):
//! 1. Built-in defaults
//! 2. JSON config file (`--config` / `INTERBOX_CONFIG`)
//! 3. Environment variables (the names the hosting platform already uses)
//! 4. CLI arguments, applied by the binaries

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::pricing::{BPS_SCALE, Pricing};

/// Complete INTERBØX configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub openpix: OpenPixConfig,
    pub resend: ResendConfig,
    pub auth: AuthConfig,
    pub pricing: Pricing,
    /// Partner share attached to every charge, when set.
    pub split: Option<SplitConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Allowed browser origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    pub max_body_bytes: usize,
    /// Upstream HTTP timeout in seconds.
    pub upstream_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8888".to_string(),
            cors_origins: Vec::new(),
            max_body_bytes: 64 * 1024,
            upstream_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenPixConfig {
    pub base_url: String,
    pub app_id: String,
}

impl Default for OpenPixConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openpix.com.br".to_string(),
            app_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResendConfig {
    pub base_url: String,
    /// No key disables outgoing e-mail.
    pub api_key: Option<String>,
    pub from: String,
    /// Copy of every confirmation goes here when set.
    pub admin_email: Option<String>,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.resend.com".to_string(),
            api_key: None,
            from: "INTERBØX 2025 <nao-responda@interbox.com.br>".to_string(),
            admin_email: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Value the payment provider sends in its `authorization` header.
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub pix_key: String,
    /// Partner share in basis points (100 = 1%).
    pub bps: u32,
}

impl Config {
    /// Fail with every missing secret at once, so a bad deploy is fixed in one pass.
    pub fn validate_for_server(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.supabase.url.is_empty() {
            missing.push("SUPABASE_URL");
        }
        if self.supabase.service_key.is_empty() {
            missing.push("SUPABASE_SERVICE_ROLE_KEY");
        }
        if self.openpix.app_id.is_empty() {
            missing.push("OPENPIX_APP_ID");
        }
        if self.auth.jwt_secret.is_empty() {
            missing.push("INTERBOX_JWT_SECRET");
        }
        if !missing.is_empty() {
            return Err(Error::Config(format!("missing {}", missing.join(", "))));
        }
        if let Some(split) = &self.split {
            if split.bps > BPS_SCALE || split.pix_key.is_empty() {
                return Err(Error::Config(format!(
                    "split needs a PIX key and at most {BPS_SCALE} bps"
                )));
            }
        }
        Ok(())
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(p) => load_config_file(p)?,
        None => Config::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Overlay environment values. `lookup` is injected so tests do not touch
/// the process environment.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(val) = get("INTERBOX_ADDR") {
        config.server.addr = val;
    }
    if let Some(val) = get("INTERBOX_CORS_ORIGINS") {
        config.server.cors_origins = val
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }
    if let Some(val) = get("SUPABASE_URL") {
        config.supabase.url = val;
    }
    if let Some(val) = get("SUPABASE_SERVICE_ROLE_KEY") {
        config.supabase.service_key = val;
    }
    if let Some(val) = get("OPENPIX_BASE_URL") {
        config.openpix.base_url = val;
    }
    if let Some(val) = get("OPENPIX_APP_ID") {
        config.openpix.app_id = val;
    }
    if let Some(val) = get("RESEND_API_KEY") {
        config.resend.api_key = Some(val);
    }
    if let Some(val) = get("RESEND_FROM") {
        config.resend.from = val;
    }
    if let Some(val) = get("INTERBOX_ADMIN_EMAIL") {
        config.resend.admin_email = Some(val);
    }
    if let Some(val) = get("INTERBOX_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = get("INTERBOX_WEBHOOK_SECRET") {
        config.auth.webhook_secret = Some(val);
    }
    if let Some(pix_key) = get("INTERBOX_SPLIT_PIX_KEY") {
        let bps = get("INTERBOX_SPLIT_BPS")
            .and_then(|v| v.parse().ok())
            .or_else(|| config.split.as_ref().map(|s| s.bps))
            .unwrap_or(0);
        config.split = Some(SplitConfig { pix_key, bps });
    }
}

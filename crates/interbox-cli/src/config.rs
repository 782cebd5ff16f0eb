//! Settings shared by the CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use interbox_core::auth::{Role, TokenManager};

use crate::api::ApiClient;

/// Lifetime of tokens minted on the fly for a single command.
const SCRIPT_TOKEN_TTL_SECS: i64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_url: String,
    /// Bearer token to use as-is.
    pub token: Option<String>,
    /// Shared secret for minting a token when none is given.
    pub jwt_secret: Option<String>,
    pub db_path: PathBuf,
    pub timeout: Duration,
}

impl CliConfig {
    /// `~/.local/share/interbox/drafts.db` or the platform equivalent.
    pub fn default_db_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("interbox").join("drafts.db"))
    }

    /// Token for API calls: the explicit one, else an admin token minted
    /// with the shared secret.
    pub fn bearer_token(&self) -> anyhow::Result<String> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token.to_string());
        }
        let secret = self
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("No API token. Pass --token or set INTERBOX_JWT_SECRET")
            })?;
        Ok(TokenManager::new(secret.as_bytes()).issue(
            "interbox-cli",
            Role::Admin,
            SCRIPT_TOKEN_TTL_SECS,
        )?)
    }

    pub fn api_client(&self) -> anyhow::Result<ApiClient> {
        Ok(ApiClient::new(&self.api_url, &self.bearer_token()?, self.timeout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, secret: Option<&str>) -> CliConfig {
        CliConfig {
            api_url: "http://localhost:8888".into(),
            token: token.map(str::to_string),
            jwt_secret: secret.map(str::to_string),
            db_path: PathBuf::from("drafts.db"),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn explicit_token_wins() {
        let cfg = config(Some("abc"), Some("secret"));
        assert_eq!(cfg.bearer_token().unwrap(), "abc");
    }

    #[test]
    fn minted_token_is_admin() {
        let cfg = config(None, Some("secret"));
        let token = cfg.bearer_token().unwrap();
        let claims = TokenManager::new(b"secret").validate(&token).unwrap();
        assert!(claims.is_admin());
    }

    #[test]
    fn no_token_source_is_an_error() {
        assert!(config(None, None).bearer_token().is_err());
        assert!(config(Some(""), Some("")).bearer_token().is_err());
    }
}

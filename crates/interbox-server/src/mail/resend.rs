//! Resend HTTP API client.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};

use super::{Email, MailError, Mailer};

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub base_url: String,
    pub api_key: String,
    /// Sender, e.g. `INTERBØX 2025 <nao-responda@interbox.com.br>`.
    pub from: String,
    /// Admin address blind-copied on messages that ask for it.
    pub admin_copy: Option<String>,
    pub timeout: std::time::Duration,
}

/// Wire body for `POST /emails`.
#[derive(Debug, Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<&'a str>,
}

#[derive(Debug)]
pub struct ResendClient {
    http: reqwest::Client,
    api_url: String,
    from: String,
    admin_copy: Option<String>,
}

impl ResendClient {
    pub fn new(config: &ResendConfig) -> Result<Self, MailError> {
        if config.api_key.is_empty() {
            return Err(MailError::Config("api_key is empty".into()));
        }
        if config.from.is_empty() {
            return Err(MailError::Config("from is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| MailError::Config("Invalid api_key format".into()))?;
        headers.insert(AUTHORIZATION, token);

        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: format!("{}/emails", config.base_url.trim_end_matches('/')),
            from: config.from.clone(),
            admin_copy: config.admin_copy.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn body<'a>(&'a self, email: &'a Email) -> SendEmail<'a> {
        SendEmail {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            bcc: self.admin_copy.as_deref().filter(|_| email.copy_admin),
        }
    }
}

#[async_trait]
impl Mailer for ResendClient {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let body = self.body(email);
        let response = self.http.post(&self.api_url).json(&body).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(subject = %email.subject, "E-mail sent");
            Ok(())
        } else {
            let status_code = status.as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!(status = status_code, body = %body, "Resend API returned error");
            Err(MailError::Api {
                status: status_code,
                body,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(api_key: &str) -> ResendConfig {
        ResendConfig {
            base_url: "https://api.resend.com/".into(),
            api_key: api_key.into(),
            from: "INTERBØX <nao-responda@interbox.com.br>".into(),
            admin_copy: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn empty_key_returns_config_error() {
        assert!(matches!(
            ResendClient::new(&config("")).unwrap_err(),
            MailError::Config(_)
        ));
    }

    #[test]
    fn api_url_is_emails_endpoint() {
        let client = ResendClient::new(&config("re_test")).unwrap();
        assert_eq!(client.api_url(), "https://api.resend.com/emails");
    }

    fn email(copy_admin: bool) -> Email {
        Email {
            to: vec!["ana@example.com".to_string()],
            subject: "Oi".into(),
            html: "<p>Oi</p>".into(),
            copy_admin,
        }
    }

    #[test]
    fn body_omits_missing_bcc() {
        let client = ResendClient::new(&config("re_test")).unwrap();
        let message = email(true);
        let json = serde_json::to_value(client.body(&message)).unwrap();
        assert_eq!(json["to"][0], "ana@example.com");
        assert!(json.get("bcc").is_none());
    }

    #[test]
    fn admin_is_copied_only_when_asked() {
        let mut cfg = config("re_test");
        cfg.admin_copy = Some("admin@interbox.com.br".into());
        let client = ResendClient::new(&cfg).unwrap();

        let copied = email(true);
        let json = serde_json::to_value(client.body(&copied)).unwrap();
        assert_eq!(json["bcc"], "admin@interbox.com.br");

        let plain = email(false);
        let json = serde_json::to_value(client.body(&plain)).unwrap();
        assert!(json.get("bcc").is_none());
    }
}

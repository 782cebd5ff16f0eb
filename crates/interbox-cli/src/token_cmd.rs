//! `token`: mint a bearer token with the shared secret.

use std::io::{self, Write};

use interbox_core::auth::{Role, TokenManager};

use crate::config::CliConfig;

#[derive(clap::Args, Debug)]
pub struct TokenArgs {
    /// Role carried by the token (anon or admin).
    #[arg(long, default_value = "anon")]
    pub role: Role,

    /// Subject recorded in the token.
    #[arg(long, default_value = "interbox-cli")]
    pub subject: String,

    /// Validity in seconds.
    #[arg(long, default_value_t = 86_400)]
    pub ttl_secs: i64,
}

pub fn run(args: &TokenArgs, config: &CliConfig) -> anyhow::Result<()> {
    let secret = config
        .jwt_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Set INTERBOX_JWT_SECRET or pass --jwt-secret"))?;
    let token =
        TokenManager::new(secret.as_bytes()).issue(&args.subject, args.role, args.ttl_secs)?;
    writeln!(io::stdout(), "{token}")?;
    Ok(())
}

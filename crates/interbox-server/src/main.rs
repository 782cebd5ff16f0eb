//! INTERBØX 2025 API server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use interbox_core::auth::TokenManager;
use interbox_core::config::load_config;
use interbox_core::tracing_init::init_tracing;

use interbox_server::mail::{DisabledMailer, Mailer, ResendClient, ResendConfig};
use interbox_server::payments::{OpenPixClient, OpenPixConfig};
use interbox_server::store::{SupabaseClient, SupabaseConfig};
use interbox_server::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "interbox-server")]
#[command(
    version,
    about = "INTERBØX 2025 API server - registrations, insurance, PIX charges"
)]
struct Args {
    /// JSON config file. Environment variables override its values.
    #[arg(long, env = "INTERBOX_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and INTERBOX_ADDR).
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("interbox_server=info,tower_http=info", args.log_json, false);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        config.server.addr = addr.to_string();
    }
    config.validate_for_server()?;
    let addr: SocketAddr = config.server.addr.parse()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        "Starting interbox-server"
    );

    let timeout = Duration::from_secs(config.server.upstream_timeout_secs);
    let store = SupabaseClient::new(&SupabaseConfig {
        url: config.supabase.url.clone(),
        service_key: config.supabase.service_key.clone(),
        timeout,
    })?;
    let payments = OpenPixClient::new(&OpenPixConfig {
        base_url: config.openpix.base_url.clone(),
        app_id: config.openpix.app_id.clone(),
        timeout,
    })?;
    let mailer: Arc<dyn Mailer> = match &config.resend.api_key {
        Some(api_key) => Arc::new(ResendClient::new(&ResendConfig {
            base_url: config.resend.base_url.clone(),
            api_key: api_key.clone(),
            from: config.resend.from.clone(),
            admin_copy: config.resend.admin_email.clone(),
            timeout,
        })?),
        None => {
            warn!("RESEND_API_KEY not set, e-mail disabled");
            Arc::new(DisabledMailer)
        }
    };
    if config.auth.webhook_secret.is_none() {
        warn!("INTERBOX_WEBHOOK_SECRET not set, payment webhooks will be refused");
    }
    if let Some(split) = &config.split {
        info!(bps = split.bps, "Payment split enabled");
    }

    let state = AppState {
        store: Arc::new(store),
        payments: Arc::new(payments),
        mailer,
        tokens: TokenManager::new(config.auth.jwt_secret.as_bytes()),
        pricing: Arc::new(config.pricing.clone()),
        split: config.split.clone(),
        webhook_secret: config.auth.webhook_secret.clone(),
    };
    let app = build_router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

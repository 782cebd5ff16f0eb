//! INTERBØX CLI
//!
//! Developer scripts for the INTERBØX 2025 backend.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::debug;

use interbox_core::tracing_init::init_tracing;

use interbox_cli::config::CliConfig;
use interbox_cli::drafts_cmd::{self, DraftsAction};
use interbox_cli::poll_cmd::{self, PollArgs};
use interbox_cli::sync_cmd;
use interbox_cli::token_cmd::{self, TokenArgs};

#[derive(Parser, Debug)]
#[command(name = "interbox")]
#[command(version, about = "INTERBØX 2025 developer CLI", long_about = None)]
struct Cli {
    /// API server base URL.
    #[arg(long, env = "INTERBOX_API_URL", default_value = "http://localhost:8888")]
    api_url: String,

    /// Bearer token for API calls.
    #[arg(long, env = "INTERBOX_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Shared JWT secret, used to mint a token when --token is absent.
    #[arg(long, env = "INTERBOX_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Drafts database path.
    #[arg(long, env = "INTERBOX_DRAFTS_DB")]
    db: Option<PathBuf>,

    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Output logs as JSON.
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage locally imported drafts.
    Drafts {
        #[command(subcommand)]
        action: DraftsAction,
    },
    /// Compare drafts with registrations on the server.
    Compare,
    /// Send drafts missing on the server.
    Migrate {
        /// Report what would be sent without sending.
        #[arg(long)]
        dry_run: bool,
    },
    /// Poll a charge until it is paid, expires, or attempts run out.
    Poll(PollArgs),
    /// Print a bearer token signed with the shared secret.
    Token(TokenArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("interbox_cli=info", cli.log_json, true);

    let db_path = match cli.db {
        Some(path) => path,
        None => CliConfig::default_db_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine data directory; pass --db"))?,
    };
    let config = CliConfig {
        api_url: cli.api_url,
        token: cli.token,
        jwt_secret: cli.jwt_secret,
        db_path,
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    debug!(api_url = %config.api_url, "CLI configured");

    match cli.command {
        Commands::Drafts { action } => drafts_cmd::run(action, &config).await,
        Commands::Compare => sync_cmd::run_compare(&config).await,
        Commands::Migrate { dry_run } => sync_cmd::run_migrate(&config, dry_run).await,
        Commands::Poll(args) => poll_cmd::run(args, &config).await,
        Commands::Token(args) => token_cmd::run(&args, &config),
    }
}

//! `poll`: wait for a PIX charge to be paid.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::CliConfig;
use crate::poller::{self, PollConfig, PollOutcome};

#[derive(clap::Args, Debug)]
pub struct PollArgs {
    /// Correlation ID returned by /create-charge.
    pub correlation_id: String,

    /// Seconds between status checks.
    #[arg(long, default_value_t = 5)]
    pub interval_secs: u64,

    /// Give up after this many checks.
    #[arg(long, default_value_t = 60)]
    pub max_attempts: u32,
}

pub async fn run(args: PollArgs, config: &CliConfig) -> anyhow::Result<()> {
    let client = config.api_client()?;
    let poll_config = PollConfig {
        interval: Duration::from_secs(args.interval_secs),
        max_attempts: args.max_attempts.max(1),
    };
    let outcome = poller::poll(&client, &args.correlation_id, poll_config).await;

    let mut out = io::stdout();
    match outcome {
        PollOutcome::Finished { status, attempts } => {
            writeln!(out, "{}: {status} after {attempts} check(s)", args.correlation_id)?;
            if !outcome.is_paid() {
                anyhow::bail!("charge {} ended unpaid ({status})", args.correlation_id);
            }
        }
        PollOutcome::GaveUp { last, attempts } => {
            let last = last.map_or_else(|| "no answer".to_string(), |s| s.to_string());
            writeln!(
                out,
                "{}: still {last} after {attempts} check(s)",
                args.correlation_id
            )?;
            anyhow::bail!("gave up waiting for {}", args.correlation_id);
        }
    }
    Ok(())
}

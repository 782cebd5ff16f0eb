//! Payment-status polling.
//!
//! Asks for a charge's status every `interval` until the provider reports a
//! terminal status or `max_attempts` requests have been made. A failed
//! request still counts as an attempt.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use interbox_core::models::ChargeStatus;

#[async_trait]
pub trait StatusSource: Send + Sync {
    type Error: fmt::Display + Send;

    async fn status(&self, correlation_id: &str) -> Result<ChargeStatus, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The charge reached `COMPLETED` or `EXPIRED`.
    Finished { status: ChargeStatus, attempts: u32 },
    /// Attempts ran out; `last` is the last status seen, if any.
    GaveUp {
        last: Option<ChargeStatus>,
        attempts: u32,
    },
}

impl PollOutcome {
    pub const fn is_paid(&self) -> bool {
        matches!(
            self,
            Self::Finished {
                status: ChargeStatus::Completed,
                ..
            }
        )
    }
}

pub async fn poll<S: StatusSource + ?Sized>(
    source: &S,
    correlation_id: &str,
    config: PollConfig,
) -> PollOutcome {
    let mut last = None;
    for attempt in 1..=config.max_attempts {
        match source.status(correlation_id).await {
            Ok(status) if status.is_terminal() => {
                info!(correlation_id, %status, attempt, "Charge finished");
                return PollOutcome::Finished {
                    status,
                    attempts: attempt,
                };
            }
            Ok(status) => {
                debug!(correlation_id, %status, attempt, "Charge pending");
                last = Some(status);
            }
            Err(e) => {
                warn!(correlation_id, attempt, error = %e, "Status check failed");
            }
        }
        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }
    PollOutcome::GaveUp {
        last,
        attempts: config.max_attempts,
    }
}

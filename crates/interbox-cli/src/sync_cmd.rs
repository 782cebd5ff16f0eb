//! `compare` and `migrate`: reconcile local drafts with the server.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use async_trait::async_trait;
use tracing::{info, warn};

use interbox_core::models::{Registration, RegistrationForm};

use crate::api::{ApiClient, ApiError};
use crate::config::CliConfig;
use crate::drafts::DraftStore;
use crate::drafts_cmd::open_store;
use crate::reconcile;

/// Where drafts are sent.
#[async_trait]
pub trait RemoteRegistrations: Send + Sync {
    async fn list(&self) -> Result<Vec<Registration>, ApiError>;

    async fn save(&self, form: &RegistrationForm) -> Result<Registration, ApiError>;
}

#[async_trait]
impl RemoteRegistrations for ApiClient {
    async fn list(&self) -> Result<Vec<Registration>, ApiError> {
        self.list_registrations().await
    }

    async fn save(&self, form: &RegistrationForm) -> Result<Registration, ApiError> {
        self.save_registration(form).await
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Drafts sent and accepted.
    pub sent: usize,
    /// Drafts found remotely and marked synced without sending.
    pub matched: usize,
    /// Drafts that would be sent (dry run).
    pub pending: usize,
    /// `(draft id, reason)` for every rejected or failed draft.
    pub failed: Vec<(String, String)>,
}

pub async fn migrate(
    store: &DraftStore,
    remote: &dyn RemoteRegistrations,
    dry_run: bool,
) -> anyhow::Result<MigrationReport> {
    let drafts = store.unsynced_drafts().await?;
    let rows = remote.list().await?;
    let comparison = reconcile::compare(&drafts, &rows);
    let mut report = MigrationReport::default();

    for (draft, remote_id) in &comparison.present {
        if !dry_run {
            store.mark_synced(&draft.id, remote_id).await?;
        }
        report.matched += 1;
    }

    for draft in comparison.missing {
        if dry_run {
            report.pending += 1;
            continue;
        }
        match remote.save(&draft.to_form()).await {
            Ok(saved) => {
                store.mark_synced(&draft.id, &saved.id).await?;
                info!(draft = %draft.id, remote = %saved.id, "Draft migrated");
                report.sent += 1;
            }
            Err(e) => {
                warn!(draft = %draft.id, error = %e, "Draft rejected");
                report.failed.push((draft.id.clone(), e.to_string()));
            }
        }
    }
    Ok(report)
}

pub async fn run_compare(config: &CliConfig) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let client = config.api_client()?;
    let drafts = store.list_drafts().await?;
    let rows = client.list_registrations().await?;
    let comparison = reconcile::compare(&drafts, &rows);

    let mut out = io::stdout();
    writeln!(
        out,
        "{} local draft(s), {} remote registration(s)",
        drafts.len(),
        rows.len()
    )?;
    writeln!(out, "Already on server: {}", comparison.present.len())?;
    for (draft, remote_id) in &comparison.present {
        writeln!(out, "  {} {} -> {remote_id}", draft.tipo, draft.email)?;
    }
    writeln!(out, "Missing on server: {}", comparison.missing.len())?;
    for draft in &comparison.missing {
        writeln!(out, "  {} {} {} ({})", draft.tipo, draft.nome, draft.email, draft.id)?;
    }
    Ok(())
}

pub async fn run_migrate(config: &CliConfig, dry_run: bool) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let client = config.api_client()?;
    let report = migrate(&store, &client, dry_run).await?;

    let mut out = io::stdout();
    if dry_run {
        writeln!(
            out,
            "Dry run: {} draft(s) would be sent, {} already on server",
            report.pending, report.matched
        )?;
        return Ok(());
    }
    writeln!(
        out,
        "Sent {}, matched {}, failed {}",
        report.sent,
        report.matched,
        report.failed.len()
    )?;
    for (id, reason) in &report.failed {
        writeln!(out, "  {id}: {reason}")?;
    }
    if !report.failed.is_empty() {
        anyhow::bail!("{} draft(s) could not be migrated", report.failed.len());
    }
    Ok(())
}

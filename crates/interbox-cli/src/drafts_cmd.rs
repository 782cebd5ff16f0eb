//! Drafts subcommands: import, list.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::CliConfig;
use crate::drafts::{DraftStore, parse_export};

/// Drafts subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum DraftsAction {
    /// Import a localStorage JSON export.
    Import {
        /// Path to the exported JSON file.
        file: PathBuf,
    },
    /// List stored drafts.
    List {
        /// Only drafts not yet sent to the API.
        #[arg(long)]
        unsynced: bool,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

pub async fn open_store(config: &CliConfig) -> anyhow::Result<DraftStore> {
    info!(path = %config.db_path.display(), "Opening drafts database");
    Ok(DraftStore::open(&config.db_path).await?)
}

/// Execute a drafts subcommand.
pub async fn run(action: DraftsAction, config: &CliConfig) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    match action {
        DraftsAction::Import { file } => import_file(&store, &file).await,
        DraftsAction::List { unsynced } => list(&store, unsynced).await,
    }
}

/// Parse `text` and store every draft in it.
pub async fn import_export(store: &DraftStore, text: &str) -> anyhow::Result<ImportSummary> {
    let parsed = parse_export(text)?;
    let mut summary = ImportSummary {
        skipped: parsed.skipped.len(),
        ..ImportSummary::default()
    };
    for reason in &parsed.skipped {
        info!(reason = %reason, "Draft skipped");
    }
    for draft in &parsed.drafts {
        if store.insert_draft(draft).await? {
            summary.imported += 1;
        } else {
            summary.duplicates += 1;
        }
    }
    Ok(summary)
}

async fn import_file(store: &DraftStore, file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", file.display()))?;
    let summary = import_export(store, &text).await?;
    let mut out = io::stdout();
    writeln!(
        out,
        "Imported {} draft(s), {} already present, {} skipped",
        summary.imported, summary.duplicates, summary.skipped
    )?;
    Ok(())
}

async fn list(store: &DraftStore, unsynced: bool) -> anyhow::Result<()> {
    let drafts = if unsynced {
        store.unsynced_drafts().await?
    } else {
        store.list_drafts().await?
    };
    let mut out = io::stdout();
    if drafts.is_empty() {
        writeln!(out, "No drafts")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<36}  {:<12}  {:<28}  {:<11}  REMOTE",
        "ID", "TIPO", "EMAIL", "CPF"
    )?;
    for d in &drafts {
        writeln!(
            out,
            "{:<36}  {:<12}  {:<28}  {:<11}  {}",
            d.id,
            d.tipo,
            d.email,
            d.cpf,
            d.remote_id.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

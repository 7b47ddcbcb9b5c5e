//! Sync command - Replay a membership database export

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;
use tracing::{info, warn};

use moncompte_sync::{Member, SyncOutcome};

use super::Adapter;
use crate::error::{CliError, CliResult};

/// Arguments for the sync command
#[derive(Args)]
pub struct SyncArgs {
    /// JSON array of members with their `expires_at` (Unix seconds)
    pub file: PathBuf,
}

/// One member of the export.
#[derive(Debug, Deserialize)]
pub struct BatchRecord {
    #[serde(flatten)]
    pub member: Member,

    pub expires_at: i64,
}

/// Counts for a finished batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub created: usize,
    pub status_changed: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn into_result(self) -> CliResult<Self> {
        if self.failed > 0 {
            return Err(CliError::BatchFailed {
                failed: self.failed,
                total: self.total,
            });
        }
        Ok(self)
    }
}

/// Read an export file.
pub fn load_batch(path: &Path) -> CliResult<Vec<BatchRecord>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Validation(format!("{}: {e}", path.display())))
}

/// Sync each record in turn. A failed member is logged and skipped.
pub async fn run_batch(records: &[BatchRecord], adapter: &Adapter) -> BatchSummary {
    let mut summary = BatchSummary {
        total: records.len(),
        ..BatchSummary::default()
    };

    for record in records {
        let id = record.member.id;
        match adapter.sync_member(&record.member, record.expires_at).await {
            Ok(report) => {
                if report.entry == SyncOutcome::Created {
                    summary.created += 1;
                }
                if report.status.wrote() {
                    summary.status_changed += 1;
                }
            }
            Err(e) => {
                warn!(member_id = %id, error = %e, "Member sync failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Execute the sync command
pub async fn execute(args: SyncArgs, adapter: &Adapter) -> CliResult<()> {
    let records = load_batch(&args.file)?;
    info!(count = records.len(), file = %args.file.display(), "Syncing members");

    let summary = run_batch(&records, adapter).await;
    println!(
        "{} members: {} created, {} status changes, {} failed",
        summary.total, summary.created, summary.status_changed, summary.failed
    );

    summary.into_result().map(|_| ())
}

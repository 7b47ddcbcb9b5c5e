//! Reconcile command - Align the membership tag with an expiry date

use chrono::{DateTime, NaiveDate};
use clap::Args;

use moncompte_sync::MemberId;

use super::Adapter;
use crate::error::CliResult;

/// Arguments for the reconcile command
#[derive(Args)]
pub struct ReconcileArgs {
    /// Membership number
    pub id: MemberId,

    /// Subscription expiry: Unix seconds, RFC 3339 timestamp or YYYY-MM-DD (UTC midnight)
    #[arg(value_parser = parse_expiry)]
    pub expires_at: i64,
}

/// Parse an expiry into Unix seconds.
pub fn parse_expiry(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();

    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.timestamp());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().timestamp());
    }

    Err(format!(
        "'{raw}' is not Unix seconds, an RFC 3339 timestamp or a YYYY-MM-DD date"
    ))
}

/// Execute the reconcile command
pub async fn execute(args: ReconcileArgs, adapter: &Adapter) -> CliResult<()> {
    let outcome = adapter
        .reconcile_membership_status(args.id, args.expires_at)
        .await?;
    println!("{}: {}", args.id, outcome);
    Ok(())
}

//! Upsert command - Refresh a member's contact fields

use clap::Args;

use moncompte_sync::{MemberId, ProfileData};

use super::Adapter;
use crate::error::CliResult;

/// Arguments for the upsert command
#[derive(Args)]
pub struct UpsertArgs {
    /// Membership number
    pub id: MemberId,

    /// Last name
    #[arg(long)]
    pub nom: String,

    /// First name
    #[arg(long)]
    pub prenom: String,

    /// Contact email (the configured default is used when omitted)
    #[arg(long)]
    pub email: Option<String>,
}

/// Execute the upsert command
pub async fn execute(args: UpsertArgs, adapter: &Adapter) -> CliResult<()> {
    let mut data = ProfileData::new(args.nom, args.prenom);
    data.email = args.email;

    let outcome = adapter.upsert_profile(args.id, &data).await?;
    println!("{}: {}", args.id, outcome);
    Ok(())
}

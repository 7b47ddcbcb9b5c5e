//! Create command - Add a member's entry if it is missing

use clap::Args;

use moncompte_sync::{Member, MemberId};

use super::Adapter;
use crate::error::CliResult;

/// Arguments for the create command
#[derive(Args)]
pub struct CreateArgs {
    /// Membership number
    #[arg(long)]
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

impl CreateArgs {
    fn member(self) -> Member {
        let member = Member::new(self.id, self.nom, self.prenom);
        match self.email {
            Some(email) => member.with_email(email),
            None => member,
        }
    }
}

/// Execute the create command
pub async fn execute(args: CreateArgs, adapter: &Adapter) -> CliResult<()> {
    let member = args.member();
    let outcome = adapter.create_member_if_absent(&member).await?;
    println!("{}: {}", member.id, outcome);
    Ok(())
}

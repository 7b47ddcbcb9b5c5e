//! moncompte-sync - Push MonCompte members into the LDAP directory
//!
//! This CLI lets operators:
//! - Create a member's entry if it is missing
//! - Align the `membre` tag with a subscription expiry
//! - Refresh a member's contact fields
//! - Replay a batch export from the membership database
//! - Check the LDAP connection

use clap::{Parser, Subcommand};
use tracing::warn;

mod commands;
mod error;
mod logging;

use commands::GlobalOpts;
use error::CliResult;

/// MonCompte LDAP membership sync
#[derive(Parser)]
#[command(name = "moncompte-sync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a member's entry unless it already exists
    Create(commands::create::CreateArgs),

    /// Add or remove the membership tag according to an expiry date
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Update a member's name and email, creating the entry if needed
    Upsert(commands::upsert::UpsertArgs),

    /// Sync every member of a JSON export
    Sync(commands::sync::SyncArgs),

    /// Test the LDAP connection and bind
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    logging::init_logging(cli.global.log_format, "info")?;

    let adapter = commands::open_adapter(&cli.global).await?;

    let result = match cli.command {
        Commands::Create(args) => commands::create::execute(args, &adapter).await,
        Commands::Reconcile(args) => commands::reconcile::execute(args, &adapter).await,
        Commands::Upsert(args) => commands::upsert::execute(args, &adapter).await,
        Commands::Sync(args) => commands::sync::execute(args, &adapter).await,
        Commands::Check => commands::check::execute(&adapter).await,
    };

    if let Err(e) = adapter.close().await {
        warn!(error = %e, "Failed to close LDAP session");
    }

    result
}

//! Command implementations

pub mod check;
pub mod create;
pub mod reconcile;
pub mod sync;
pub mod upsert;

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use moncompte_connector::{Directory, DirectoryError, InMemoryDirectory};
use moncompte_connector_ldap::LdapDirectory;
use moncompte_sync::{DirectorySyncAdapter, SyncConfig, DEFAULT_CONFIG_PATH};

use crate::error::CliResult;
use crate::logging::LogFormat;

/// Adapter over whichever directory the options select.
pub type Adapter = DirectorySyncAdapter<Box<dyn Directory>>;

/// Options shared by every command
#[derive(Args)]
pub struct GlobalOpts {
    /// Path to the LDAP sync configuration file
    #[arg(
        long,
        global = true,
        env = "MONCOMPTE_LDAP_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Write to an in-memory directory instead of the LDAP server
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// Load the configuration and open the adapter it describes.
pub async fn open_adapter(opts: &GlobalOpts) -> CliResult<Adapter> {
    let config = SyncConfig::load(&opts.config)?;

    let adapter = if opts.dry_run {
        info!("Dry run: changes go to an in-memory directory");
        DirectorySyncAdapter::initialize(&config, |_| {
            std::future::ready(Ok::<Box<dyn Directory>, DirectoryError>(Box::new(
                InMemoryDirectory::new(),
            )))
        })
        .await
    } else {
        DirectorySyncAdapter::initialize(&config, |ldap| async move {
            let directory = LdapDirectory::connect(ldap).await?;
            Ok::<Box<dyn Directory>, DirectoryError>(Box::new(directory))
        })
        .await
    };

    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moncompte_sync::ConnectionStatus;
    use std::io::Write;

    fn opts(config: PathBuf, dry_run: bool) -> GlobalOpts {
        GlobalOpts {
            config,
            log_format: LogFormat::Pretty,
            dry_run,
        }
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_open_adapter_dry_run() {
        let file = config_file(
            r#"{"host": "ldap.example.org", "userdn": "cn=admin,dc=example,dc=org",
                "basedn": "ou=membres,dc=example,dc=org", "defaultEmail": "noreply@example.org"}"#,
        );

        let adapter = open_adapter(&opts(file.path().to_path_buf(), true))
            .await
            .unwrap();

        assert_eq!(adapter.connection_status(), ConnectionStatus::Connected);
        assert_eq!(
            adapter.directory().map(|d| d.display_name()),
            Some("in-memory")
        );
    }

    #[tokio::test]
    async fn test_open_adapter_disabled() {
        let file = config_file(r#"{"disabled": true}"#);

        let adapter = open_adapter(&opts(file.path().to_path_buf(), false))
            .await
            .unwrap();

        assert_eq!(adapter.connection_status(), ConnectionStatus::Disabled);
    }

    #[tokio::test]
    async fn test_open_adapter_missing_config() {
        let err = open_adapter(&opts(PathBuf::from("/nonexistent/local_ldap.json"), true))
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
    }
}

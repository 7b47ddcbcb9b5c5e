//! Check command - Verify the LDAP connection

use moncompte_connector::Directory;
use moncompte_sync::ConnectionStatus;

use super::Adapter;
use crate::error::CliResult;

/// Execute the check command
pub async fn execute(adapter: &Adapter) -> CliResult<()> {
    match adapter.test_connection().await? {
        ConnectionStatus::Disabled => println!("LDAP sync is disabled"),
        _ => {
            let name = adapter
                .directory()
                .map(|d| d.display_name())
                .unwrap_or("LDAP");
            println!("Connection OK ({name})");
        }
    }
    Ok(())
}

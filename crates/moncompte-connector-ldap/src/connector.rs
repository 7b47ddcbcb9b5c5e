//! LDAP Connector implementation
//!
//! Implements the `Directory` trait on top of an `ldap3` session.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Mod, Scope, SearchEntry};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use moncompte_connector::error::{DirectoryError, DirectoryResult};
use moncompte_connector::operation::{DirectoryEntry, Modification, NewEntry};
use moncompte_connector::traits::Directory;

use crate::config::LdapConfig;

/// LDAP result code: success.
const RC_SUCCESS: u32 = 0;
/// LDAP result code: noSuchObject.
const RC_NO_SUCH_OBJECT: u32 = 32;
/// LDAP result code: invalidCredentials.
const RC_INVALID_CREDENTIALS: u32 = 49;
/// LDAP result code: entryAlreadyExists.
const RC_ALREADY_EXISTS: u32 = 68;

/// A bound LDAP session used as the sync target.
pub struct LdapDirectory {
    /// Configuration.
    config: LdapConfig,

    /// Display name for this directory instance.
    display_name: String,

    /// The bound session; `None` once disposed.
    connection: RwLock<Option<Ldap>>,
}

impl LdapDirectory {
    /// Connect and bind.
    ///
    /// The session is opened with LDAPv3 and never chases referrals. It is
    /// kept for the lifetime of the returned value; there is no reconnect.
    #[instrument(skip(config), fields(host = %config.host))]
    pub async fn connect(config: LdapConfig) -> DirectoryResult<Self> {
        config.validate()?;

        let ldap = Self::create_connection(&config).await?;
        let display_name = format!("LDAP: {}", config.host);

        Ok(Self {
            config,
            display_name,
            connection: RwLock::new(Some(ldap)),
        })
    }

    /// The configuration this directory was opened with.
    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    async fn create_connection(config: &LdapConfig) -> DirectoryResult<Ldap> {
        let url = config.url();

        debug!(url = %url, "Connecting to LDAP server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(config.connect_timeout_secs))
            .set_starttls(config.use_starttls);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| {
                DirectoryError::connection_failed_with_source(
                    format!("Failed to connect to LDAP server at {url}"),
                    e,
                )
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let bind_dn = &config.bind_dn;
        let bind_password = config.bind_password.as_deref().unwrap_or("");

        debug!(bind_dn = %bind_dn, "Performing LDAP bind");

        let result = ldap
            .simple_bind(bind_dn, bind_password)
            .await
            .map_err(|e| {
                DirectoryError::connection_failed_with_source(
                    format!("LDAP bind failed for {bind_dn}"),
                    e,
                )
            })?;

        match result.rc {
            RC_SUCCESS => {}
            RC_INVALID_CREDENTIALS => return Err(DirectoryError::AuthenticationFailed),
            rc => {
                return Err(DirectoryError::connection_failed(format!(
                    "LDAP bind failed with code {rc}: {}",
                    result.text
                )))
            }
        }

        info!(host = %config.host, "LDAP connection established successfully");

        Ok(ldap)
    }

    /// Get a handle on the bound session.
    async fn session(&self) -> DirectoryResult<Ldap> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or_else(|| DirectoryError::NotConnected {
                reason: "LDAP directory has been disposed".to_string(),
            })
    }

    /// Map a non-success result to an error, keeping the server's message.
    fn check_result(result: &LdapResult, dn: &str) -> DirectoryResult<()> {
        match result.rc {
            RC_SUCCESS => Ok(()),
            RC_NO_SUCH_OBJECT => Err(DirectoryError::ObjectNotFound { dn: dn.to_string() }),
            RC_ALREADY_EXISTS => Err(DirectoryError::ObjectAlreadyExists { dn: dn.to_string() }),
            rc => Err(DirectoryError::operation_failed(
                rc,
                Self::result_message(result),
            )),
        }
    }

    fn result_message(result: &LdapResult) -> String {
        if result.text.is_empty() {
            format!("LDAP operation failed with code {}", result.rc)
        } else {
            result.text.clone()
        }
    }

    /// Convert a modification to the form `ldap3` expects.
    fn to_ldap_mod(change: Modification) -> Mod<String> {
        match change {
            Modification::Add(name, values) => Mod::Add(name, values.into_iter().collect()),
            Modification::Delete(name, values) => Mod::Delete(name, values.into_iter().collect()),
            Modification::Replace(name, values) => {
                Mod::Replace(name, values.into_iter().collect())
            }
        }
    }

    /// Convert entry attributes to the form `ldap3` expects.
    fn to_ldap_attrs(attributes: Vec<(String, Vec<String>)>) -> Vec<(String, HashSet<String>)> {
        attributes
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| (name, values.into_iter().collect()))
            .collect()
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> DirectoryResult<()> {
        let mut ldap = self.session().await?;

        let result = ldap
            .search(
                &self.config.base_dn,
                Scope::Base,
                "(objectClass=*)",
                vec!["dn"],
            )
            .await
            .map_err(|e| DirectoryError::connection_failed_with_source("Test search failed", e))?;

        let (entries, _res) = result.success().map_err(|e| {
            DirectoryError::connection_failed(format!("Test search failed: {e}"))
        })?;

        if entries.is_empty() {
            return Err(DirectoryError::connection_failed(format!(
                "Base DN '{}' not found or not accessible",
                self.config.base_dn
            )));
        }

        info!("LDAP connection test successful");
        Ok(())
    }

    #[instrument(skip(self, attributes))]
    async fn lookup(
        &self,
        dn: &str,
        attributes: &[&str],
    ) -> DirectoryResult<Option<DirectoryEntry>> {
        let mut ldap = self.session().await?;

        let attrs: Vec<&str> = if attributes.is_empty() {
            vec!["*"]
        } else {
            attributes.to_vec()
        };

        let ldap3::SearchResult(entries, result) = ldap
            .search(dn, Scope::Base, "(objectClass=*)", attrs)
            .await
            .map_err(|e| DirectoryError::protocol_with_source(format!("LDAP search failed: {dn}"), e))?;

        if result.rc == RC_NO_SUCH_OBJECT {
            debug!(dn = %dn, "No LDAP entry at DN");
            return Ok(None);
        }
        Self::check_result(&result, dn)?;

        Ok(entries.into_iter().next().map(|raw| {
            let entry = SearchEntry::construct(raw);
            DirectoryEntry::from_attributes(entry.dn, &entry.attrs)
        }))
    }

    #[instrument(skip(self, entry), fields(dn = %entry.dn()))]
    async fn add(&self, entry: NewEntry) -> DirectoryResult<()> {
        let mut ldap = self.session().await?;
        let (dn, attributes) = entry.into_parts();

        debug!("Creating LDAP entry");

        let result = ldap
            .add(&dn, Self::to_ldap_attrs(attributes))
            .await
            .map_err(|e| {
                DirectoryError::protocol_with_source(format!("Failed to create entry: {dn}"), e)
            })?;

        Self::check_result(&result, &dn)?;

        info!("LDAP entry created successfully");
        Ok(())
    }

    #[instrument(skip(self, changes))]
    async fn modify(&self, dn: &str, changes: Vec<Modification>) -> DirectoryResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut ldap = self.session().await?;

        debug!(count = changes.len(), "Updating LDAP entry");

        let mods: Vec<Mod<String>> = changes.into_iter().map(Self::to_ldap_mod).collect();

        let result = ldap.modify(dn, mods).await.map_err(|e| {
            DirectoryError::protocol_with_source(format!("Failed to update entry: {dn}"), e)
        })?;

        Self::check_result(&result, dn)?;

        debug!("LDAP entry updated successfully");
        Ok(())
    }

    async fn dispose(&self) -> DirectoryResult<()> {
        let mut conn_guard = self.connection.write().await;
        if let Some(mut ldap) = conn_guard.take() {
            if let Err(e) = ldap.unbind().await {
                warn!(error = %e, "Error during LDAP unbind");
            }
        }

        info!("LDAP directory disposed");
        Ok(())
    }
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("display_name", &self.display_name)
            .field("config", &self.config.redacted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rc: u32, text: &str) -> LdapResult {
        LdapResult {
            rc,
            matched: String::new(),
            text: text.to_string(),
            refs: vec![],
            ctrls: vec![],
        }
    }

    #[test]
    fn test_check_result_maps_codes() {
        let dn = "cn=1234,dc=example,dc=org";

        assert!(LdapDirectory::check_result(&result(0, ""), dn).is_ok());
        assert!(matches!(
            LdapDirectory::check_result(&result(32, "No such object"), dn),
            Err(DirectoryError::ObjectNotFound { .. })
        ));
        assert!(matches!(
            LdapDirectory::check_result(&result(68, "Already exists"), dn),
            Err(DirectoryError::ObjectAlreadyExists { .. })
        ));

        let err = LdapDirectory::check_result(&result(50, "Insufficient access"), dn).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient access (result code 50)");
    }

    #[test]
    fn test_result_message_falls_back_to_code() {
        assert_eq!(
            LdapDirectory::result_message(&result(53, "")),
            "LDAP operation failed with code 53"
        );
    }

    #[test]
    fn test_to_ldap_mod() {
        match LdapDirectory::to_ldap_mod(Modification::delete("description", "membre")) {
            Mod::Delete(name, values) => {
                assert_eq!(name, "description");
                assert!(values.contains("membre"));
            }
            _ => panic!("Expected Mod::Delete"),
        }

        match LdapDirectory::to_ldap_mod(Modification::replace("sn", "Dupont")) {
            Mod::Replace(name, values) => {
                assert_eq!(name, "sn");
                assert_eq!(values.len(), 1);
            }
            _ => panic!("Expected Mod::Replace"),
        }
    }

    #[test]
    fn test_to_ldap_attrs_skips_empty_values() {
        let attrs = LdapDirectory::to_ldap_attrs(vec![
            ("cn".to_string(), vec!["1234".to_string()]),
            ("mail".to_string(), vec![]),
            (
                "objectClass".to_string(),
                vec!["top".to_string(), "person".to_string()],
            ),
        ]);

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1].0, "objectClass");
        assert_eq!(attrs[1].1.len(), 2);
    }
}

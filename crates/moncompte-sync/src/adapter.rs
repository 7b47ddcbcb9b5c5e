//! Directory sync adapter
//!
//! Pushes member records into the directory: creates missing entries, keeps
//! the `membre` tag in line with the subscription expiry, and refreshes
//! contact fields.

use std::fmt;
use std::future::Future;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use moncompte_connector::error::DirectoryResult;
use moncompte_connector::operation::{attr, DirectoryEntry, Modification, NewEntry};
use moncompte_connector::traits::Directory;
use moncompte_connector_ldap::{member_dn, LdapConfig, LdapDirectory};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::member::{Member, MemberId, ProfileData};
use crate::password::generate_password;

/// Tag marking a member with a current subscription.
pub const MEMBERSHIP_TAG: &str = "membre";

/// Tag given to every newly created entry.
pub const ADMISSIBLE_TAG: &str = "admissible";

/// Group id shared by all member entries.
pub const MEMBER_GID_NUMBER: u32 = 10000;

/// Object classes of a member entry.
pub const MEMBER_OBJECT_CLASSES: [&str; 5] = [
    "person",
    "posixAccount",
    "inetOrgPerson",
    "top",
    "organizationalPerson",
];

const CREATE_LOOKUP_ATTRS: &[&str] = &[attr::CN];
const STATUS_LOOKUP_ATTRS: &[&str] = &[attr::CN, attr::DESCRIPTION, attr::MAIL];

/// What an operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The sync is disabled by configuration; nothing was attempted.
    Disabled,
    /// A new entry was written.
    Created,
    /// The entry already existed; nothing was written.
    AlreadyPresent,
    /// The `membre` tag was added.
    MembershipAdded,
    /// The `membre` tag was removed.
    MembershipRemoved,
    /// The `membre` tag already matched the subscription state.
    MembershipUnchanged,
    /// Contact fields were written on an existing entry.
    ProfileUpdated { mail_replaced: bool },
}

impl SyncOutcome {
    /// Whether this outcome involved a directory write.
    #[must_use]
    pub fn wrote(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Created
                | SyncOutcome::MembershipAdded
                | SyncOutcome::MembershipRemoved
                | SyncOutcome::ProfileUpdated { .. }
        )
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncOutcome::Disabled => "disabled",
            SyncOutcome::Created => "created",
            SyncOutcome::AlreadyPresent => "already present",
            SyncOutcome::MembershipAdded => "membership added",
            SyncOutcome::MembershipRemoved => "membership removed",
            SyncOutcome::MembershipUnchanged => "membership unchanged",
            SyncOutcome::ProfileUpdated {
                mail_replaced: true,
            } => "profile updated (mail replaced)",
            SyncOutcome::ProfileUpdated {
                mail_replaced: false,
            } => "profile updated (mail added)",
        };
        f.write_str(label)
    }
}

/// Outcome of [`DirectorySyncAdapter::sync_member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSyncReport {
    pub entry: SyncOutcome,
    pub status: SyncOutcome,
}

/// Observable connection state of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disabled,
    Connected,
    Unavailable,
}

enum AdapterState<D> {
    Disabled,
    Connected(D),
    Unavailable { reason: String },
}

/// Writes member records into a directory.
///
/// Built once per process from the sync configuration and passed by
/// reference to callers. Calls are expected to be issued sequentially.
pub struct DirectorySyncAdapter<D> {
    base_dn: String,
    default_email: String,
    state: AdapterState<D>,
}

impl DirectorySyncAdapter<LdapDirectory> {
    /// Connect to the LDAP server described by `config`.
    ///
    /// Never fails: a disabled configuration yields a disabled adapter and a
    /// failed bind yields an adapter whose operations return
    /// [`SyncError::NotConnected`].
    pub async fn open(config: &SyncConfig) -> Self {
        Self::initialize(config, LdapDirectory::connect).await
    }
}

impl<D: Directory> DirectorySyncAdapter<D> {
    /// Build an adapter, connecting with `connect` unless the sync is disabled.
    pub async fn initialize<F, Fut>(config: &SyncConfig, connect: F) -> Self
    where
        F: FnOnce(LdapConfig) -> Fut,
        Fut: Future<Output = DirectoryResult<D>>,
    {
        if config.disabled {
            info!("LDAP sync is disabled by configuration");
            return Self::disabled(config);
        }

        match connect(config.ldap_config()).await {
            Ok(directory) => Self::connected(config, directory),
            Err(e) => {
                warn!(error = %e, host = %config.host, "LDAP connection failed, sync unavailable");
                Self::unavailable(config, e.to_string())
            }
        }
    }

    /// An adapter whose operations are all no-ops.
    pub fn disabled(config: &SyncConfig) -> Self {
        Self::with_state(config, AdapterState::Disabled)
    }

    /// An adapter writing to `directory`.
    pub fn connected(config: &SyncConfig, directory: D) -> Self {
        Self::with_state(config, AdapterState::Connected(directory))
    }

    /// An adapter whose operations fail with [`SyncError::NotConnected`].
    pub fn unavailable(config: &SyncConfig, reason: impl Into<String>) -> Self {
        Self::with_state(
            config,
            AdapterState::Unavailable {
                reason: reason.into(),
            },
        )
    }

    fn with_state(config: &SyncConfig, state: AdapterState<D>) -> Self {
        Self {
            base_dn: config.base_dn.clone(),
            default_email: config.default_email.clone(),
            state,
        }
    }

    /// Current connection state.
    pub fn connection_status(&self) -> ConnectionStatus {
        match self.state {
            AdapterState::Disabled => ConnectionStatus::Disabled,
            AdapterState::Connected(_) => ConnectionStatus::Connected,
            AdapterState::Unavailable { .. } => ConnectionStatus::Unavailable,
        }
    }

    /// The underlying directory, when connected.
    pub fn directory(&self) -> Option<&D> {
        match &self.state {
            AdapterState::Connected(directory) => Some(directory),
            _ => None,
        }
    }

    /// DN of a member's entry.
    pub fn member_dn(&self, id: MemberId) -> String {
        member_dn(&id.to_string(), &self.base_dn)
    }

    /// `Ok(None)` when disabled, an error when unavailable.
    fn active(&self) -> SyncResult<Option<&D>> {
        match &self.state {
            AdapterState::Connected(directory) => Ok(Some(directory)),
            AdapterState::Disabled => {
                info!("LDAP sync is disabled, doing nothing");
                Ok(None)
            }
            AdapterState::Unavailable { reason } => Err(SyncError::NotConnected {
                reason: reason.clone(),
            }),
        }
    }

    fn effective_email<'a>(&'a self, email: Option<&'a str>) -> &'a str {
        email.unwrap_or(&self.default_email)
    }

    /// Create the member's entry unless one already exists.
    #[instrument(skip(self, member), fields(member_id = %member.id))]
    pub async fn create_member_if_absent(&self, member: &Member) -> SyncResult<SyncOutcome> {
        let Some(directory) = self.active()? else {
            return Ok(SyncOutcome::Disabled);
        };

        let dn = self.member_dn(member.id);
        if directory.lookup(&dn, CREATE_LOOKUP_ATTRS).await?.is_some() {
            debug!(dn = %dn, "Member already exists in LDAP directory");
            return Ok(SyncOutcome::AlreadyPresent);
        }

        info!(dn = %dn, "Adding member to LDAP directory");
        directory.add(self.build_entry(dn, member)).await?;

        Ok(SyncOutcome::Created)
    }

    fn build_entry(&self, dn: String, member: &Member) -> NewEntry {
        let id = member.id.to_string();

        NewEntry::new(dn)
            .with_values(attr::OBJECT_CLASS, MEMBER_OBJECT_CLASSES)
            .with(attr::CN, id.as_str())
            .with(attr::UID, id.as_str())
            .with(attr::DISPLAY_NAME, id.as_str())
            .with(attr::UID_NUMBER, id.as_str())
            .with(attr::GID_NUMBER, MEMBER_GID_NUMBER.to_string())
            .with(attr::HOME_DIRECTORY, format!("/home/users/{id}"))
            .with_values(attr::DESCRIPTION, [ADMISSIBLE_TAG])
            .with(attr::SN, member.last_name.as_str())
            .with(attr::GIVEN_NAME, member.first_name.as_str())
            .with(attr::USER_PASSWORD, generate_password())
            .with(attr::MAIL, self.effective_email(member.contact_email()))
    }

    /// Align the `membre` tag with the subscription expiry (Unix seconds).
    pub async fn reconcile_membership_status(
        &self,
        id: MemberId,
        expires_at: i64,
    ) -> SyncResult<SyncOutcome> {
        self.reconcile_membership_status_at(id, expires_at, Utc::now().timestamp())
            .await
    }

    /// Same as [`reconcile_membership_status`](Self::reconcile_membership_status)
    /// with an explicit current time.
    #[instrument(skip(self), fields(member_id = %id))]
    pub async fn reconcile_membership_status_at(
        &self,
        id: MemberId,
        expires_at: i64,
        now: i64,
    ) -> SyncResult<SyncOutcome> {
        let Some(directory) = self.active()? else {
            return Ok(SyncOutcome::Disabled);
        };

        let entry = self.find_member(directory, id).await?;
        let is_active = now < expires_at;
        let has_tag = entry.has_tag(MEMBERSHIP_TAG);

        let (change, outcome) = match (has_tag, is_active) {
            (true, false) => {
                debug!("Removing membership");
                (
                    Modification::delete(attr::DESCRIPTION, MEMBERSHIP_TAG),
                    SyncOutcome::MembershipRemoved,
                )
            }
            (false, true) => {
                debug!("Adding membership");
                (
                    Modification::add(attr::DESCRIPTION, MEMBERSHIP_TAG),
                    SyncOutcome::MembershipAdded,
                )
            }
            _ => {
                debug!("No status change");
                return Ok(SyncOutcome::MembershipUnchanged);
            }
        };

        directory
            .modify(&entry.dn, vec![change])
            .await
            .map_err(|source| SyncError::StatusUpdate { id, source })?;

        Ok(outcome)
    }

    /// Refresh contact fields, creating the entry when it is missing.
    #[instrument(skip(self, data), fields(member_id = %id))]
    pub async fn upsert_profile(&self, id: MemberId, data: &ProfileData) -> SyncResult<SyncOutcome> {
        let Some(directory) = self.active()? else {
            return Ok(SyncOutcome::Disabled);
        };

        let dn = self.member_dn(id);
        let Some(entry) = directory.lookup(&dn, STATUS_LOOKUP_ATTRS).await? else {
            return self
                .create_member_if_absent(&data.clone().into_member(id))
                .await;
        };

        let email = self.effective_email(data.contact_email());
        let mail_replaced = entry.has_mail();
        let mail_change = if mail_replaced {
            info!(mail = %email, "Replacing LDAP email");
            Modification::replace(attr::MAIL, email)
        } else {
            info!(mail = %email, "Adding LDAP email");
            Modification::add(attr::MAIL, email)
        };
        directory.modify(&entry.dn, vec![mail_change]).await?;

        info!("Replacing LDAP first and last names");
        directory
            .modify(
                &entry.dn,
                vec![
                    Modification::replace(attr::SN, data.last_name.as_str()),
                    Modification::replace(attr::GIVEN_NAME, data.first_name.as_str()),
                ],
            )
            .await?;

        Ok(SyncOutcome::ProfileUpdated { mail_replaced })
    }

    /// Create the member if needed, then reconcile their membership tag.
    pub async fn sync_member(&self, member: &Member, expires_at: i64) -> SyncResult<MemberSyncReport> {
        let entry = self.create_member_if_absent(member).await?;
        let status = self.reconcile_membership_status(member.id, expires_at).await?;
        Ok(MemberSyncReport { entry, status })
    }

    /// Check that the directory answers.
    pub async fn test_connection(&self) -> SyncResult<ConnectionStatus> {
        match self.active()? {
            Some(directory) => {
                directory.test_connection().await?;
                Ok(ConnectionStatus::Connected)
            }
            None => Ok(ConnectionStatus::Disabled),
        }
    }

    /// Release the directory session.
    pub async fn close(self) -> SyncResult<()> {
        if let AdapterState::Connected(directory) = self.state {
            directory.dispose().await?;
        }
        Ok(())
    }

    async fn find_member(&self, directory: &D, id: MemberId) -> SyncResult<DirectoryEntry> {
        directory
            .lookup(&self.member_dn(id), STATUS_LOOKUP_ATTRS)
            .await?
            .ok_or(SyncError::MemberNotFound { id })
    }
}

impl<D> fmt::Debug for DirectorySyncAdapter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            AdapterState::Disabled => "disabled",
            AdapterState::Connected(_) => "connected",
            AdapterState::Unavailable { .. } => "unavailable",
        };
        f.debug_struct("DirectorySyncAdapter")
            .field("base_dn", &self.base_dn)
            .field("default_email", &self.default_email)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moncompte_connector::error::DirectoryError;
    use moncompte_connector::memory::InMemoryDirectory;

    fn config() -> SyncConfig {
        SyncConfig::new(
            "ldap.example.org",
            "cn=admin,dc=example,dc=org",
            "ou=membres,dc=example,dc=org",
            "noreply@example.org",
        )
    }

    fn id(n: u64) -> MemberId {
        MemberId::new(n).unwrap()
    }

    #[test]
    fn test_member_dn() {
        let adapter = DirectorySyncAdapter::connected(&config(), InMemoryDirectory::new());
        assert_eq!(
            adapter.member_dn(id(1234)),
            "cn=1234,ou=membres,dc=example,dc=org"
        );
    }

    #[test]
    fn test_build_entry_uses_default_email() {
        let adapter = DirectorySyncAdapter::connected(&config(), InMemoryDirectory::new());
        let member = Member::new(id(1234), "Dupont", "Jean").with_email("");
        let entry = adapter.build_entry(adapter.member_dn(member.id), &member);

        assert_eq!(entry.get_first("mail"), Some("noreply@example.org"));
        assert_eq!(entry.get_first("uid"), Some("1234"));
        assert_eq!(entry.get_first("cn"), Some("1234"));
        assert_eq!(entry.get_first("displayName"), Some("1234"));
        assert_eq!(entry.get_first("uidNumber"), Some("1234"));
        assert_eq!(entry.get_first("gidNumber"), Some("10000"));
        assert_eq!(entry.get_first("homeDirectory"), Some("/home/users/1234"));
        assert_eq!(entry.get("description"), Some(&["admissible".to_string()][..]));
        assert_eq!(entry.get("objectClass").map(<[String]>::len), Some(5));
        assert!(entry.get_first("userPassword").is_some());
    }

    #[test]
    fn test_build_entry_prefers_member_email() {
        let adapter = DirectorySyncAdapter::connected(&config(), InMemoryDirectory::new());
        let member = Member::new(id(5), "Martin", "Alice").with_email("alice@example.org");
        let entry = adapter.build_entry(adapter.member_dn(member.id), &member);

        assert_eq!(entry.get_first("mail"), Some("alice@example.org"));
    }

    #[test]
    fn test_outcome_wrote() {
        assert!(SyncOutcome::Created.wrote());
        assert!(SyncOutcome::ProfileUpdated {
            mail_replaced: false
        }
        .wrote());
        assert!(!SyncOutcome::Disabled.wrote());
        assert!(!SyncOutcome::MembershipUnchanged.wrote());
        assert_eq!(SyncOutcome::AlreadyPresent.to_string(), "already present");
    }

    #[tokio::test]
    async fn test_initialize_records_failed_bind() {
        let adapter = DirectorySyncAdapter::initialize(&config(), |_| {
            std::future::ready(Err::<InMemoryDirectory, _>(
                DirectoryError::AuthenticationFailed,
            ))
        })
        .await;

        assert_eq!(adapter.connection_status(), ConnectionStatus::Unavailable);
        let err = adapter
            .create_member_if_absent(&Member::new(id(1), "A", "B"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotConnected { .. }));
    }

    #[tokio::test]
    async fn test_initialize_disabled_never_connects() {
        let mut called = false;
        let adapter = DirectorySyncAdapter::initialize(&SyncConfig::disabled(), |_| {
            called = true;
            std::future::ready(Ok::<_, DirectoryError>(InMemoryDirectory::new()))
        })
        .await;

        assert!(!called);
        assert_eq!(adapter.connection_status(), ConnectionStatus::Disabled);
    }
}

//! LDAP Connector configuration
//!
//! Connection settings for the directory that receives member entries.

use serde::{Deserialize, Serialize};

use moncompte_connector::error::{DirectoryError, DirectoryResult};

/// Configuration for the LDAP connector.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// LDAP server hostname or IP address.
    pub host: String,

    /// LDAP server port.
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Use STARTTLS upgrade on the plain LDAP connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Base DN under which member entries live (e.g., "ou=membres,dc=example,dc=org").
    pub base_dn: String,

    /// Bind DN for authentication (e.g., "cn=admin,dc=example,dc=org").
    pub bind_dn: String,

    /// Bind password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_starttls", &self.use_starttls)
            .field("base_dn", &self.base_dn)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

fn default_ldap_port() -> u16 {
    389
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl LdapConfig {
    /// Create a new LDAP config with required fields.
    pub fn new(
        host: impl Into<String>,
        base_dn: impl Into<String>,
        bind_dn: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_ldap_port(),
            use_starttls: false,
            base_dn: base_dn.into(),
            bind_dn: bind_dn.into(),
            bind_password: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Set bind password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = Some(password.into());
        self
    }

    /// Set port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable STARTTLS.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.use_starttls = true;
        self
    }

    /// Get the LDAP URL.
    ///
    /// A host given as a full `ldap://` or `ldaps://` URL is used unchanged.
    #[must_use]
    pub fn url(&self) -> String {
        if self.host.starts_with("ldap://") || self.host.starts_with("ldaps://") {
            return self.host.clone();
        }
        format!("ldap://{}:{}", self.host, self.port)
    }

    /// Validate required fields.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.host.is_empty() {
            return Err(DirectoryError::InvalidData {
                message: "host is required".to_string(),
            });
        }

        if self.base_dn.is_empty() {
            return Err(DirectoryError::InvalidData {
                message: "base_dn is required".to_string(),
            });
        }

        if self.bind_dn.is_empty() {
            return Err(DirectoryError::InvalidData {
                message: "bind_dn is required".to_string(),
            });
        }

        if self.port == 0 {
            return Err(DirectoryError::InvalidData {
                message: "port must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Copy of this config with the password masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.bind_password.is_some() {
            config.bind_password = Some("***REDACTED***".to_string());
        }
        config
    }
}

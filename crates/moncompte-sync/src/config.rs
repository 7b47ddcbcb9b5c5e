//! Sync configuration loaded from `local_ldap.json`.
//!
//! Keys keep the names used by the existing deployment files
//! (`userdn`, `basedn`, `defaultEmail`, ...).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use moncompte_connector_ldap::LdapConfig;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/local_ldap.json";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of the sync configuration file.
#[derive(Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Only a literal `true` disables the sync.
    #[serde(default, deserialize_with = "literal_true")]
    pub disabled: bool,

    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(rename = "userdn", default)]
    pub bind_dn: String,

    #[serde(rename = "password", default, skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    #[serde(rename = "basedn", default)]
    pub base_dn: String,

    /// Mail used when a member has no email of their own.
    #[serde(rename = "defaultEmail", default)]
    pub default_email: String,

    #[serde(default)]
    pub use_starttls: bool,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("disabled", &self.disabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("base_dn", &self.base_dn)
            .field("default_email", &self.default_email)
            .field("use_starttls", &self.use_starttls)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

fn default_port() -> u16 {
    389
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn literal_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value == serde_json::Value::Bool(true))
}

impl SyncConfig {
    /// A configuration that turns every operation into a no-op.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            host: String::new(),
            port: default_port(),
            bind_dn: String::new(),
            bind_password: None,
            base_dn: String::new(),
            default_email: String::new(),
            use_starttls: false,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// An enabled configuration with the required fields.
    pub fn new(
        host: impl Into<String>,
        bind_dn: impl Into<String>,
        base_dn: impl Into<String>,
        default_email: impl Into<String>,
    ) -> Self {
        Self {
            disabled: false,
            host: host.into(),
            bind_dn: bind_dn.into(),
            base_dn: base_dn.into(),
            default_email: default_email.into(),
            ..Self::disabled()
        }
    }

    /// Set bind password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = Some(password.into());
        self
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a configuration document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields. A disabled configuration is always valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.disabled {
            return Ok(());
        }

        let required = [
            ("host", &self.host),
            ("userdn", &self.bind_dn),
            ("basedn", &self.base_dn),
            ("defaultEmail", &self.default_email),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("'{key}' is required")));
            }
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid("'port' must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Connection settings for the LDAP connector.
    #[must_use]
    pub fn ldap_config(&self) -> LdapConfig {
        let mut config = LdapConfig::new(&self.host, &self.base_dn, &self.bind_dn)
            .with_port(self.port);
        config.bind_password = self.bind_password.clone();
        config.use_starttls = self.use_starttls;
        config.connect_timeout_secs = self.connect_timeout_secs;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "disabled": false,
        "host": "ldap.example.org",
        "port": 389,
        "userdn": "cn=admin,dc=example,dc=org",
        "password": "secret",
        "basedn": "ou=membres,dc=example,dc=org",
        "defaultEmail": "noreply@example.org"
    }"#;

    #[test]
    fn test_parse_legacy_keys() {
        let config = SyncConfig::from_json(SAMPLE).unwrap();

        assert!(!config.disabled);
        assert_eq!(config.bind_dn, "cn=admin,dc=example,dc=org");
        assert_eq!(config.base_dn, "ou=membres,dc=example,dc=org");
        assert_eq!(config.default_email, "noreply@example.org");
        assert_eq!(config.bind_password.as_deref(), Some("secret"));
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_only_literal_true_disables() {
        let config = SyncConfig::from_json(r#"{"disabled": true}"#).unwrap();
        assert!(config.disabled);

        // "true" as a string does not disable, so the missing fields fail validation.
        let err = SyncConfig::from_json(r#"{"disabled": "true"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SyncConfig::from_json(r#"{"disabled": 1}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_default_email_is_rejected() {
        let raw = SAMPLE.replace("noreply@example.org", "");
        let err = SyncConfig::from_json(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: 'defaultEmail' is required"
        );
    }

    #[test]
    fn test_malformed_json() {
        let err = SyncConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = SyncConfig::load(file.path()).unwrap();
        assert_eq!(config.host, "ldap.example.org");

        let err = SyncConfig::load("/nonexistent/local_ldap.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_ldap_config_conversion() {
        let config = SyncConfig::from_json(SAMPLE).unwrap();
        let ldap = config.ldap_config();

        assert_eq!(ldap.url(), "ldap://ldap.example.org:389");
        assert_eq!(ldap.bind_dn, config.bind_dn);
        assert_eq!(ldap.base_dn, config.base_dn);
        assert_eq!(ldap.bind_password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = SyncConfig::from_json(SAMPLE).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}

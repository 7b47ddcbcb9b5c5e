//! CLI error types and exit codes

use thiserror::Error;

use moncompte_sync::{ConfigError, SyncError};

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Configuration error
/// - 3: Directory or connection error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{failed} of {total} members failed to sync")]
    BatchFailed { failed: usize, total: usize },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Sync(SyncError::MemberNotFound { .. }) => 1,
            CliError::Sync(_) => 3,
            CliError::Validation(_)
            | CliError::Io(_)
            | CliError::BatchFailed { .. }
            | CliError::Logging(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Config(ConfigError::Io { .. }) => {
                Some("Pass --config or set MONCOMPTE_LDAP_CONFIG to the local_ldap.json path.")
            }
            CliError::Sync(SyncError::NotConnected { .. }) => {
                Some("Run 'moncompte-sync check' to diagnose the LDAP connection.")
            }
            CliError::BatchFailed { .. } => Some("See the log output for each failed member."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moncompte_connector::DirectoryError;
    use moncompte_sync::MemberId;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config(ConfigError::Invalid("'host' is required".to_string()));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_not_connected() {
        let err = CliError::Sync(SyncError::NotConnected {
            reason: "authentication failed".to_string(),
        });
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_directory_error() {
        let err = CliError::Sync(SyncError::Directory(DirectoryError::operation_failed(
            50,
            "Insufficient access",
        )));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "Insufficient access (result code 50)");
    }

    #[test]
    fn test_exit_code_member_not_found() {
        let err = CliError::Sync(SyncError::MemberNotFound {
            id: MemberId::new(7).unwrap(),
        });
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_batch_failed() {
        let err = CliError::BatchFailed {
            failed: 2,
            total: 10,
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "2 of 10 members failed to sync");
    }
}

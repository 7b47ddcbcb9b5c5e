//! Directory error types
//!
//! Error definitions with transient/permanent classification.

use thiserror::Error;

/// Error that can occur while talking to the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Connection errors (usually transient)
    /// Failed to establish a connection to the directory server.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The bind was rejected (LDAP result code 49).
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// No live directory handle is available.
    #[error("not connected to the directory: {reason}")]
    NotConnected { reason: String },

    // Entry errors (permanent)
    /// The targeted entry does not exist.
    #[error("object not found: {dn}")]
    ObjectNotFound { dn: String },

    /// An entry already exists at the targeted DN.
    #[error("object already exists: {dn}")]
    ObjectAlreadyExists { dn: String },

    /// The directory answered with a non-success result code.
    #[error("{message} (result code {code})")]
    OperationFailed { code: u32, message: String },

    /// Request data could not be turned into a valid directory request.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// Transport-level failure while an operation was in flight.
    #[error("protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DirectoryError {
    /// Check if this error is transient and the operation could succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DirectoryError::ConnectionFailed { .. }
                | DirectoryError::NotConnected { .. }
                | DirectoryError::Protocol { .. }
        )
    }

    /// Check if this error is permanent and retrying won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirectoryError::AuthenticationFailed => "AUTH_FAILED",
            DirectoryError::NotConnected { .. } => "NOT_CONNECTED",
            DirectoryError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            DirectoryError::ObjectAlreadyExists { .. } => "OBJECT_EXISTS",
            DirectoryError::OperationFailed { .. } => "OPERATION_FAILED",
            DirectoryError::InvalidData { .. } => "INVALID_DATA",
            DirectoryError::Protocol { .. } => "PROTOCOL_ERROR",
        }
    }

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an error from a non-success result code.
    pub fn operation_failed(code: u32, message: impl Into<String>) -> Self {
        DirectoryError::OperationFailed {
            code,
            message: message.into(),
        }
    }

    /// Create a protocol error with source.
    pub fn protocol_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Protocol {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient_errors = vec![
            DirectoryError::connection_failed("test"),
            DirectoryError::NotConnected {
                reason: "bind failed".to_string(),
            },
            DirectoryError::protocol_with_source(
                "search",
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reset"),
            ),
        ];

        for err in transient_errors {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent_errors = vec![
            DirectoryError::AuthenticationFailed,
            DirectoryError::ObjectNotFound {
                dn: "cn=1,dc=example,dc=org".to_string(),
            },
            DirectoryError::ObjectAlreadyExists {
                dn: "cn=1,dc=example,dc=org".to_string(),
            },
            DirectoryError::operation_failed(50, "Insufficient access"),
        ];

        for err in permanent_errors {
            assert!(
                err.is_permanent(),
                "Expected {} to be permanent",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::operation_failed(50, "Insufficient access");
        assert_eq!(err.to_string(), "Insufficient access (result code 50)");

        let err = DirectoryError::ObjectNotFound {
            dn: "cn=42,ou=membres,dc=example,dc=org".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "object not found: cn=42,ou=membres,dc=example,dc=org"
        );
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "underlying error");
        let err = DirectoryError::connection_failed_with_source("failed", source_err);

        if let DirectoryError::ConnectionFailed { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected ConnectionFailed variant");
        }
    }
}

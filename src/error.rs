//! Custom error types for Orbit
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::Path;

use thiserror::Error;

/// The main error type for Orbit operations
#[derive(Error, Debug)]
pub enum OrbitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration invariant violated; the previous state is kept
    #[error("Validation error: {0}")]
    Validation(String),

    /// Container could not be parsed (header, length field, entries)
    #[error("Format error: {0}")]
    Format(String),

    /// Key handling, OAEP or GCM failures. No plaintext accompanies these.
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Archive entry that belongs to no declared group
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A destructive step was declined
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

impl OrbitError {
    /// Create a "not found" error for a backup source directory
    pub fn source_root_not_found(path: &Path) -> Self {
        Self::NotFound {
            entity_type: "Source directory",
            identifier: path.display().to_string(),
        }
    }

    /// Create a "not found" error for a backup container file
    pub fn backup_not_found(path: &Path) -> Self {
        Self::NotFound {
            entity_type: "Backup file",
            identifier: path.display().to_string(),
        }
    }

    /// Create the error returned when an encrypted container is opened
    /// without a private key
    pub fn key_required(container: &Path) -> Self {
        Self::NotFound {
            entity_type: "Private key",
            identifier: format!(
                "{} is encrypted; pass the private key path to decrypt it",
                container.display()
            ),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a cryptographic failure
    pub fn is_crypto(&self) -> bool {
        matches!(self, Self::Crypto(_))
    }

    /// Check if this is a container format error
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

impl From<std::io::Error> for OrbitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OrbitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Orbit operations
pub type OrbitResult<T> = Result<T, OrbitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display() {
        let err = OrbitError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = OrbitError::source_root_not_found(&PathBuf::from("/nope/Code"));
        assert_eq!(err.to_string(), "Source directory not found: /nope/Code");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_key_required_is_not_found() {
        let err = OrbitError::key_required(&PathBuf::from("backup.orbit"));
        assert!(err.is_not_found());
        assert!(err.to_string().contains("backup.orbit is encrypted"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let orbit_err: OrbitError = io_err.into();
        assert!(matches!(orbit_err, OrbitError::Io(_)));
    }

    #[test]
    fn test_classifiers() {
        assert!(OrbitError::Crypto("x".into()).is_crypto());
        assert!(OrbitError::Format("x".into()).is_format());
        assert!(OrbitError::Validation("x".into()).is_validation());
        assert!(!OrbitError::Format("x".into()).is_crypto());
    }
}

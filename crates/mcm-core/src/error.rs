use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to resolve address '{name}': {reason}")]
    ResolutionFailed { name: String, reason: String },

    #[error("Failed to read module memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Invalid signature pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid runtime version: {0}")]
    InvalidVersion(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    #[error("Keybind definitions for '{owner}' unavailable ({})", path.display())]
    DefinitionMissing { owner: String, path: PathBuf },

    #[error("Invalid keybind definition '{id}' for '{owner}': {reason}")]
    DefinitionInvalid {
        owner: String,
        id: String,
        reason: String,
    },

    #[error("Dispatch target missing: {0}")]
    DispatchTargetMissing(String),

    #[error("Invalid form identifier: {0}")]
    InvalidFormIdentifier(String),

    #[error("Keybind serialization error: {0}")]
    Serialization(String),

    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    pub fn resolution_failed(name: &str, reason: impl Into<String>) -> Self {
        Error::ResolutionFailed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn definition_invalid(owner: &str, id: &str, reason: impl Into<String>) -> Self {
        Error::DefinitionInvalid {
            owner: owner.to_string(),
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err2 = Error::Io(other_io_err);
        assert!(!err2.is_not_found());
    }

    #[test]
    fn test_resolution_failed_message() {
        let err = Error::resolution_failed("ui", "signature not found");
        assert_eq!(
            err.to_string(),
            "Failed to resolve address 'ui': signature not found"
        );
    }
}

use crate::domain::phase::Phase;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetroError>;

/// Coarse classification a transport layer maps onto status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Forbidden,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub enum RetroError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: Phase, to: Phase },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RetroError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden(detail.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict(detail.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::BadRequest(_) | Self::InvalidPhaseTransition { .. } => ErrorKind::BadRequest,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::StorageError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::ConfigError(_) => ErrorKind::Internal,
        }
    }
}

impl From<toml::de::Error> for RetroError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transition_is_bad_request() {
        let err = RetroError::InvalidPhaseTransition {
            from: Phase::Voting,
            to: Phase::Writing,
        };
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(
            err.to_string(),
            "Invalid phase transition from VOTING to WRITING"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(RetroError::not_found("Card", "x").kind(), ErrorKind::NotFound);
        assert_eq!(RetroError::forbidden("nope").kind(), ErrorKind::Forbidden);
        assert_eq!(RetroError::conflict("dup").kind(), ErrorKind::Conflict);
        assert_eq!(
            RetroError::StorageError("disk".to_string()).kind(),
            ErrorKind::Internal
        );
    }
}

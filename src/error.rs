//! Error types for the entry editor

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("A new entry cannot already have an ID")]
    IdExists,

    #[error("Invalid id")]
    IdNull,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("No entry identifiers left")]
    IdSpaceExhausted,

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("The editor has not been initialized")]
    NotInitialized,

    #[error("The edit session is closed")]
    SessionClosed,

    /// Failure reported by a collaborator implemented outside this crate
    /// (a remote loader or repository); the message is shown as-is.
    #[error("{0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl EditorError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        EditorError::NotFound { kind, id }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_resource_wording() {
        assert_eq!(
            EditorError::IdExists.to_string(),
            "A new entry cannot already have an ID"
        );
        assert_eq!(EditorError::IdNull.to_string(), "Invalid id");
        assert_eq!(
            EditorError::not_found("Blog", 7).to_string(),
            "Blog not found: 7"
        );
    }

    #[test]
    fn test_backend_message_is_passed_through() {
        let err = EditorError::Backend("conflict".to_string());
        assert_eq!(err.to_string(), "conflict");
    }
}

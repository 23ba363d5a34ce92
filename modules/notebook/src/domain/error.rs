use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    #[error("Note not found: {id}")]
    NoteNotFound { id: i64 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    /// Backend failure; the message is the underlying error text.
    #[error("{message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn user_not_found(id: i64) -> Self {
        Self::UserNotFound { id }
    }

    pub fn note_not_found(id: i64) -> Self {
        Self::NoteNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Username validation error
    #[error("username is missing")]
    UsernameEmpty,

    /// Username too long error
    #[error("username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// Username contains whitespace
    #[error("username cannot contain whitespace")]
    UsernameWhitespace,

    /// DisplayName validation error
    #[error("display name cannot be empty")]
    DisplayNameEmpty,

    /// DisplayName too long error
    #[error("display name cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    /// Password validation error
    #[error("password is missing")]
    PasswordEmpty,

    /// MessageContent validation error
    #[error("message content cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("message content cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },

    /// SessionToken validation error
    #[error("session token cannot be empty")]
    SessionTokenEmpty,
}

/// Errors returned by repository implementations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Unique constraint on username violated
    #[error("username is taken")]
    UsernameTaken,

    /// Referenced record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Underlying store failed
    #[error("storage failure: {0}")]
    Storage(String),
}

use thiserror::Error;

/// Result type alias used throughout the container API.
pub type Result<T> = std::result::Result<T, ContainerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("Identifier \"{id}\" is not defined.")]
    IdentifierNotFound { id: String },

    #[error("Expected a valid callable")]
    InvalidCallable,

    #[error("Identifier \"{id}\" does not contain an object definition.")]
    NotAFactory { id: String },

    #[error("Identifier \"{id}\" does not resolve to a value of type {expected}")]
    TypeMismatch { id: String, expected: &'static str },

    #[error("Service construction failed: {0}")]
    Construction(String),
}

impl ContainerError {
    /// Wraps a failure raised inside a user factory.
    pub fn construction(err: impl std::fmt::Display) -> Self {
        ContainerError::Construction(err.to_string())
    }

    pub(crate) fn not_found(id: &str) -> Self {
        ContainerError::IdentifierNotFound { id: id.to_string() }
    }
}

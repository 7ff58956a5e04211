//! Error types for sqlkit

use thiserror::Error;

/// Result type alias for sqlkit operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for schema, condition, and rendering operations
#[derive(Debug, Error)]
pub enum SqlError {
    /// Bad definition: name collisions, missing required values, malformed schema
    #[error("Structural error: {0}")]
    Structural(String),

    /// Operator argument count outside its declared bounds
    #[error("Arity error: operator {op} given {given} arguments, allowed {min}..={max}")]
    Arity {
        op: &'static str,
        given: usize,
        min: usize,
        max: usize,
    },

    /// Value type does not match the declared field type or operator
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Operation attempted in the wrong order (e.g. rendering an unvalidated query)
    #[error("State error: {0}")]
    State(String),

    /// Unresolvable table or field key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Explicit placeholder for an unfinished dialect feature
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl SqlError {
    /// Create a structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a structural error
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    /// Check if this is an arity error
    pub fn is_arity(&self) -> bool {
        matches!(self, Self::Arity { .. })
    }

    /// Check if this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch(_))
    }

    /// Check if this is a state error
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

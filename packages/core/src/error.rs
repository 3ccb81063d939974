//! Error type for the state container.
//!
//! Almost nothing here can fail: absent paths read as `None`,
//! unregistered options resolve to defaults, and malformed JSON input is
//! kept as text. The one fallible surface is a custom coercion function
//! rejecting a write, which propagates out of `set`.

/// Errors surfaced by state operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A custom coercion function rejected the value being written.
    #[error("custom coercion failed: {message}")]
    Coercion { message: String },
}

impl Error {
    /// Build a coercion error, for use inside custom coercion functions.
    pub fn coercion(message: impl Into<String>) -> Self {
        Error::Coercion {
            message: message.into(),
        }
    }
}

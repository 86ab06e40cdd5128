//! Error taxonomy for the profile store.
//!
//! The library surfaces a structured enum so front-ends can tell a dead
//! session from a failed statement; binaries wrap it in `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad host, credentials or a lost link. Fatal to the session.
    #[error("Error connecting to the database: {0}")]
    Connection(String),

    /// A statement failed (malformed SQL, constraint violation, decode
    /// problem). The session stays connected.
    #[error("Error {action}: {message}")]
    Query {
        action: &'static str,
        message: String,
    },

    /// A required field was left blank.
    #[error("{0}")]
    Validation(String),

    #[error("Not connected to a database.")]
    NotConnected,
}

impl StoreError {
    pub(crate) fn query(action: &'static str, message: impl Into<String>) -> Self {
        StoreError::Query {
            action,
            message: message.into(),
        }
    }

    /// Whether the session has to be torn down after this error.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, StoreError::Connection(_) | StoreError::NotConnected)
    }
}

//! Session contract shared by the remote and mock backends

use crate::rows::Rows;
use std::fmt;

/// Lifecycle state of a session.
///
/// Transitions are one-way per connection: `Disconnected -> Connected ->
/// Closed`. A closed session may connect again, which opens a new backend
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built but never connected
    Disconnected,

    /// Holding a live backend connection
    Connected,

    /// Connection released
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Errors a session can fail with
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// Could not establish or authenticate a connection
    #[error("connection error: {0}")]
    Connection(String),

    /// Operation invoked in the wrong lifecycle state
    #[error("{operation} requires a connected session (session is {state})")]
    IllegalState {
        operation: &'static str,
        state: SessionState,
    },

    /// Backend rejected or failed a statement
    #[error("statement failed: {message}")]
    Statement {
        /// Backend error code (SQLSTATE), when the backend reported one
        code: Option<String>,
        message: String,
    },
}

/// A single exclusive-owner handle to one backend connection.
///
/// Methods take `&mut self`: a session is never shared between callers, and
/// concurrent schema introspection means one session (one connection) per
/// caller. There is no retry or timeout logic here; a connection attempt
/// succeeds or fails once, and resilience is layered by the harness.
///
/// SQL text is opaque to the session. No parsing or escaping happens on
/// this side of the boundary; the query generator is responsible for safe
/// statement construction.
#[async_trait::async_trait]
pub trait Session: Send {
    /// Backend tag (e.g. "remote", "mock")
    fn backend_name(&self) -> &'static str;

    /// Current lifecycle state
    fn state(&self) -> SessionState;

    /// Establish the backend connection.
    ///
    /// Fails with [`SessionError::Connection`] if the backend is
    /// unreachable, authentication fails, or the address is malformed.
    /// Calling `connect` on an already-connected session follows the
    /// configured [`ReconnectPolicy`](sqlprobe_core::ReconnectPolicy):
    /// an error by default, or silent reuse of the live connection.
    async fn connect(&mut self) -> Result<(), SessionError>;

    /// Execute a statement with no result expected (DDL/DML).
    ///
    /// Mutates remote server state; not idempotent unless the statement
    /// text itself is (e.g. `DROP ... IF EXISTS`).
    async fn execute_statement(&mut self, sql: &str) -> Result<(), SessionError>;

    /// Execute a query and return its rows.
    ///
    /// The underlying result cursor is fully drained before this returns,
    /// so the session is always safe to reuse afterwards regardless of how
    /// much of the returned [`Rows`] the caller consumes.
    async fn execute_query(&mut self, sql: &str) -> Result<Rows, SessionError>;

    /// Release the backend connection.
    ///
    /// Idempotent and infallible: closing an already-closed or
    /// never-connected session is a no-op. Callable from error-handling
    /// paths; the connection is released on every exit path.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Disconnected.to_string(), "disconnected");
        assert_eq!(SessionState::Connected.to_string(), "connected");
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_illegal_state_message_names_operation() {
        let err = SessionError::IllegalState {
            operation: "execute_query",
            state: SessionState::Disconnected,
        };
        assert_eq!(
            err.to_string(),
            "execute_query requires a connected session (session is disconnected)"
        );
    }

    #[test]
    fn test_statement_error_carries_backend_code() {
        let err = SessionError::Statement {
            code: Some("42P01".to_string()),
            message: "relation does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "statement failed: relation does not exist");
        match err {
            SessionError::Statement { code, .. } => assert_eq!(code.as_deref(), Some("42P01")),
            _ => panic!("expected Statement"),
        }
    }
}

//! Backend sessions for the sqlprobe harness
//!
//! A [`Session`] owns exactly one backend connection and its lifecycle
//! (`Disconnected -> Connected -> Closed`) and exposes the narrow
//! statement-execution surface the harness needs: opaque DDL/DML statements
//! and queries returning positional string rows.
//!
//! Two implementations share the contract and no code:
//! - [`RemoteSession`] - network-backed, behind the `backend-postgres`
//!   feature (enabled by default)
//! - [`MockSession`] - deterministic in-memory stand-in, always available
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlprobe_session::{MockSession, Session};
//!
//! let mut session = MockSession::new();
//! session.connect().await?;
//! let rows = session.execute_query("SHOW TABLES").await?;
//! session.close().await;
//! ```

pub mod mock;
#[cfg(feature = "backend-postgres")]
pub mod remote;
pub mod rows;
pub mod session;

pub use mock::{MockSession, MockTable};
#[cfg(feature = "backend-postgres")]
pub use remote::RemoteSession;
pub use rows::{Row, Rows};
pub use session::{Session, SessionError, SessionState};

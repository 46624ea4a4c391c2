//! Catalog introspection over a session
//!
//! [`CatalogReader`] turns the backend's metadata queries (`SHOW TABLES`,
//! `DESCRIBE <table>`) into the typed schema model the harness
//! type-checks generated queries against, and provisions the disposable
//! scratch database a test run works in.
//!
//! It is parameterized over any [`Session`](sqlprobe_session::Session), so
//! the same code runs against the remote backend and the mock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlprobe_catalog::CatalogReader;
//! use sqlprobe_session::{MockSession, Session};
//!
//! let mut session = MockSession::new();
//! session.connect().await?;
//! let mut catalog = CatalogReader::new(&mut session);
//! let tables = catalog.list_tables().await?;
//! let columns = catalog.describe_columns(&tables[0]).await?;
//! ```

pub mod reader;

pub use reader::{CatalogError, CatalogReader};

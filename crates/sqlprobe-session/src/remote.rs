//! Network-backed session over the PostgreSQL wire protocol
//!
//! This is the real [`Session`] implementation: one tokio-postgres client
//! per session, a spawned task driving the connection, optional TLS via
//! native-tls. It uses the simple-query protocol exclusively, so every
//! result column arrives as text and maps directly onto the positional
//! string [`Rows`] contract.
//!
//! ## Caveats
//!
//! - A second `connect()` on a live session is backend-defined territory;
//!   here it follows [`ReconnectPolicy`] explicitly (error by default).
//! - No retry, timeout, or pooling. One connection attempt succeeds or
//!   fails; a harness needing resilience wraps the session.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let params = ConnectionParameters::new("localhost", 21050, "default")
//!     .with_credentials("probe", "secret");
//! let mut session = RemoteSession::new(params);
//! session.connect().await?;
//! session.execute_statement("CREATE TABLE t (id INT)").await?;
//! session.close().await;
//! ```

use crate::rows::{Row, Rows};
use crate::session::{Session, SessionError, SessionState};
use sqlprobe_core::{ConnectionParameters, ReconnectPolicy};

use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::{debug, info, warn};

/// Transport security for the backend connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsMode {
    Disabled,
    Required,
}

/// Network-backed session holding one backend connection.
pub struct RemoteSession {
    params: ConnectionParameters,
    tls: TlsMode,
    state: SessionState,
    client: Option<Client>,
    /// Task driving the connection; aborted on close so the socket is
    /// released even when the client is dropped mid-statement.
    driver: Option<JoinHandle<()>>,
}

impl RemoteSession {
    /// Create a session over a plaintext connection
    pub fn new(params: ConnectionParameters) -> Self {
        Self {
            params,
            tls: TlsMode::Disabled,
            state: SessionState::Disconnected,
            client: None,
            driver: None,
        }
    }

    /// Create a session that connects with TLS
    pub fn with_tls(params: ConnectionParameters) -> Self {
        let mut session = Self::new(params);
        session.tls = TlsMode::Required;
        session
    }

    /// The parameters this session was built from
    pub fn params(&self) -> &ConnectionParameters {
        &self.params
    }

    fn config_string(&self) -> String {
        let mut config = format!(
            "host={} port={} dbname={}",
            self.params.host, self.params.port, self.params.database
        );
        if let Some(user) = &self.params.username {
            config.push_str(&format!(" user={user}"));
        }
        if let Some(password) = &self.params.password {
            config.push_str(&format!(" password={password}"));
        }
        config
    }

    async fn open_connection(&self) -> Result<(Client, JoinHandle<()>), SessionError> {
        let config = self.config_string();
        let address = self.params.address();

        match self.tls {
            TlsMode::Disabled => {
                let (client, connection) =
                    tokio_postgres::connect(&config, NoTls)
                        .await
                        .map_err(|e| {
                            SessionError::Connection(format!(
                                "failed to connect to {address}: {e}"
                            ))
                        })?;
                let driver = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!(address = %address, error = %e, "connection driver terminated");
                    }
                });
                Ok((client, driver))
            }
            TlsMode::Required => {
                let connector = TlsConnector::builder().build().map_err(|e| {
                    SessionError::Connection(format!("failed to build TLS connector: {e}"))
                })?;
                let tls = MakeTlsConnector::new(connector);
                let (client, connection) =
                    tokio_postgres::connect(&config, tls).await.map_err(|e| {
                        SessionError::Connection(format!(
                            "failed to connect to {address} with TLS: {e}"
                        ))
                    })?;
                let driver = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!(address = %address, error = %e, "connection driver terminated");
                    }
                });
                Ok((client, driver))
            }
        }
    }

    fn connected_client(&self, operation: &'static str) -> Result<&Client, SessionError> {
        match (&self.state, self.client.as_ref()) {
            (SessionState::Connected, Some(client)) => Ok(client),
            _ => Err(SessionError::IllegalState {
                operation,
                state: self.state,
            }),
        }
    }
}

/// Map a backend execution failure onto the statement error contract,
/// keeping the SQLSTATE when the backend reported one.
fn statement_error(e: tokio_postgres::Error) -> SessionError {
    let code = e.code().map(|state| state.code().to_string());
    let message = match e.as_db_error() {
        Some(db) => db.message().to_string(),
        None => e.to_string(),
    };
    SessionError::Statement { code, message }
}

#[async_trait::async_trait]
impl Session for RemoteSession {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn connect(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Connected {
            return match self.params.reconnect {
                ReconnectPolicy::Reuse => {
                    debug!(address = %self.params.address(), "reusing live connection");
                    Ok(())
                }
                ReconnectPolicy::Error => Err(SessionError::Connection(format!(
                    "already connected to {}",
                    self.params.address()
                ))),
            };
        }

        let (client, driver) = self.open_connection().await?;
        self.client = Some(client);
        self.driver = Some(driver);
        self.state = SessionState::Connected;
        info!(address = %self.params.address(), "connected");
        Ok(())
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<(), SessionError> {
        let client = self.connected_client("execute_statement")?;
        debug!(sql, "executing statement");
        client.batch_execute(sql).await.map_err(statement_error)
    }

    async fn execute_query(&mut self, sql: &str) -> Result<Rows, SessionError> {
        let client = self.connected_client("execute_query")?;
        debug!(sql, "executing query");

        // Simple protocol: the whole result arrives as text and is drained
        // here, so no cursor outlives this call.
        let messages = client.simple_query(sql).await.map_err(statement_error)?;

        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                let values = (0..row.len())
                    .map(|i| row.get(i).map(str::to_string))
                    .collect();
                rows.push(Row::new(values));
            }
        }
        Ok(Rows::new(rows))
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            info!(address = %self.params.address(), "closing connection");
        }
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        self.state = SessionState::Closed;
    }
}

impl Drop for RemoteSession {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_string_without_credentials() {
        let session = RemoteSession::new(ConnectionParameters::new("localhost", 21050, "default"));
        assert_eq!(
            session.config_string(),
            "host=localhost port=21050 dbname=default"
        );
    }

    #[test]
    fn test_config_string_with_credentials() {
        let params = ConnectionParameters::new("analytics.internal", 21050, "default")
            .with_credentials("probe", "secret");
        let session = RemoteSession::new(params);
        assert_eq!(
            session.config_string(),
            "host=analytics.internal port=21050 dbname=default user=probe password=secret"
        );
    }

    #[test]
    fn test_new_session_is_disconnected() {
        let session = RemoteSession::new(ConnectionParameters::new("localhost", 21050, "default"));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.backend_name(), "remote");
    }

    #[tokio::test]
    async fn test_operations_before_connect_are_illegal() {
        let mut session =
            RemoteSession::new(ConnectionParameters::new("localhost", 21050, "default"));

        let err = session.execute_statement("CREATE DATABASE x").await.unwrap_err();
        assert!(matches!(err, SessionError::IllegalState { .. }));

        let err = session.execute_query("SHOW TABLES").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::IllegalState {
                operation: "execute_query",
                state: SessionState::Disconnected,
            }
        ));
    }

    #[tokio::test]
    async fn test_close_without_connect_is_a_noop() {
        let mut session =
            RemoteSession::new(ConnectionParameters::new("localhost", 21050, "default"));
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }
}

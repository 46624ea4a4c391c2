//! Deterministic in-memory session for harness development and tests
//!
//! No network I/O: `connect`/`close` toggle internal state only, and the
//! data-returning methods answer from a scripted table set. The lifecycle
//! discipline mirrors the remote session exactly, so catalog code runs
//! identically against either implementation.
//!
//! The mock understands the two query shapes the harness issues (`SHOW
//! TABLES`, `DESCRIBE <table>`). Everything else sent to
//! `execute_statement` is accepted as an opaque statement and recorded,
//! which lets tests assert on exactly what SQL reached the backend.
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Default script: one `test_table` with (id INT, name STRING, value DOUBLE)
//! let mut session = MockSession::new();
//! session.connect().await?;
//! let tables = session.execute_query("SHOW TABLES").await?;
//! ```
//!
//! ## Simulating failures
//!
//! ```rust,ignore
//! let mut session = MockSession::empty()
//!     .with_connect_failure()
//!     .with_statement_failure("CREATE DATABASE scratch", None, "out of disk");
//! ```

use crate::rows::{Row, Rows};
use crate::session::{Session, SessionError, SessionState};
use sqlprobe_core::{Column, ReconnectPolicy};
use std::collections::HashMap;

/// A scripted table the mock reports from its catalog queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTable {
    /// Table name reported by `SHOW TABLES`
    pub name: String,

    /// Columns reported by `DESCRIBE`, in declaration order
    pub columns: Vec<Column>,
}

impl MockTable {
    /// Create a scripted table
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// Deterministic [`Session`] stand-in with no network dependency.
pub struct MockSession {
    state: SessionState,
    reconnect: ReconnectPolicy,
    tables: Vec<MockTable>,
    statements: Vec<String>,
    current_database: Option<String>,
    fail_connect: bool,
    /// Scripted failures keyed by exact statement text
    statement_failures: HashMap<String, (Option<String>, String)>,
}

impl MockSession {
    /// Create a mock scripted with the canonical single table:
    /// `test_table (id INT, name STRING, value DOUBLE)`.
    pub fn new() -> Self {
        Self::empty().with_table(MockTable::new(
            "test_table",
            vec![
                Column::new("id", "INT"),
                Column::new("name", "STRING"),
                Column::new("value", "DOUBLE"),
            ],
        ))
    }

    /// Create a mock with an empty catalog
    pub fn empty() -> Self {
        Self {
            state: SessionState::Disconnected,
            reconnect: ReconnectPolicy::default(),
            tables: Vec::new(),
            statements: Vec::new(),
            current_database: None,
            fail_connect: false,
            statement_failures: HashMap::new(),
        }
    }

    /// Add a scripted table
    pub fn with_table(mut self, table: MockTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Configure `connect()` to fail
    pub fn with_connect_failure(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Configure an exact statement text to fail with the given backend
    /// code and message
    pub fn with_statement_failure(
        mut self,
        sql: impl Into<String>,
        code: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        self.statement_failures
            .insert(sql.into(), (code.map(str::to_string), message.into()));
        self
    }

    /// Set the second-connect behavior
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Every statement executed so far, in order
    pub fn executed_statements(&self) -> &[String] {
        &self.statements
    }

    /// Database selected by the most recent `USE` statement, if any
    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    fn require_connected(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.state == SessionState::Connected {
            Ok(())
        } else {
            Err(SessionError::IllegalState {
                operation,
                state: self.state,
            })
        }
    }

    fn answer_show_tables(&self) -> Rows {
        Rows::new(
            self.tables
                .iter()
                .map(|t| Row::new(vec![Some(t.name.clone())]))
                .collect(),
        )
    }

    fn answer_describe(&self, table: &str) -> Result<Rows, SessionError> {
        let table = self
            .tables
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| SessionError::Statement {
                code: None,
                message: format!("table does not exist: {table}"),
            })?;
        Ok(Rows::new(
            table
                .columns
                .iter()
                .map(|c| Row::new(vec![Some(c.name.clone()), Some(c.type_name.clone())]))
                .collect(),
        ))
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Session for MockSession {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    fn state(&self) -> SessionState {
        self.state
    }

    async fn connect(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Connected {
            return match self.reconnect {
                ReconnectPolicy::Reuse => Ok(()),
                ReconnectPolicy::Error => {
                    Err(SessionError::Connection("already connected".to_string()))
                }
            };
        }
        if self.fail_connect {
            return Err(SessionError::Connection(
                "simulated connection failure".to_string(),
            ));
        }
        self.state = SessionState::Connected;
        Ok(())
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<(), SessionError> {
        self.require_connected("execute_statement")?;

        if let Some((code, message)) = self.statement_failures.get(sql) {
            return Err(SessionError::Statement {
                code: code.clone(),
                message: message.clone(),
            });
        }

        if let Some(database) = sql.trim().strip_prefix("USE ") {
            self.current_database = Some(database.trim().to_string());
        }
        self.statements.push(sql.to_string());
        Ok(())
    }

    async fn execute_query(&mut self, sql: &str) -> Result<Rows, SessionError> {
        self.require_connected("execute_query")?;

        let trimmed = sql.trim();
        if trimmed.eq_ignore_ascii_case("SHOW TABLES") {
            return Ok(self.answer_show_tables());
        }
        if let Some(rest) = strip_prefix_ignore_ascii_case(trimmed, "DESCRIBE ") {
            return self.answer_describe(rest.trim());
        }
        Err(SessionError::Statement {
            code: None,
            message: format!("query not scripted in mock: {trimmed}"),
        })
    }

    async fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

fn strip_prefix_ignore_ascii_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&text[prefix.len()..]),
        _ => None,
    }
}

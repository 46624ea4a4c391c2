//! Catalog reader: table listing, column introspection, scratch provisioning

use sqlprobe_core::{Column, TableName};
use sqlprobe_session::{Session, SessionError};
use tracing::{debug, info};

/// Errors from schema-introspection queries, carrying the operation and
/// table context around the underlying session failure.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// `SHOW TABLES` failed
    #[error("failed to list tables")]
    ListTables {
        #[source]
        source: SessionError,
    },

    /// `DESCRIBE <table>` failed.
    ///
    /// An unknown table and any other query failure both land here; the
    /// backend code/message on the source error is the only way to tell
    /// them apart, and not every backend makes that possible.
    #[error("failed to describe table {table}")]
    DescribeTable {
        table: TableName,
        #[source]
        source: SessionError,
    },

    /// A provisioning statement failed.
    ///
    /// Provisioning is not transactional: the scratch database may be
    /// half-provisioned when this surfaces, and the caller either retries
    /// the full sequence or cleans up explicitly.
    #[error("provisioning statement failed: {statement}")]
    Provision {
        statement: String,
        #[source]
        source: SessionError,
    },

    /// The backend returned a metadata row with too few columns
    #[error("malformed row from {query}: expected at least {expected} columns")]
    MalformedRow {
        query: &'static str,
        expected: usize,
    },
}

/// Reads the catalog visible to a connected session.
///
/// Holds nothing but the session borrow; every call re-queries the
/// backend, so two snapshots taken at different times are unrelated.
pub struct CatalogReader<'a, S: Session + ?Sized> {
    session: &'a mut S,
}

impl<'a, S: Session + ?Sized> CatalogReader<'a, S> {
    /// Build a reader over a session
    pub fn new(session: &'a mut S) -> Self {
        Self { session }
    }

    /// List the tables in the current database, in backend enumeration
    /// order. An empty database yields an empty list, not an error.
    pub async fn list_tables(&mut self) -> Result<Vec<TableName>, CatalogError> {
        let rows = self
            .session
            .execute_query("SHOW TABLES")
            .await
            .map_err(|source| CatalogError::ListTables { source })?;

        let mut tables = Vec::new();
        for row in rows {
            let name = row.get(0).ok_or(CatalogError::MalformedRow {
                query: "SHOW TABLES",
                expected: 1,
            })?;
            tables.push(TableName::new(name));
        }
        debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }

    /// Describe a table's columns in backend-reported order.
    ///
    /// The order is declaration order on every backend this targets and is
    /// semantically meaningful for type-checking positional inserts, so it
    /// is never re-sorted here.
    pub async fn describe_columns(
        &mut self,
        table: &TableName,
    ) -> Result<Vec<Column>, CatalogError> {
        let rows = self
            .session
            .execute_query(&format!("DESCRIBE {table}"))
            .await
            .map_err(|source| CatalogError::DescribeTable {
                table: table.clone(),
                source,
            })?;

        let mut columns = Vec::new();
        for row in rows {
            let (name, type_name) = match (row.get(0), row.get(1)) {
                (Some(name), Some(type_name)) => (name, type_name),
                _ => {
                    return Err(CatalogError::MalformedRow {
                        query: "DESCRIBE",
                        expected: 2,
                    })
                }
            };
            columns.push(Column::new(name, type_name));
        }
        debug!(table = %table, count = columns.len(), "described columns");
        Ok(columns)
    }

    /// Provision a disposable scratch database: drop any leftover from a
    /// previous run, create it fresh, and select it.
    ///
    /// The name is spliced into DDL verbatim; the harness owns safe name
    /// construction. The three statements run in sequence with no
    /// rollback, and the first failure propagates immediately.
    pub async fn provision_database(&mut self, name: &str) -> Result<(), CatalogError> {
        let statements = [
            format!("DROP DATABASE IF EXISTS {name} CASCADE"),
            format!("CREATE DATABASE {name}"),
            format!("USE {name}"),
        ];

        for statement in statements {
            self.session
                .execute_statement(&statement)
                .await
                .map_err(|source| CatalogError::Provision {
                    statement: statement.clone(),
                    source,
                })?;
        }
        info!(database = name, "provisioned scratch database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlprobe_core::ReconnectPolicy;
    use sqlprobe_session::{MockSession, SessionState};

    async fn connected_mock() -> MockSession {
        let mut session = MockSession::new();
        session.connect().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_list_tables_maps_first_column() {
        let mut session = connected_mock().await;
        let mut catalog = CatalogReader::new(&mut session);

        let tables = catalog.list_tables().await.unwrap();
        assert_eq!(tables, vec![TableName::new("test_table")]);
    }

    #[tokio::test]
    async fn test_list_tables_on_empty_database_is_empty_not_error() {
        let mut session = MockSession::empty();
        session.connect().await.unwrap();
        let mut catalog = CatalogReader::new(&mut session);

        assert_eq!(catalog.list_tables().await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn test_list_tables_before_connect_fails() {
        let mut session = MockSession::new();
        let mut catalog = CatalogReader::new(&mut session);

        let err = catalog.list_tables().await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ListTables {
                source: SessionError::IllegalState { .. },
            }
        ));
    }

    #[tokio::test]
    async fn test_describe_columns_in_declaration_order() {
        let mut session = connected_mock().await;
        let mut catalog = CatalogReader::new(&mut session);

        let columns = catalog
            .describe_columns(&TableName::new("test_table"))
            .await
            .unwrap();
        assert_eq!(
            columns,
            vec![
                Column::new("id", "INT"),
                Column::new("name", "STRING"),
                Column::new("value", "DOUBLE"),
            ]
        );
    }

    #[tokio::test]
    async fn test_describe_unknown_table_is_an_error_not_empty() {
        let mut session = connected_mock().await;
        let mut catalog = CatalogReader::new(&mut session);

        let err = catalog
            .describe_columns(&TableName::new("nonexistent"))
            .await
            .unwrap_err();
        match err {
            CatalogError::DescribeTable { table, source } => {
                assert_eq!(table.as_str(), "nonexistent");
                assert!(matches!(source, SessionError::Statement { .. }));
            }
            other => panic!("expected DescribeTable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provision_issues_drop_create_use() {
        let mut session = MockSession::empty();
        session.connect().await.unwrap();

        CatalogReader::new(&mut session)
            .provision_database("sqlancer_test")
            .await
            .unwrap();

        assert_eq!(
            session.executed_statements(),
            [
                "DROP DATABASE IF EXISTS sqlancer_test CASCADE",
                "CREATE DATABASE sqlancer_test",
                "USE sqlancer_test",
            ]
        );
        assert_eq!(session.current_database(), Some("sqlancer_test"));
    }

    #[tokio::test]
    async fn test_provision_surfaces_partial_failure() {
        let mut session = MockSession::empty().with_statement_failure(
            "CREATE DATABASE scratch",
            Some("53100"),
            "out of disk",
        );
        session.connect().await.unwrap();

        let err = CatalogReader::new(&mut session)
            .provision_database("scratch")
            .await
            .unwrap_err();
        match err {
            CatalogError::Provision { statement, .. } => {
                assert_eq!(statement, "CREATE DATABASE scratch");
            }
            other => panic!("expected Provision, got {other:?}"),
        }

        // The drop already ran: half-provisioned state is observable.
        assert_eq!(
            session.executed_statements(),
            ["DROP DATABASE IF EXISTS scratch CASCADE"]
        );
    }

    #[tokio::test]
    async fn test_reader_works_through_dyn_session() {
        let mut session = MockSession::new().with_reconnect(ReconnectPolicy::Reuse);
        let session: &mut dyn Session = &mut session;
        session.connect().await.unwrap();

        let mut catalog = CatalogReader::new(session);
        let tables = catalog.list_tables().await.unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[tokio::test]
    async fn test_session_reusable_after_partial_row_consumption() {
        let mut session = connected_mock().await;

        let mut rows = session.execute_query("SHOW TABLES").await.unwrap();
        let _ = rows.next();
        drop(rows);

        // The cursor was drained inside execute_query; the session stays
        // usable.
        assert_eq!(session.state(), SessionState::Connected);
        let mut catalog = CatalogReader::new(&mut session);
        assert_eq!(catalog.list_tables().await.unwrap().len(), 1);
    }
}

//! Execution harness for generated SQL.
//!
//! The code-generation core never talks to an engine; this module is the
//! boundary where tests and demos run emitted statements. Only the embedded
//! DuckDB engine is wired up, behind the `duckdb` feature.

use async_trait::async_trait;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::executor::QueryResult;

/// Something that can run generated SQL against a live engine.
#[async_trait]
pub trait SqlRunner: Send + Sync {
    /// The dialect whose SQL this runner accepts.
    fn dialect(&self) -> &dyn Dialect;
    /// Run one statement and decode the rows.
    async fn run_sql(&self, sql: &str) -> Result<QueryResult>;
    /// Run a script of statements (seeding, DDL) discarding results.
    async fn run_batch(&self, sql: &str) -> Result<()>;
}

#[cfg(feature = "duckdb")]
pub use embedded::DuckDbRunner;

#[cfg(feature = "duckdb")]
mod embedded {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Instant;

    use async_trait::async_trait;
    use tokio::sync::{Mutex, Semaphore, SemaphorePermit};

    use crate::dialect::{Dialect, DuckDbDialect};
    use crate::error::{Result, ShaleError};
    use crate::executor::{duck_value_to_json, ColumnMeta, QueryResult};

    use super::SqlRunner;

    const DEFAULT_MAX_CONCURRENCY: usize = 16;

    /// Embedded DuckDB runner over a database file, with a small connection
    /// pool and a semaphore bounding concurrent engine calls.
    #[derive(Clone)]
    pub struct DuckDbRunner {
        database_path: PathBuf,
        dialect: DuckDbDialect,
        limiter: Arc<Semaphore>,
        pool: Arc<Mutex<Vec<duckdb::Connection>>>,
    }

    impl DuckDbRunner {
        pub fn new<P: AsRef<Path>>(path: P) -> Self {
            let path = path.as_ref().to_path_buf();
            tracing::info!(
                path = %path.display(),
                max_concurrency = DEFAULT_MAX_CONCURRENCY,
                "creating DuckDB runner"
            );
            Self {
                database_path: path,
                dialect: DuckDbDialect,
                limiter: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
                pool: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Bound on concurrent engine calls; callers tune it to hardware.
        pub fn with_max_concurrency(mut self, max_in_flight: usize) -> Self {
            tracing::debug!(max_concurrency = max_in_flight, "configuring runner concurrency");
            self.limiter = Arc::new(Semaphore::new(max_in_flight));
            self
        }

        async fn acquire_slot(&self) -> Result<SemaphorePermit<'_>> {
            if self.limiter.available_permits() == 0 {
                tracing::debug!("all runner slots in use, waiting for permit");
            }
            self.limiter
                .acquire()
                .await
                .map_err(|e| ShaleError::Execution(format!("limiter closed: {e}")))
        }

        async fn checkout_connection(&self) -> Result<duckdb::Connection> {
            let mut guard = self.pool.lock().await;
            if let Some(conn) = guard.pop() {
                return Ok(conn);
            }
            drop(guard);
            tracing::debug!(path = %self.database_path.display(), "opening new DuckDB connection");
            duckdb::Connection::open(self.database_path.clone())
                .map_err(|e| ShaleError::Execution(format!("open duckdb: {e}")))
        }

        async fn return_connection(&self, conn: duckdb::Connection) {
            let mut guard = self.pool.lock().await;
            guard.push(conn);
        }
    }

    #[async_trait]
    impl SqlRunner for DuckDbRunner {
        fn dialect(&self) -> &dyn Dialect {
            &self.dialect
        }

        async fn run_sql(&self, sql: &str) -> Result<QueryResult> {
            let sql = sql.to_string();
            let _permit = self.acquire_slot().await?;
            let conn = self.checkout_connection().await?;
            let outcome =
                tokio::task::spawn_blocking(move || -> Result<(QueryResult, duckdb::Connection)> {
                    let start = Instant::now();
                    let mut stmt = conn.prepare(&sql)?;
                    let mut rows_iter = stmt.query([])?;
                    let stmt_ref = rows_iter
                        .as_ref()
                        .ok_or_else(|| ShaleError::Execution("statement missing".to_string()))?;
                    let mut column_names = Vec::new();
                    for idx in 0..stmt_ref.column_count() {
                        let name = stmt_ref
                            .column_name(idx)
                            .map_err(|e| ShaleError::Execution(e.to_string()))?;
                        column_names.push(name.to_string());
                    }
                    let mut rows = Vec::new();
                    while let Some(row) = rows_iter.next()? {
                        let mut map = serde_json::Map::new();
                        for (idx, name) in column_names.iter().enumerate() {
                            map.insert(name.clone(), duck_value_to_json(row.get_ref(idx)?.to_owned()));
                        }
                        rows.push(map);
                    }
                    let columns = column_names
                        .into_iter()
                        .map(|name| ColumnMeta { name })
                        .collect::<Vec<_>>();
                    tracing::debug!(
                        rows = rows.len(),
                        columns = columns.len(),
                        ms = start.elapsed().as_millis(),
                        "duckdb run_sql"
                    );
                    Ok((QueryResult { columns, rows }, conn))
                })
                .await
                .map_err(|e| ShaleError::Execution(format!("task join error: {e}")))?;

            let (result, conn) = outcome?;
            self.return_connection(conn).await;
            Ok(result)
        }

        async fn run_batch(&self, sql: &str) -> Result<()> {
            let sql = sql.to_string();
            let _permit = self.acquire_slot().await?;
            let conn = self.checkout_connection().await?;
            let outcome = tokio::task::spawn_blocking(move || -> Result<duckdb::Connection> {
                conn.execute_batch(&sql)?;
                Ok(conn)
            })
            .await
            .map_err(|e| ShaleError::Execution(format!("task join error: {e}")))?;

            let conn = outcome?;
            self.return_connection(conn).await;
            Ok(())
        }
    }
}

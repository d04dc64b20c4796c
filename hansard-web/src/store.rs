//! Record store client
//!
//! The store is constructed once by the process entry point, cloned into the
//! HTTP state, and closed with [`RecordStore::shutdown`] after the server has
//! drained. Every query runs under a [`QueryContext`] so an aborted request or
//! a shutdown stops waiting on the database.

use hansard_common::{Error, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info};

/// Handle to the record store shared by all requests
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
    shutdown: CancellationToken,
    query_timeout: Option<Duration>,
}

impl RecordStore {
    /// Open an existing database read-only
    pub async fn connect_readonly(db_path: &Path, query_timeout: Option<Duration>) -> Result<Self> {
        if !db_path.exists() {
            return Err(Error::Config(format!(
                "Database not found: {}. Run `hansard-web import` first to create it.",
                db_path.display()
            )));
        }

        let db_url = format!("sqlite://{}?mode=ro", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&db_url)
            .await?;

        // A writable handle here would mean the URL flags were not honoured
        #[cfg(debug_assertions)]
        {
            let write_test = sqlx::query("CREATE TABLE _write_probe (id INTEGER)")
                .execute(&pool)
                .await;
            if write_test.is_ok() {
                return Err(Error::Internal(
                    "database connection is not read-only".to_string(),
                ));
            }
        }

        info!("Connected to record store (read-only): {}", db_path.display());
        Ok(Self::from_pool(pool, query_timeout))
    }

    /// Wrap an already-open pool
    pub fn from_pool(pool: SqlitePool, query_timeout: Option<Duration>) -> Self {
        Self {
            pool,
            shutdown: CancellationToken::new(),
            query_timeout,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    /// Fresh per-request context; cancelled automatically on shutdown
    pub fn context(&self) -> QueryContext {
        QueryContext::new(self.shutdown.child_token(), self.query_timeout)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Cancel outstanding queries and close the pool
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.pool.close().await;
        info!("Record store closed");
    }
}

/// Cancellation and deadline for the queries of one request
#[derive(Clone, Debug)]
pub struct QueryContext {
    cancel: CancellationToken,
    deadline: Option<Duration>,
}

impl QueryContext {
    pub fn new(cancel: CancellationToken, deadline: Option<Duration>) -> Self {
        Self { cancel, deadline }
    }

    /// Context that is never cancelled and has no deadline
    pub fn unbounded() -> Self {
        Self::new(CancellationToken::new(), None)
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Guard that cancels this context when dropped, e.g. when the request
    /// future is dropped by a disconnecting client
    pub fn drop_guard(&self) -> DropGuard {
        self.cancel.clone().drop_guard()
    }

    /// Run a query future, giving up on cancellation or when the deadline passes
    pub async fn run<T, F>(&self, query: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout(deadline, fut)
                    .await
                    .map_err(|_| Error::Timeout(deadline))?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(query, "Query cancelled");
                Err(Error::Cancelled)
            }
            result = bounded => result,
        }
    }
}

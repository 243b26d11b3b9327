//! Per-request PostgreSQL connections.

use std::future::Future;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, error, instrument};

use crate::config::Config;
use crate::error::DbError;

/// Opens a fresh connection for every call. There is no pooling.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    options: PgConnectOptions,
    timeout: Duration,
}

impl ConnectionFactory {
    /// Create a factory from the database settings in `config`.
    pub fn new(config: &Config) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port)
            .database(&config.db_name)
            .username(&config.db_user)
            .password(&config.db_password);

        Self {
            options,
            timeout: config.db_timeout(),
        }
    }

    /// Bound applied to connecting and to each statement.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Open a new connection.
    #[instrument(skip(self))]
    pub async fn open(&self) -> Result<PgConnection, DbError> {
        let result = self
            .within("connect", async {
                PgConnection::connect_with(&self.options)
                    .await
                    .map_err(DbError::Connect)
            })
            .await;

        if let Err(e) = &result {
            error!(error = %e, "Database connection failed");
        }

        result
    }

    /// Run `fut`, failing with [`DbError::Timeout`] once the bound expires.
    pub async fn within<T, F>(&self, operation: &'static str, fut: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(DbError::Timeout {
                operation,
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

/// Close a connection, logging (not propagating) any failure.
pub async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        debug!(error = %e, "Closing database connection failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn config_for_port(port: u16, timeout_ms: u64) -> Config {
        Config {
            db_host: "127.0.0.1".to_string(),
            db_port: port,
            db_timeout_ms: timeout_ms,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let factory = ConnectionFactory::new(&config_for_port(port, 2000));
        let err = factory.open().await.unwrap_err();
        assert!(matches!(err, DbError::Connect(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn silent_server_hits_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let factory = ConnectionFactory::new(&config_for_port(port, 100));
        let err = factory.open().await.unwrap_err();
        assert!(
            matches!(err, DbError::Timeout { operation: "connect", after_ms: 100 }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn within_passes_through_results() {
        let factory = ConnectionFactory::new(&config_for_port(5432, 100));
        let value = tokio_test::assert_ok!(factory.within("noop", async { Ok::<_, DbError>(7) }).await);
        assert_eq!(value, 7);
    }
}

//! Item persistence.

use async_trait::async_trait;
use tracing::instrument;

use crate::config::Config;
use crate::error::DbError;

use super::connection::{release, ConnectionFactory};
use super::types::Item;

const INSERT_ITEM: &str =
    "INSERT INTO items (id, name, description, created_at) VALUES ($1, $2, $3, $4)";
const SELECT_ITEMS: &str = "SELECT id, name, COALESCE(description, '') AS description, created_at \
     FROM items ORDER BY created_at DESC";
const PING: &str = "SELECT 1";

/// Storage for items.
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Persist a new item.
    async fn insert(&self, item: &Item) -> Result<(), DbError>;

    /// All items, most recently created first.
    async fn list(&self) -> Result<Vec<Item>, DbError>;

    /// Round-trip to the backend.
    async fn ping(&self) -> Result<(), DbError>;
}

/// PostgreSQL-backed store; every call opens and closes its own connection.
#[derive(Debug, Clone)]
pub struct PgItemStore {
    connections: ConnectionFactory,
}

impl PgItemStore {
    /// Create a store over an existing connection factory.
    pub fn new(connections: ConnectionFactory) -> Self {
        Self { connections }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ConnectionFactory::new(config))
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn insert(&self, item: &Item) -> Result<(), DbError> {
        let mut conn = self.connections.open().await?;

        let result = self
            .connections
            .within("insert", async {
                sqlx::query(INSERT_ITEM)
                    .bind(item.id)
                    .bind(&item.name)
                    .bind(&item.description)
                    .bind(item.created_at)
                    .execute(&mut conn)
                    .await
                    .map_err(|source| DbError::Query {
                        operation: "insert",
                        source,
                    })
            })
            .await;

        release(conn).await;
        result.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Item>, DbError> {
        let mut conn = self.connections.open().await?;

        let result = self
            .connections
            .within("select", async {
                sqlx::query_as::<_, Item>(SELECT_ITEMS)
                    .fetch_all(&mut conn)
                    .await
                    .map_err(|source| DbError::Query {
                        operation: "select",
                        source,
                    })
            })
            .await;

        release(conn).await;
        result
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.connections.open().await?;

        let result = self
            .connections
            .within("ping", async {
                sqlx::query(PING)
                    .execute(&mut conn)
                    .await
                    .map_err(|source| DbError::Query {
                        operation: "ping",
                        source,
                    })
            })
            .await;

        release(conn).await;
        result.map(|_| ())
    }
}

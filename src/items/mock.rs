//! In-memory item store for unit testing.
//!
//! Mirrors the PostgreSQL store's ordering and lets tests switch individual
//! operations into failure mode.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DbError;

use super::store::ItemStore;
use super::types::Item;

/// Configuration for mock store behavior.
#[derive(Debug, Clone, Default)]
pub struct MockStoreConfig {
    /// Whether inserts fail.
    pub fail_insert: bool,
    /// Whether listing fails.
    pub fail_list: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock item store for testing.
#[derive(Debug, Clone, Default)]
pub struct MockItemStore {
    config: MockStoreConfig,
    items: Arc<Mutex<Vec<Item>>>,
    down: Arc<AtomicBool>,
}

impl MockItemStore {
    /// Create an empty, healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with custom behavior.
    pub fn with_config(config: MockStoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Simulate the whole backend going away (or coming back).
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Remove all stored items.
    pub fn clear(&self) {
        self.items().clear();
    }

    fn items(&self) -> MutexGuard<'_, Vec<Item>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn simulate(&self, failing: bool, operation: &'static str) -> Result<(), DbError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.down.load(Ordering::SeqCst) {
            return Err(DbError::Connect(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))));
        }

        if failing {
            return Err(DbError::Query {
                operation,
                source: sqlx::Error::Protocol(format!("simulated {} failure", operation)),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ItemStore for MockItemStore {
    async fn insert(&self, item: &Item) -> Result<(), DbError> {
        self.simulate(self.config.fail_insert, "insert").await?;
        self.items().push(item.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Item>, DbError> {
        self.simulate(self.config.fail_list, "select").await?;
        let mut items = self.items().clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.simulate(false, "ping").await
    }
}

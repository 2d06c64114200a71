//! TTL cache around a table source
//!
//! Successful fetches are kept per sheet for a fixed time to live and
//! served as clones. Errors are never cached, so a failing backend is
//! retried on the next request. A zero TTL disables caching entirely.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::ViewerResult;
use crate::source::{SheetInfo, TableSource};
use crate::table::Table;

struct CacheEntry {
    fetched_at: Instant,
    table: Table,
}

/// Caching wrapper over any [`TableSource`]
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl<S: TableSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the cache key so the default sheet and its explicit name
    /// share one entry
    fn cache_key(&self, sheet: Option<&str>) -> String {
        match sheet.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self
                .inner
                .sheets()
                .first()
                .map(|info| info.name.clone())
                .unwrap_or_default(),
        }
    }

    async fn lookup(&self, key: &str) -> Option<Table> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.table.clone())
        } else {
            None
        }
    }

    async fn store(&self, key: String, table: Table) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                table,
            },
        );
    }
}

#[async_trait]
impl<S: TableSource> TableSource for CachedSource<S> {
    async fn fetch_table(&self, sheet: Option<&str>) -> ViewerResult<Table> {
        let key = self.cache_key(sheet);
        if let Some(table) = self.lookup(&key).await {
            tracing::debug!(sheet = %key, "cache hit");
            return Ok(table);
        }
        tracing::debug!(sheet = %key, "cache miss");
        let table = self.inner.fetch_table(Some(&key)).await?;
        self.store(key, table.clone()).await;
        Ok(table)
    }

    fn sheets(&self) -> Vec<SheetInfo> {
        self.inner.sheets()
    }
}

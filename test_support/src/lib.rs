//! ABOUTME: Shared testing utilities and helper functions
//! ABOUTME: In-memory record store with failure injection for driver tests

use async_trait::async_trait;
use pm_core::{Error, Result};
use pm_db::RecordStore;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex,
};

/// In-memory stand-in for the MySQL load table
///
/// Identifiers behave like AUTO_INCREMENT: they start at 1 and are reset by
/// `clear_table`. Each operation can be switched to fail on demand.
#[derive(Debug)]
pub struct MemoryStore {
    schema_created: AtomicBool,
    rows: Mutex<Vec<(u64, i64)>>,
    next_id: AtomicU64,
    active_connections: AtomicU64,
    fail_schema: AtomicBool,
    fail_truncate: AtomicBool,
    fail_inserts: AtomicBool,
    fail_status: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            schema_created: AtomicBool::new(false),
            rows: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            active_connections: AtomicU64::new(1),
            fail_schema: AtomicBool::new(false),
            fail_truncate: AtomicBool::new(false),
            fail_inserts: AtomicBool::new(false),
            fail_status: AtomicBool::new(false),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active_connections(&self, count: u64) {
        self.active_connections.store(count, Ordering::SeqCst);
    }

    pub fn fail_schema(&self, fail: bool) {
        self.fail_schema.store(fail, Ordering::SeqCst);
    }

    pub fn fail_truncate(&self, fail: bool) {
        self.fail_truncate.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    pub fn has_schema(&self) -> bool {
        self.schema_created.load(Ordering::SeqCst)
    }

    /// Snapshot of stored `(id, value)` pairs in insertion order
    pub fn rows(&self) -> Vec<(u64, i64)> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn require_schema(&self) -> Result<()> {
        if self.has_schema() {
            Ok(())
        } else {
            Err(Error::Database("Table 'table_test' doesn't exist".to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        if self.fail_schema.load(Ordering::SeqCst) {
            return Err(Error::Database("CREATE command denied".to_string()));
        }
        self.schema_created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_table(&self) -> Result<()> {
        if self.fail_truncate.load(Ordering::SeqCst) {
            return Err(Error::Database("DROP command denied".to_string()));
        }
        self.require_schema()?;

        let mut rows = self
            .rows
            .lock()
            .map_err(|e| Error::Database(format!("store poisoned: {}", e)))?;
        rows.clear();
        self.next_id.store(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_row(&self, value: i64) -> Result<u64> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Database("Lost connection to MySQL server".to_string()));
        }
        self.require_schema()?;

        let mut rows = self
            .rows
            .lock()
            .map_err(|e| Error::Database(format!("store poisoned: {}", e)))?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        rows.push((id, value));
        Ok(id)
    }

    async fn read_active_connections(&self) -> Result<u64> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(Error::Database("Lost connection to MySQL server".to_string()));
        }
        Ok(self.active_connections.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_requires_schema() {
        let store = MemoryStore::new();
        assert!(store.insert_row(1).await.is_err());

        store.ensure_schema().await.unwrap();
        assert_eq!(store.insert_row(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_table_resets_identifiers() {
        let store = MemoryStore::new();
        store.ensure_schema().await.unwrap();
        store.insert_row(10).await.unwrap();
        store.insert_row(11).await.unwrap();

        store.clear_table().await.unwrap();

        assert!(store.rows().is_empty());
        assert_eq!(store.insert_row(12).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let store = MemoryStore::new();
        store.ensure_schema().await.unwrap();

        store.fail_inserts(true);
        store.fail_status(true);
        assert!(store.insert_row(1).await.is_err());
        assert!(store.read_active_connections().await.is_err());

        store.fail_inserts(false);
        store.fail_status(false);
        store.set_active_connections(9);
        assert!(store.insert_row(1).await.is_ok());
        assert_eq!(store.read_active_connections().await.unwrap(), 9);
    }
}

//! ABOUTME: Storage seam used by the load driver
//! ABOUTME: Implemented by the MySQL gateway and by in-memory test doubles

use async_trait::async_trait;
use pm_core::Result;

/// Operations the load driver needs from the database
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the load table if it does not exist yet
    async fn ensure_schema(&self) -> Result<()>;

    /// Remove every row and reset the identifier sequence
    async fn clear_table(&self) -> Result<()>;

    /// Append one row and return the identifier assigned by the database
    async fn insert_row(&self, value: i64) -> Result<u64>;

    /// Number of client connections currently open on the server
    async fn read_active_connections(&self) -> Result<u64>;
}

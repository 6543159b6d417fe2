//! ABOUTME: MySQL gateway for the load table and server status queries
//! ABOUTME: Creates, truncates and appends to table_test over a sqlx pool

use async_trait::async_trait;
use pm_config::DatabaseConfig;
use pm_core::{Error, Result};
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    MySqlPool, Row,
};
use tracing::{debug, info, instrument};

pub mod schema;
pub mod store;

pub use schema::{parse_status_value, Record, TABLE_NAME};
pub use store::RecordStore;

/// Database connection pool and load table operations
#[derive(Debug, Clone)]
pub struct Db {
    pool: MySqlPool,
}

impl Db {
    /// Open a connection pool to the configured MySQL server
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = %config.name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to MySQL");

        let connect_options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .connect_with(connect_options)
            .await
            .map_err(|e| Error::Database(format!("Failed to create connection pool: {}", e)))?;

        info!("Connected to MySQL");
        Ok(Self { pool })
    }

    /// Check database health
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing database health check");

        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Health check failed: {}", e)))?;

        debug!("Database health check passed");
        Ok(())
    }

    /// Number of rows currently in the load table
    #[instrument(skip(self))]
    pub async fn count_rows(&self) -> Result<i64> {
        let row = sqlx::query(schema::COUNT_ROWS_SQL)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to count rows: {}", e)))?;

        row.try_get("count")
            .map_err(|e| Error::Database(format!("Failed to read row count: {}", e)))
    }

    /// Find a load row by id
    #[instrument(skip(self))]
    pub async fn find_record(&self, id: u64) -> Result<Option<Record>> {
        sqlx::query_as::<_, Record>(schema::FIND_RECORD_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to find record {}: {}", id, e)))
    }
}

#[async_trait]
impl RecordStore for Db {
    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> Result<()> {
        info!(table = TABLE_NAME, "Ensuring load table exists");

        sqlx::query(schema::CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_table(&self) -> Result<()> {
        info!(table = TABLE_NAME, "Truncating load table");

        sqlx::query(schema::TRUNCATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to truncate table: {}", e)))?;

        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn insert_row(&self, value: i64) -> Result<u64> {
        let result = sqlx::query(schema::INSERT_ROW_SQL)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to insert row: {}", e)))?;

        Ok(result.last_insert_id())
    }

    #[instrument(skip(self), level = "debug")]
    async fn read_active_connections(&self) -> Result<u64> {
        let row = sqlx::query(schema::ACTIVE_CONNECTIONS_SQL)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to query connection status: {}", e)))?
            .ok_or_else(|| Error::Database("Threads_connected is not reported".to_string()))?;

        let name: String = row
            .try_get(0)
            .map_err(|e| Error::Database(format!("Failed to read status name: {}", e)))?;
        let value: String = row
            .try_get(1)
            .map_err(|e| Error::Database(format!("Failed to read status value: {}", e)))?;

        parse_status_value(&name, &value)
    }
}

//! ABOUTME: Load table definition, statements and row type
//! ABOUTME: Keeps every SQL string used against table_test in one place

use chrono::{DateTime, Utc};
use pm_core::{Error, Result};
use sqlx::FromRow;

pub const TABLE_NAME: &str = "table_test";

pub const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS table_test
(
    id         INT PRIMARY KEY AUTO_INCREMENT,
    number     INT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
    deleted_at TIMESTAMP NULL
)
"#;

/// TRUNCATE also resets AUTO_INCREMENT, so the next row gets id 1
pub const TRUNCATE_TABLE_SQL: &str = "TRUNCATE TABLE `table_test`";

pub const INSERT_ROW_SQL: &str = "INSERT INTO `table_test` (number) VALUES (?)";

pub const ACTIVE_CONNECTIONS_SQL: &str = "SHOW STATUS LIKE 'Threads_connected'";

pub const COUNT_ROWS_SQL: &str = "SELECT COUNT(*) AS count FROM `table_test`";

pub const FIND_RECORD_SQL: &str = "SELECT id, number, created_at, updated_at, deleted_at FROM `table_test` WHERE id = ?";

/// One row of the load table
///
/// `deleted_at` is part of the table but nothing ever sets it.
#[derive(Debug, Clone, FromRow)]
pub struct Record {
    pub id: i32,
    pub number: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Parse the `Value` column of a `SHOW STATUS` row
pub fn parse_status_value(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|e| {
        Error::Database(format!(
            "Status variable {} has non-numeric value '{}': {}",
            name, raw, e
        ))
    })
}

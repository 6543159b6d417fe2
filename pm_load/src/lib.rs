//! ABOUTME: Load driver that writes rows and samples connections on a timer
//! ABOUTME: Initializes the load table then ticks forever, updating metrics

use pm_core::Result;
use pm_db::RecordStore;
use pm_obs::Metrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub mod schedule;

/// Lifecycle of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Table not yet created and truncated
    Initializing,
    /// Writing rows; only process termination leaves this state
    Running,
}

/// Outcome of a single iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Iteration counter written to the `number` column
    pub value: i64,
    /// Identifier assigned by the database, if the insert succeeded
    pub inserted_id: Option<u64>,
    /// Connection sample, if the status query succeeded
    pub active_connections: Option<u64>,
}

impl TickReport {
    pub fn inserted(&self) -> bool {
        self.inserted_id.is_some()
    }
}

/// Drives synthetic writes against a record store
pub struct LoadDriver<S> {
    store: Arc<S>,
    metrics: Arc<Metrics>,
    period: Duration,
    next_value: i64,
    state: DriverState,
}

impl<S: RecordStore> LoadDriver<S> {
    pub fn new(store: Arc<S>, metrics: Arc<Metrics>, period: Duration) -> Self {
        Self {
            store,
            metrics,
            period,
            next_value: 0,
            state: DriverState::Initializing,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Value the next iteration will write
    pub fn next_value(&self) -> i64 {
        self.next_value
    }

    /// Create the load table if needed and empty it
    ///
    /// Errors are returned to the caller, which decides whether to exit.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) -> Result<()> {
        if let Err(e) = self.store.ensure_schema().await {
            error!(error = %e, "Error creating table");
            return Err(e);
        }

        if let Err(e) = self.store.clear_table().await {
            error!(error = %e, "Error clearing data");
            return Err(e);
        }

        self.state = DriverState::Running;
        info!("Load table ready");
        Ok(())
    }

    /// Run one iteration without waiting
    ///
    /// Failures are logged and counted; they never abort the driver.
    pub async fn tick(&mut self) -> TickReport {
        let value = self.next_value;
        self.next_value += 1;

        let inserted_id = match self.store.insert_row(value).await {
            Ok(id) => {
                self.metrics.record_insert_success();
                Some(id)
            }
            Err(e) => {
                warn!(value, error = %e, "Error inserting data");
                self.metrics.record_insert_failure();
                None
            }
        };

        self.metrics.record_iteration();

        let active_connections = match self.store.read_active_connections().await {
            Ok(count) => {
                self.metrics.set_active_connections(count);
                Some(count)
            }
            Err(e) => {
                warn!(error = %e, "Error getting active connections");
                None
            }
        };

        debug!(value, ?inserted_id, ?active_connections, "Tick complete");

        TickReport {
            value,
            inserted_id,
            active_connections,
        }
    }

    /// Tick on a fixed period forever
    ///
    /// Call `initialize` first; ticks against a missing table only count
    /// failed inserts.
    pub async fn run(mut self) {
        if self.state == DriverState::Initializing {
            warn!("Load driver started before initialization");
        }

        let period = schedule::effective_period(self.period);
        info!(period_ms = period.as_millis() as u64, "Load driver running");

        let mut ticker = schedule::ticker(self.period);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}

//! ABOUTME: Load generator metrics and the registry that exposes them
//! ABOUTME: Rejects duplicate metric names so wiring mistakes fail at startup

use pm_core::{Error, Result};
use prometheus::{
    core::Collector, Encoder, IntCounter, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};

pub const CONNECTIONS_METRIC: &str = "mysql_connections";
pub const THROUGHPUT_METRIC: &str = "mysql_throughput";
pub const SUCCESS_METRIC: &str = "mysql_success_count";
pub const FAIL_METRIC: &str = "mysql_fail_count";

/// Only status the connection gauge is ever labeled with
pub const ACTIVE_STATUS: &str = "active";

/// Register a collector, turning a name clash into `Error::Metrics`
fn register<C: Collector + Clone + 'static>(registry: &Registry, collector: &C) -> Result<()> {
    let names: Vec<String> = collector.desc().iter().map(|d| d.fq_name.clone()).collect();

    registry
        .register(Box::new(collector.clone()))
        .map_err(|e| match e {
            prometheus::Error::AlreadyReg => {
                Error::Metrics(format!("{} is already registered", names.join(", ")))
            }
            other => Error::Metrics(format!("Failed to register {}: {}", names.join(", "), other)),
        })
}

fn counter(name: &str, help: &str) -> Result<IntCounter> {
    IntCounter::new(name, help)
        .map_err(|e| Error::Metrics(format!("Invalid counter {}: {}", name, e)))
}

/// The four load generator instruments plus the registry serving them
///
/// Each `Metrics` owns its registry, so instances never see each other's
/// values and no process-wide collector is involved.
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Registry,
    active_connections: IntGauge,
    throughput: IntCounter,
    success_count: IntCounter,
    fail_count: IntCounter,
}

impl Metrics {
    /// Create and register all instruments
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let connections = IntGaugeVec::new(
            Opts::new(CONNECTIONS_METRIC, "Number of MySQL connections"),
            &["status"],
        )
        .map_err(|e| Error::Metrics(format!("Invalid gauge {}: {}", CONNECTIONS_METRIC, e)))?;
        register(&registry, &connections)?;

        let throughput = counter(THROUGHPUT_METRIC, "Number of data entries pushed to MySQL")?;
        register(&registry, &throughput)?;

        let success_count = counter(SUCCESS_METRIC, "Number of successful data pushes to MySQL")?;
        register(&registry, &success_count)?;

        let fail_count = counter(FAIL_METRIC, "Number of failed data pushes to MySQL")?;
        register(&registry, &fail_count)?;

        // Shares its value with the labeled child inside the vec
        let active_connections = connections.with_label_values(&[ACTIVE_STATUS]);

        Ok(Self {
            registry,
            active_connections,
            throughput,
            success_count,
            fail_count,
        })
    }

    pub fn record_insert_success(&self) {
        self.success_count.inc();
    }

    pub fn record_insert_failure(&self) {
        self.fail_count.inc();
    }

    pub fn record_iteration(&self) {
        self.throughput.inc();
    }

    /// Overwrite the active connection gauge with a fresh sample
    pub fn set_active_connections(&self, count: u64) {
        self.active_connections
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn active_connections(&self) -> i64 {
        self.active_connections.get()
    }

    pub fn throughput(&self) -> u64 {
        self.throughput.get()
    }

    pub fn success_count(&self) -> u64 {
        self.success_count.get()
    }

    pub fn fail_count(&self) -> u64 {
        self.fail_count.get()
    }

    /// Render every instrument in the Prometheus 0.0.4 text format
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| Error::Metrics(format!("Failed to encode metrics: {}", e)))?;

        String::from_utf8(buffer)
            .map_err(|e| Error::Metrics(format!("Encoded metrics are not UTF-8: {}", e)))
    }
}

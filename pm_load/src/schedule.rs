//! ABOUTME: Fixed-period timer used to pace load iterations
//! ABOUTME: Clamps the configured interval so a zero setting cannot panic

use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Shortest period the driver will tick at
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Period actually used for a configured sleep interval
pub fn effective_period(configured: Duration) -> Duration {
    configured.max(MIN_PERIOD)
}

/// Build the driver's ticker
///
/// The first tick completes immediately. A slow iteration delays the
/// following ones instead of causing a burst of catch-up ticks.
pub fn ticker(configured: Duration) -> Interval {
    let mut ticker = interval(effective_period(configured));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

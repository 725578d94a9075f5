use std::time::Duration;

use tokio::time::interval;

use crate::monitoring::metrics::{log_metrics_snapshot, METRICS};

/// Spawn a background task that periodically logs a compact metrics snapshot.
///
/// Combined with the JSON log output this is the operator's view of upstream
/// health. A zero period disables the task.
pub fn spawn_dashboard_task(period: Duration) -> Option<tokio::task::JoinHandle<()>> {
    if period.is_zero() {
        return None;
    }
    let mut ticker = interval(period);
    Some(tokio::spawn(async move {
        // First tick fires immediately; skip it so the first snapshot covers a full period.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            log_metrics_snapshot(&METRICS.snapshot());
        }
    }))
}

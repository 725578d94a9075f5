use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::info;

/// Global metrics registry for upstream traffic.
pub static METRICS: Lazy<Metrics> = Lazy::new(Metrics::default);

fn now_unix_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[derive(Default)]
struct MetricsInner {
    upstream_requests: AtomicU64,
    upstream_failures: AtomicU64,
    last_upstream_ts: AtomicU64,
}

/// Lightweight metrics handle backed by atomics so it can be cloned cheaply.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

impl Metrics {
    pub fn record_upstream_ok(&self, operation: &str) {
        self.inner.upstream_requests.fetch_add(1, Ordering::Relaxed);
        self.inner
            .last_upstream_ts
            .store(now_unix_secs(), Ordering::Relaxed);

        tracing::trace!(
            target: "metrics",
            event = "upstream_ok",
            operation = %operation,
            total_requests = self.inner.upstream_requests.load(Ordering::Relaxed),
        );
    }

    pub fn record_upstream_failed(&self, operation: &str, reason: &str) {
        self.inner.upstream_requests.fetch_add(1, Ordering::Relaxed);
        self.inner.upstream_failures.fetch_add(1, Ordering::Relaxed);
        self.inner
            .last_upstream_ts
            .store(now_unix_secs(), Ordering::Relaxed);

        info!(
            target: "metrics",
            event = "upstream_failed",
            operation = %operation,
            reason = %reason,
            total_failures = self.inner.upstream_failures.load(Ordering::Relaxed),
            "upstream call failed"
        );
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            upstream_requests: self.inner.upstream_requests.load(Ordering::Relaxed),
            upstream_failures: self.inner.upstream_failures.load(Ordering::Relaxed),
            last_upstream_ts: self.inner.last_upstream_ts.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of current metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub upstream_requests: u64,
    pub upstream_failures: u64,
    pub last_upstream_ts: u64,
}

pub fn log_metrics_snapshot(snapshot: &MetricsSnapshot) {
    info!(
        target: "metrics",
        event = "metrics_snapshot",
        upstream_requests = snapshot.upstream_requests,
        upstream_failures = snapshot.upstream_failures,
        last_upstream_ts = snapshot.last_upstream_ts,
        "metrics snapshot"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_requests_and_failures() {
        let metrics = Metrics::default();
        metrics.record_upstream_ok("search");
        metrics.record_upstream_failed("book", "HTTP status 500");
        let snap = metrics.snapshot();
        assert_eq!(snap.upstream_requests, 2);
        assert_eq!(snap.upstream_failures, 1);
        assert!(snap.last_upstream_ts > 0);
    }
}

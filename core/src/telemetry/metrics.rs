use serde::Serialize;
use std::sync::Mutex;

/// Counters describing dashboard activity since start-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub runs: usize,
    pub failed_runs: usize,
    pub selections: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_run(&self, succeeded: bool) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.runs += 1;
            if !succeeded {
                metrics.failed_runs += 1;
            }
        }
    }

    pub fn record_selection(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.selections += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|m| *m).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_failed_runs_separately() {
        let metrics = MetricsRecorder::new();
        metrics.record_run(true);
        metrics.record_run(false);
        metrics.record_selection();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                runs: 2,
                failed_runs: 1,
                selections: 1
            }
        );
    }
}

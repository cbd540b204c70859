// Bounded polling on the tokio clock. Tests pause the clock, so a 30 s
// budget elapses instantly.

use std::time::Duration;

use tokio::time::{Instant, sleep};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    pub(crate) fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    /// Sleep one poll interval, clamped to the remaining budget.
    pub(crate) async fn tick(&self, interval: Duration) {
        let remaining = self.budget.saturating_sub(self.start.elapsed());
        sleep(interval.min(remaining)).await;
    }

    pub(crate) fn budget(&self) -> Duration {
        self.budget
    }
}

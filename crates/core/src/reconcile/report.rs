//! Per-cycle summary.

use std::time::Duration;

use rust_decimal::Decimal;

/// What happened to one order during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrderResult {
    /// Settled to a terminal status.
    Finalized { credited: Decimal },
    /// Moved from `NEW` to `PROCESSING`.
    Advanced,
    /// Upstream answered but the local state needed no change.
    Unchanged,
    /// Not ready upstream, transient failure or already terminal.
    Skipped,
    /// Not fetched because the cycle was halted by a rate limit.
    Halted,
    /// This order's fetch was rate limited.
    RateLimited,
    /// A store call failed; the order is left for the next cycle.
    Failed,
}

/// Summary returned by
/// [`ReconciliationEngine::run_cycle`](super::ReconciliationEngine::run_cycle).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Open orders loaded at the start of the cycle.
    pub open: usize,
    /// Orders for which the accrual authority was called.
    pub checked: usize,
    /// Orders settled as `PROCESSED` or `INVALID`.
    pub finalized: usize,
    /// Total points credited this cycle.
    pub credited: Decimal,
    /// Orders moved from `NEW` to `PROCESSING`.
    pub advanced: usize,
    /// Orders left as they were (not ready, transient failure, no change).
    pub skipped: usize,
    /// Orders not fetched because of a rate limit.
    pub halted: usize,
    /// Orders whose store update failed.
    pub failed: usize,
    /// Open orders older than the stale threshold.
    pub stale: usize,
    /// Longest backoff requested by the authority, if any call was throttled.
    pub rate_limited: Option<Duration>,
}

impl CycleReport {
    pub(crate) fn record(&mut self, result: OrderResult) {
        match result {
            OrderResult::Finalized { credited } => {
                self.checked += 1;
                self.finalized += 1;
                self.credited += credited;
            }
            OrderResult::Advanced => {
                self.checked += 1;
                self.advanced += 1;
            }
            OrderResult::Unchanged | OrderResult::Skipped => {
                self.checked += 1;
                self.skipped += 1;
            }
            OrderResult::RateLimited => self.checked += 1,
            OrderResult::Halted => self.halted += 1,
            OrderResult::Failed => {
                self.checked += 1;
                self.failed += 1;
            }
        }
    }

    /// Returns true if the authority throttled this cycle.
    #[must_use]
    pub const fn was_rate_limited(&self) -> bool {
        self.rate_limited.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_accumulates() {
        let mut report = CycleReport::default();
        report.record(OrderResult::Finalized { credited: dec!(500) });
        report.record(OrderResult::Finalized { credited: dec!(0) });
        report.record(OrderResult::Advanced);
        report.record(OrderResult::Skipped);
        report.record(OrderResult::RateLimited);
        report.record(OrderResult::Halted);
        report.record(OrderResult::Halted);
        report.record(OrderResult::Failed);

        assert_eq!(report.checked, 6);
        assert_eq!(report.finalized, 2);
        assert_eq!(report.credited, dec!(500));
        assert_eq!(report.advanced, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.halted, 2);
        assert_eq!(report.failed, 1);
    }
}

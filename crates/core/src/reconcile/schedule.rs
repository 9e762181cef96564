//! Delay computation between reconciliation cycles.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::report::CycleReport;

/// Decides how long to wait before the next cycle.
///
/// The wait is the fixed interval, stretched to cover any outstanding
/// rate-limit backoff.
#[derive(Debug, Clone)]
pub struct ReconcileSchedule {
    interval: Duration,
    resume_at: Option<DateTime<Utc>>,
}

impl ReconcileSchedule {
    /// Creates a schedule with no pending backoff.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            resume_at: None,
        }
    }

    /// Records a finished cycle observed at `now`.
    pub fn record(&mut self, report: &CycleReport, now: DateTime<Utc>) {
        if let Some(backoff) = report.rate_limited {
            let backoff = chrono::Duration::from_std(backoff).unwrap_or(chrono::Duration::MAX);
            let resume_at = now.checked_add_signed(backoff).unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.resume_at = Some(self.resume_at.map_or(resume_at, |prev| prev.max(resume_at)));
        }
    }

    /// Earliest instant at which upstream may be called again, if throttled.
    #[must_use]
    pub const fn resume_at(&self) -> Option<DateTime<Utc>> {
        self.resume_at
    }

    /// Time to wait from `now` before starting the next cycle.
    #[must_use]
    pub fn delay(&self, now: DateTime<Utc>) -> Duration {
        let backoff = self
            .resume_at
            .and_then(|at| (at - now).to_std().ok())
            .unwrap_or_default();
        self.interval.max(backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_plain_interval() {
        let schedule = ReconcileSchedule::new(Duration::from_secs(5));
        assert_eq!(schedule.delay(t0()), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_longer_than_interval() {
        let mut schedule = ReconcileSchedule::new(Duration::from_secs(5));
        let report = CycleReport {
            rate_limited: Some(Duration::from_secs(60)),
            ..CycleReport::default()
        };
        schedule.record(&report, t0());

        assert_eq!(schedule.delay(t0()), Duration::from_secs(60));
        assert_eq!(
            schedule.delay(t0() + chrono::Duration::seconds(50)),
            Duration::from_secs(10)
        );
        // Backoff elapsed: back to the plain interval.
        assert_eq!(
            schedule.delay(t0() + chrono::Duration::seconds(58)),
            Duration::from_secs(5)
        );
        assert_eq!(
            schedule.delay(t0() + chrono::Duration::seconds(120)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_backoff_shorter_than_interval() {
        let mut schedule = ReconcileSchedule::new(Duration::from_secs(5));
        let report = CycleReport {
            rate_limited: Some(Duration::from_secs(2)),
            ..CycleReport::default()
        };
        schedule.record(&report, t0());
        assert_eq!(schedule.delay(t0()), Duration::from_secs(5));
    }

    #[test]
    fn test_unthrottled_cycle_keeps_pending_backoff() {
        let mut schedule = ReconcileSchedule::new(Duration::from_secs(1));
        schedule.record(
            &CycleReport {
                rate_limited: Some(Duration::from_secs(30)),
                ..CycleReport::default()
            },
            t0(),
        );
        schedule.record(&CycleReport::default(), t0() + chrono::Duration::seconds(1));

        assert_eq!(
            schedule.resume_at(),
            Some(t0() + chrono::Duration::seconds(30))
        );
    }
}

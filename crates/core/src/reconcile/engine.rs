//! The reconciliation engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream;
use loyalty_shared::config::AccrualConfig;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::report::{CycleReport, OrderResult};
use super::schedule::ReconcileSchedule;
use crate::accrual::{AccrualGateway, AccrualOutcome, AccrualReport, UpstreamStatus};
use crate::clock::Clock;
use crate::order::{Order, OrderStatus, OrderStore, SettleOutcome, Settlement};
use crate::store::StoreError;

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause between cycles.
    pub interval: Duration,
    /// Maximum concurrent upstream calls.
    pub workers: usize,
    /// Age after which an open order is reported as stale.
    pub stale_after: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            workers: 4,
            stale_after: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl From<&AccrualConfig> for EngineConfig {
    fn from(config: &AccrualConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            workers: config.workers,
            stale_after: config.stale_after(),
        }
    }
}

/// Set by any worker that sees a rate limit; checked before every fetch.
#[derive(Debug, Default)]
struct Halt {
    tripped: AtomicBool,
    backoff_ms: AtomicU64,
}

impl Halt {
    fn trip(&self, retry_after: Duration) {
        let millis = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX);
        self.backoff_ms.fetch_max(millis, Ordering::AcqRel);
        self.tripped.store(true, Ordering::Release);
    }

    fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    fn backoff(&self) -> Option<Duration> {
        self.is_tripped()
            .then(|| Duration::from_millis(self.backoff_ms.load(Ordering::Acquire)))
    }
}

/// Polls the accrual authority for open orders and applies the verdicts.
pub struct ReconciliationEngine {
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn AccrualGateway>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl ReconciliationEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn AccrualGateway>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            orders,
            gateway,
            clock,
            config,
        }
    }

    /// Runs cycles until `shutdown` is cancelled.
    ///
    /// The first cycle starts immediately. Cancellation is observed between
    /// cycles; a cycle in progress always completes.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            interval = ?self.config.interval,
            workers = self.config.workers,
            "Starting reconciliation engine"
        );

        let mut schedule = ReconcileSchedule::new(self.config.interval);

        while !shutdown.is_cancelled() {
            match self.run_cycle().await {
                Ok(report) => schedule.record(&report, self.clock.now()),
                Err(e) => error!(error = %e, "Failed to load open orders"),
            }

            let delay = schedule.delay(self.clock.now());
            tokio::select! {
                () = shutdown.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        info!("Reconciliation engine stopped");
    }

    /// Runs one pass over all open orders.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only if the open orders cannot be loaded. Failures
    /// for individual orders are logged and counted in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport, StoreError> {
        let open = self.orders.list_open().await?;
        let now = self.clock.now();

        let mut report = CycleReport {
            open: open.len(),
            stale: open.iter().filter(|o| self.is_stale(o, now)).count(),
            ..CycleReport::default()
        };

        if open.is_empty() {
            return Ok(report);
        }

        let halt = Halt::default();
        let results: Vec<OrderResult> = stream::iter(open)
            .map(|order| self.reconcile_order(order, &halt))
            .buffer_unordered(self.config.workers.max(1))
            .collect()
            .await;

        for result in results {
            report.record(result);
        }
        report.rate_limited = halt.backoff();

        if report.finalized > 0 || report.advanced > 0 || report.rate_limited.is_some() {
            info!(
                open = report.open,
                finalized = report.finalized,
                credited = %report.credited,
                advanced = report.advanced,
                halted = report.halted,
                failed = report.failed,
                "Reconciliation cycle finished"
            );
        } else {
            debug!(open = report.open, skipped = report.skipped, "Reconciliation cycle finished");
        }

        Ok(report)
    }

    fn is_stale(&self, order: &Order, now: DateTime<Utc>) -> bool {
        let age = (now - order.uploaded_at).to_std().unwrap_or_default();
        if age > self.config.stale_after {
            warn!(
                order = %order.number,
                user_id = %order.user_id,
                status = %order.status,
                age_secs = age.as_secs(),
                "Order still open past stale threshold"
            );
            true
        } else {
            false
        }
    }

    async fn reconcile_order(&self, order: Order, halt: &Halt) -> OrderResult {
        if halt.is_tripped() {
            return OrderResult::Halted;
        }

        match self.gateway.fetch(&order.number).await {
            AccrualOutcome::Found(report) => self.apply(&order, report).await,
            AccrualOutcome::NotFound => {
                debug!(order = %order.number, "Order not registered upstream yet");
                OrderResult::Skipped
            }
            AccrualOutcome::RateLimited { retry_after } => {
                warn!(
                    order = %order.number,
                    retry_after_secs = retry_after.as_secs(),
                    "Accrual authority rate limit, halting cycle"
                );
                halt.trip(retry_after);
                OrderResult::RateLimited
            }
            AccrualOutcome::TransientFailure { reason } => {
                warn!(order = %order.number, reason = %reason, "Accrual lookup failed");
                OrderResult::Skipped
            }
        }
    }

    async fn apply(&self, order: &Order, report: AccrualReport) -> OrderResult {
        let settlement = match report.status {
            UpstreamStatus::Registered | UpstreamStatus::Processing => {
                return self.advance(order).await;
            }
            UpstreamStatus::Invalid => Settlement::Invalid,
            UpstreamStatus::Processed => {
                let accrual = report.accrual.unwrap_or(Decimal::ZERO);
                if accrual.is_sign_negative() {
                    warn!(order = %order.number, accrual = %accrual, "Negative accrual ignored");
                    return OrderResult::Skipped;
                }
                Settlement::Processed { accrual }
            }
        };

        match self
            .orders
            .settle(&order.number, settlement, self.clock.now())
            .await
        {
            Ok(SettleOutcome::Applied { credited }) => {
                info!(
                    order = %order.number,
                    user_id = %order.user_id,
                    status = %report.status.order_status(),
                    credited = %credited,
                    "Order settled"
                );
                OrderResult::Finalized { credited }
            }
            Ok(SettleOutcome::AlreadyTerminal) => {
                debug!(order = %order.number, "Order already settled");
                OrderResult::Skipped
            }
            Err(e) => {
                error!(order = %order.number, error = %e, "Failed to settle order");
                OrderResult::Failed
            }
        }
    }

    async fn advance(&self, order: &Order) -> OrderResult {
        if order.status != OrderStatus::New {
            return OrderResult::Unchanged;
        }

        match self
            .orders
            .mark_processing(&order.number, self.clock.now())
            .await {
            Ok(true) => {
                debug!(order = %order.number, "Order moved to PROCESSING");
                OrderResult::Advanced
            }
            Ok(false) => OrderResult::Unchanged,
            Err(e) => {
                error!(order = %order.number, error = %e, "Failed to mark order processing");
                OrderResult::Failed
            }
        }
    }
}

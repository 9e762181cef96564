//! Order reconciliation against the accrual authority.
//!
//! A background task calls [`ReconciliationEngine::run_cycle`] at a fixed
//! interval. Each cycle polls every open order once and applies the verdicts:
//!
//! - terminal verdicts settle the order and credit the owner atomically
//! - `REGISTERED`/`PROCESSING` move a `NEW` order to `PROCESSING`
//! - a rate limit halts the remaining upstream calls and pushes back the next cycle

mod engine;
mod report;
mod schedule;

pub use engine::{EngineConfig, ReconciliationEngine};
pub use report::CycleReport;
pub use schedule::ReconcileSchedule;

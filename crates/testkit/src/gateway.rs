use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use loyalty_core::accrual::{AccrualGateway, AccrualOutcome, AccrualReport, UpstreamStatus};
use loyalty_core::order::OrderNumber;
use rust_decimal::Decimal;

use crate::lock;

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<String, VecDeque<AccrualOutcome>>,
    fixed: HashMap<String, AccrualOutcome>,
    calls: Vec<String>,
}

/// Accrual gateway driven by a per-order script.
///
/// Queued outcomes are returned once each, in order; after that the fixed
/// outcome (if any) repeats. Unscripted orders answer `NotFound`.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<Script>,
}

impl ScriptedGateway {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `outcome` for every lookup of `number`.
    pub fn always(&self, number: &str, outcome: AccrualOutcome) {
        lock(&self.script).fixed.insert(number.to_string(), outcome);
    }

    /// Answers `outcome` once for the next lookup of `number`.
    pub fn then(&self, number: &str, outcome: AccrualOutcome) {
        lock(&self.script)
            .queued
            .entry(number.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Convenience for a `PROCESSED` verdict.
    pub fn processed(&self, number: &str, accrual: Decimal) {
        self.always(
            number,
            AccrualOutcome::Found(AccrualReport {
                status: UpstreamStatus::Processed,
                accrual: Some(accrual),
            }),
        );
    }

    /// Order numbers looked up so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        lock(&self.script).calls.clone()
    }

    /// Number of lookups so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.script).calls.len()
    }
}

#[async_trait]
impl AccrualGateway for ScriptedGateway {
    async fn fetch(&self, number: &OrderNumber) -> AccrualOutcome {
        let mut script = lock(&self.script);
        let key = number.as_str().to_string();
        script.calls.push(key.clone());

        if let Some(outcome) = script.queued.get_mut(&key).and_then(VecDeque::pop_front) {
            return outcome;
        }
        script
            .fixed
            .get(&key)
            .cloned()
            .unwrap_or(AccrualOutcome::NotFound)
    }
}

//! Response body of the accrual authority.

use loyalty_core::accrual::{AccrualReport, UpstreamStatus};
use rust_decimal::Decimal;
use serde::Deserialize;

/// `200` body: `{"order": "...", "status": "...", "accrual": 500}`.
///
/// The echoed `order` field is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct AccrualResponse {
    pub status: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub accrual: Option<Decimal>,
}

impl AccrualResponse {
    /// Converts into the domain report. `None` for an unknown status.
    pub(crate) fn into_report(self) -> Option<AccrualReport> {
        UpstreamStatus::from_wire(&self.status).map(|status| AccrualReport {
            status,
            accrual: self.accrual,
        })
    }
}

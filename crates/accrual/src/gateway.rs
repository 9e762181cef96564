//! reqwest-backed accrual gateway.

use std::time::Duration;

use async_trait::async_trait;
use loyalty_core::accrual::{AccrualGateway, AccrualOutcome};
use loyalty_core::order::OrderNumber;
use loyalty_shared::config::AccrualConfig;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::wire::AccrualResponse;

/// Errors raised while building the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The base URL is empty.
    #[error("accrual base URL not configured")]
    MissingBaseUrl,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct HttpAccrualGatewayConfig {
    /// Root URL of the accrual authority, e.g. `http://localhost:8081`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Backoff used when a `429` carries no usable `Retry-After`.
    pub default_retry_after: Duration,
}

impl From<&AccrualConfig> for HttpAccrualGatewayConfig {
    fn from(config: &AccrualConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.request_timeout(),
            default_retry_after: config.default_retry_after(),
        }
    }
}

/// Accrual gateway over HTTP.
///
/// Each lookup is a single request; retrying is the caller's business.
pub struct HttpAccrualGateway {
    client: Client,
    base_url: String,
    default_retry_after: Duration,
}

impl HttpAccrualGateway {
    /// Creates a gateway with its own connection pool.
    pub fn new(config: HttpAccrualGatewayConfig) -> Result<Self, GatewayError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(GatewayError::MissingBaseUrl);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            default_retry_after: config.default_retry_after,
        })
    }

    fn order_url(&self, number: &OrderNumber) -> String {
        format!("{}/api/orders/{}", self.base_url, number)
    }

    fn retry_after(&self, response: &Response) -> Duration {
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(self.default_retry_after, Duration::from_secs)
    }

    async fn classify(&self, number: &OrderNumber, response: Response) -> AccrualOutcome {
        let status = response.status();
        match status {
            StatusCode::OK => match response.json::<AccrualResponse>().await {
                Ok(body) => match body.into_report() {
                    Some(report) => {
                        debug!(order = %number, status = ?report.status, accrual = ?report.accrual, "Accrual found");
                        AccrualOutcome::Found(report)
                    }
                    None => transient(number, "unknown upstream status".to_string()),
                },
                Err(e) => transient(number, format!("undecodable body: {e}")),
            },
            StatusCode::NO_CONTENT => {
                debug!(order = %number, "Order not registered upstream");
                AccrualOutcome::NotFound
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = self.retry_after(&response);
                warn!(order = %number, retry_after_secs = retry_after.as_secs(), "Accrual authority throttled");
                AccrualOutcome::RateLimited { retry_after }
            }
            other => transient(number, format!("HTTP {other}")),
        }
    }
}

fn transient(number: &OrderNumber, reason: String) -> AccrualOutcome {
    warn!(order = %number, reason = %reason, "Accrual lookup failed");
    AccrualOutcome::TransientFailure { reason }
}

#[async_trait]
impl AccrualGateway for HttpAccrualGateway {
    async fn fetch(&self, number: &OrderNumber) -> AccrualOutcome {
        match self.client.get(self.order_url(number)).send().await {
            Ok(response) => self.classify(number, response).await,
            Err(e) if e.is_timeout() => transient(number, "request timed out".to_string()),
            Err(e) => transient(number, format!("request failed: {e}")),
        }
    }
}

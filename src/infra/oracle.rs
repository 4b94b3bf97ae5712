//! Remote price oracle boundary.
//!
//! The oracle is best-effort: a transport failure, a non-2xx status, a
//! `success: false` body, and a missing or implausible price are all the
//! same thing to callers — a trigger for the deterministic estimator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "bazar-ledger/0.1.0";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
}

/// What the oracle is asked to price. Field names match the pricing
/// function's JSON contract.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuoteRequest {
    #[serde(rename = "itemName")]
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// Asynchronous source of price quotes.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> Result<f64, OracleError>;
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for a hosted pricing function.
#[derive(Clone)]
pub struct RemotePriceOracle {
    http: Client,
    endpoint: Url,
    timeout: Duration,
}

impl RemotePriceOracle {
    pub fn new(endpoint: &str) -> Result<Self, OracleError> {
        let endpoint = Url::parse(endpoint)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            endpoint,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl PriceOracle for RemotePriceOracle {
    async fn quote(&self, request: &QuoteRequest) -> Result<f64, OracleError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let envelope: QuoteEnvelope = response.json().await?;

        // Some deployments report failures as 200 OK + success:false.
        if envelope.success == Some(false) {
            return Err(OracleError::Api(
                envelope
                    .error
                    .unwrap_or_else(|| "price generation failed".to_string()),
            ));
        }

        match envelope.price {
            Some(price) if price.is_finite() && price >= 0.0 => Ok(price),
            Some(price) => Err(OracleError::Api(format!("implausible price {price}"))),
            None => Err(OracleError::Api("response missing price".to_string())),
        }
    }
}

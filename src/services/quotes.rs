use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Error)]
pub enum QuoteError {
    #[error("unknown symbol")]
    NotFound,

    #[error("quote source unavailable: {0}")]
    Unavailable(String),

    #[error("quote request timed out")]
    Timeout,
}

/// External source of current prices. Every error is transient and scoped
/// to the single symbol being looked up.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn current_price(&self, symbol: &str) -> Result<f64, QuoteError>;
}

#[derive(Clone)]
pub struct FinnhubQuotes {
    http: Client,
    api_key: String,
}

impl FinnhubQuotes {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[async_trait]
impl PriceOracle for FinnhubQuotes {
    async fn current_price(&self, symbol: &str) -> Result<f64, QuoteError> {
        if !self.has_key() {
            return Err(QuoteError::Unavailable(
                "FINNHUB_API_KEY is missing in .env".to_string(),
            ));
        }

        let url = "https://finnhub.io/api/v1/quote";
        let res = self
            .http
            .get(url)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .timeout(QUOTE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuoteError::Timeout
                } else {
                    QuoteError::Unavailable(e.to_string())
                }
            })?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(QuoteError::NotFound);
        }

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QuoteError::Unavailable(format!(
                "Finnhub quote failed: {status} {body}"
            )));
        }

        let quote = res
            .json::<QuoteResponse>()
            .await
            .map_err(|e| QuoteError::Unavailable(e.to_string()))?;

        // Finnhub answers unknown symbols with an all-zero quote.
        if !quote.c.is_finite() || quote.c <= 0.0 {
            return Err(QuoteError::NotFound);
        }

        Ok(quote.c)
    }
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    // current
    c: f64,
}

use crate::core::config::AwesomeApiConfig;
use crate::core::currency::UsdRateProvider;
use crate::core::error::RateFetchError;
use crate::providers::util::with_retry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// USD quotes from the AwesomeAPI economy endpoint.
///
/// `GET /json/last/{SYMBOL}-USD` answers with an object keyed by
/// `{SYMBOL}USD`; only the `ask` field of that entry is used.
pub struct AwesomeApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl AwesomeApiProvider {
    pub fn new(config: &AwesomeApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxledger/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    async fn fetch_ask(&self, symbol: &str) -> Result<Decimal, RateFetchError> {
        let url = format!(
            "{}/json/last/{}-USD",
            self.base_url,
            symbol.to_uppercase()
        );
        debug!("Requesting USD quote from {}", url);

        let network_error = |message: String| RateFetchError::Network {
            symbol: symbol.to_string(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(format!("Request error: {e}")))?;

        if !response.status().is_success() {
            return Err(network_error(format!("HTTP error: {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| network_error(format!("Failed to read response body: {e}")))?;

        parse_ask(symbol, &body)
    }
}

/// Extracts `body["{SYMBOL}USD"]["ask"]` as an exact decimal. The API keys
/// quotes by the upper-case code whatever case was requested.
pub fn parse_ask(symbol: &str, body: &str) -> Result<Decimal, RateFetchError> {
    let key = format!("{}USD", symbol.to_uppercase());
    let parse_error = |message: String| RateFetchError::Parse {
        symbol: symbol.to_string(),
        message,
    };
    let missing = |field: String| RateFetchError::MissingField {
        symbol: symbol.to_string(),
        field,
    };

    let data: HashMap<String, Value> =
        serde_json::from_str(body).map_err(|e| parse_error(format!("Invalid JSON: {e}")))?;

    let quote = data.get(&key).ok_or_else(|| missing(key.clone()))?;
    let ask = quote
        .as_object()
        .ok_or_else(|| parse_error(format!("Quote {key} is not an object")))?
        .get("ask")
        .ok_or_else(|| missing(format!("{key}.ask")))?;

    let text = match ask {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(parse_error(format!("Ask value is not numeric: {other}"))),
    };

    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(&text)
    } else {
        text.parse::<Decimal>()
    };
    parsed.map_err(|e| parse_error(format!("Ask value {text:?} is not a decimal: {e}")))
}

#[async_trait]
impl UsdRateProvider for AwesomeApiProvider {
    fn name(&self) -> &str {
        "AwesomeAPI"
    }

    #[instrument(name = "AwesomeApiFetch", skip(self), fields(symbol = %symbol))]
    async fn usd_ask(&self, symbol: &str) -> Result<Decimal, RateFetchError> {
        let ask = with_retry(|| self.fetch_ask(symbol), self.retries, self.retry_delay_ms).await?;
        debug!(%ask, "Received USD ask");
        Ok(ask)
    }
}

use std::time::Duration;

use async_trait::async_trait;
use pricewire_core::config::QuotesConfig;
use pricewire_core::{Price, QuoteProvider, Symbol};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum QuoteProviderError {
    #[error("could not build quote provider http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("quote request timed out")]
    Timeout,
    #[error("quote request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("quote provider answered with status {0}")]
    Status(u16),
    #[error("quote provider returned an unreadable body: {0}")]
    InvalidBody(String),
    #[error("quote provider reported an error: {0}")]
    Provider(String),
}

impl QuoteProviderError {
    // reqwest errors carry the request URL, and the URL carries the api key.
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(error.without_url())
        }
    }
}

/// Client for `GET /price?symbol=..&apikey=..`.
#[derive(Clone)]
pub struct TwelveDataClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl TwelveDataClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, QuoteProviderError> {
        let http = Client::builder().timeout(timeout).build().map_err(QuoteProviderError::ClientBuild)?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url, api_key })
    }

    pub fn from_config(config: &QuotesConfig) -> Result<Self, QuoteProviderError> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Single lookup, no retry. `Ok(None)` means the provider answered but had
    /// no usable price for the symbol.
    pub async fn fetch_price(&self, symbol: &Symbol) -> Result<Option<Price>, QuoteProviderError> {
        let response = self
            .http
            .get(format!("{}/price", self.base_url))
            .query(&[("symbol", symbol.as_str()), ("apikey", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(QuoteProviderError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteProviderError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(QuoteProviderError::from_reqwest)?;
        let payload: Value = serde_json::from_slice(&body)
            .map_err(|error| QuoteProviderError::InvalidBody(error.to_string()))?;
        debug!(
            event_name = "quotes.lookup.response",
            symbol = %symbol,
            payload = %payload,
            "quote provider responded"
        );

        price_from_payload(&payload)
    }
}

#[async_trait]
impl QuoteProvider for TwelveDataClient {
    async fn latest_price(&self, symbol: &Symbol) -> Option<Price> {
        match self.fetch_price(symbol).await {
            Ok(Some(price)) => Some(price),
            Ok(None) => {
                info!(
                    event_name = "quotes.lookup.no_price",
                    symbol = %symbol,
                    "quote provider returned no price for symbol"
                );
                None
            }
            Err(error) => {
                warn!(
                    event_name = "quotes.lookup.failed",
                    symbol = %symbol,
                    error = %error,
                    "quote lookup failed; treating symbol as not found"
                );
                None
            }
        }
    }
}

fn price_from_payload(payload: &Value) -> Result<Option<Price>, QuoteProviderError> {
    if payload.get("status").and_then(Value::as_str) == Some("error") {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message")
            .to_owned();
        return Err(QuoteProviderError::Provider(message));
    }

    Ok(match payload.get("price") {
        Some(Value::Number(number)) => number.as_f64().and_then(Price::new),
        Some(Value::String(raw)) => Price::parse(raw),
        _ => None,
    })
}

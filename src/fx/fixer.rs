//! fixer.io historical rate source
//!
//! `GET {base_url}/{YYYY-MM-DD}?access_key=...&base=USD&symbols=SGD`

use super::base::{CurrencyPair, RateSource};
use crate::config::RatesConfig;
use crate::error::{ExchangeError, RateFetchError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

/// Historical rate client for the fixer.io API
#[derive(Debug, Clone)]
pub struct FixerRateSource {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct FixerResponse {
    success: Option<bool>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    error: Option<FixerApiError>,
}

#[derive(Debug, Deserialize)]
struct FixerApiError {
    code: i64,
    #[serde(rename = "type", default)]
    kind: String,
    info: Option<String>,
}

impl FixerRateSource {
    /// Create a new fixer.io source. No request timeout is set; the
    /// transport default applies.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ExchangeError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client,
        })
    }

    pub fn from_config(config: &RatesConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            log::warn!("No rate API key configured; rate lookups will fail");
        }
        Self::new(config.api_key.clone(), config.base_url.clone())
    }

    fn endpoint(&self, date: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), api_date(date))
    }
}

impl RateSource for FixerRateSource {
    async fn historical_rate(
        &self,
        date: &str,
        pair: CurrencyPair,
    ) -> std::result::Result<f64, RateFetchError> {
        let url = self.endpoint(date);
        log::debug!("Requesting {} rate for {} from {}", pair, date, url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("base", pair.base.as_str()),
                ("symbols", pair.target.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RateFetchError::ConnectionFailure(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateFetchError::ResponseFailure(format!(
                "fixer.io returned status {}",
                status
            )));
        }

        let data: FixerResponse = response.json().await.map_err(|e| {
            RateFetchError::ResponseFailure(format!(
                "Failed to parse response: {}",
                e.without_url()
            ))
        })?;

        data.into_rate(pair)
    }

    fn name(&self) -> &str {
        "fixer.io"
    }
}

impl FixerResponse {
    fn into_rate(self, pair: CurrencyPair) -> std::result::Result<f64, RateFetchError> {
        if let Some(error) = self.error {
            return Err(RateFetchError::ResponseFailure(format!(
                "fixer.io error {} ({}): {}",
                error.code,
                error.kind,
                error.info.unwrap_or_default()
            )));
        }
        if self.success == Some(false) {
            return Err(RateFetchError::ResponseFailure(
                "fixer.io reported an unsuccessful request".to_string(),
            ));
        }

        self.rates
            .get(pair.target.as_str())
            .copied()
            .ok_or_else(|| {
                RateFetchError::ResponseFailure(format!("No {} rate in response", pair.target))
            })
    }
}

/// Extract the target rate from a fixer.io JSON body
pub fn parse_response(body: &str, pair: CurrencyPair) -> std::result::Result<f64, RateFetchError> {
    let data: FixerResponse = serde_json::from_str(body)
        .map_err(|e| RateFetchError::ResponseFailure(format!("JSON parse error: {}", e)))?;
    data.into_rate(pair)
}

/// Normalize a stored date to the `YYYY-MM-DD` form the API expects.
///
/// Accepts `YYYYMMDD`, `MM/DD/YY`, `MM/DD/YYYY` and `YYYY-MM-DD`; anything
/// else is passed through unchanged and left for the API to reject.
pub fn api_date(date: &str) -> String {
    let date = date.trim();

    let parsed = if date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()) {
        NaiveDate::parse_from_str(
            &format!("{}-{}-{}", &date[0..4], &date[4..6], &date[6..8]),
            "%Y-%m-%d",
        )
        .ok()
    } else {
        ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
    };

    match parsed {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => date.to_string(),
    }
}

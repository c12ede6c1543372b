//! Exchange rates from an exchangerate-api compatible endpoint.
//!
//! Rates are fetched once per base currency and then reused until someone
//! asks for a refresh explicitly.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

use crate::{config::AppConfig, models::currency::Currency};

#[derive(Debug, Error)]
pub enum RatesError {
    #[error("Currency conversion is not configured.")]
    NotConfigured,
    #[error("exchange rate request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("exchange rate service error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRates {
    pub base: Currency,
    /// Units of each currency per one unit of `base`.
    pub rates: BTreeMap<Currency, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRates {
    pub fn new(base: Currency, rates: impl IntoIterator<Item = (Currency, f64)>) -> Self {
        let mut rates: BTreeMap<Currency, f64> = rates.into_iter().collect();
        rates.insert(base, 1.0);
        Self {
            base,
            rates,
            fetched_at: Utc::now(),
        }
    }

    pub fn rate(&self, currency: Currency) -> Option<f64> {
        if currency == self.base {
            return Some(1.0);
        }
        self.rates.get(&currency).copied()
    }

    /// `None` when either currency has no rate in this snapshot.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> Option<f64> {
        if from == to {
            return Some(amount);
        }
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        Some(amount / from_rate * to_rate)
    }

    fn from_response(base: Currency, response: RatesResponse) -> Result<Self, RatesError> {
        if response.result != "success" {
            return Err(RatesError::Api(
                response
                    .error_type
                    .unwrap_or_else(|| "Failed to fetch rates".to_string()),
            ));
        }
        let supported = response
            .conversion_rates
            .into_iter()
            .filter_map(|(code, rate)| Some((code.parse::<Currency>().ok()?, rate)))
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0);
        Ok(Self::new(base, supported))
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    result: String,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[derive(Clone)]
pub struct RateService {
    client: reqwest::Client,
    api_base: Url,
    api_key: Option<String>,
    cache: Arc<RwLock<HashMap<Currency, ExchangeRates>>>,
}

impl RateService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(
            reqwest::Client::new(),
            config.exchange_rate_api_base.clone(),
            config.exchange_rate_api_key.clone(),
        )
    }

    pub fn with_client(client: reqwest::Client, api_base: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            api_base,
            api_key,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Cached rates for `base`, fetching them on first use.
    pub async fn rates(&self, base: Currency) -> Result<ExchangeRates, RatesError> {
        if let Some(rates) = self.cache.read().await.get(&base) {
            return Ok(rates.clone());
        }
        self.refresh(base).await
    }

    /// Fetches a new snapshot. A failed refresh forgets the old one.
    pub async fn refresh(&self, base: Currency) -> Result<ExchangeRates, RatesError> {
        let result = self.fetch(base).await;
        let mut cache = self.cache.write().await;
        match &result {
            Ok(rates) => {
                cache.insert(base, rates.clone());
            }
            Err(err) => {
                warn!(base = %base, error = %err, "exchange rate fetch failed");
                cache.remove(&base);
            }
        }
        result
    }

    pub async fn convert(
        &self,
        amount: f64,
        from: Currency,
        to: Currency,
    ) -> Result<Option<f64>, RatesError> {
        if from == to {
            return Ok(Some(amount));
        }
        Ok(self.rates(from).await?.convert(amount, from, to))
    }

    async fn fetch(&self, base: Currency) -> Result<ExchangeRates, RatesError> {
        let api_key = self.api_key.as_deref().ok_or(RatesError::NotConfigured)?;
        let url = format!(
            "{}/{}/latest/{}",
            self.api_base.as_str().trim_end_matches('/'),
            api_key,
            base
        );
        let response: RatesResponse = self.client.get(url).send().await?.json().await?;
        let rates = ExchangeRates::from_response(base, response)?;
        info!(base = %base, count = rates.rates.len(), "fetched exchange rates");
        Ok(rates)
    }
}

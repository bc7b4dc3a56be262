//! Offers API client.
//!
//! Fetches the current offer list from Cuelinks. Failures are returned to
//! the caller; the runner decides what a failed fetch means for the run.

use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer};
use tracing::{debug, info, Instrument};

use crate::config::OffersApiConfig;
use crate::errors::{AppError, AppResult};
use crate::observability::{fetch_span, record_fetch_metrics};

/// A promotional deal as returned by the offers API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Offer {
    #[serde(default, deserialize_with = "deserialize_offer_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl Offer {
    /// Offer id, if present and non-blank
    pub fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    /// Merchant name, empty when missing
    pub fn merchant(&self) -> &str {
        non_empty(&self.merchant_name).unwrap_or("")
    }

    /// Tracking URL, falling back to the plain link
    pub fn call_to_action_url(&self) -> &str {
        non_empty(&self.tracking_url)
            .or_else(|| non_empty(&self.link))
            .unwrap_or("")
    }

    /// Offer image, falling back to the merchant logo
    pub fn image_url(&self) -> Option<&str> {
        non_empty(&self.image).or_else(|| non_empty(&self.logo))
    }
}

/// Ids arrive as strings or numbers depending on the offer
fn deserialize_offer_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    offers: Vec<Offer>,
}

/// Anything that can produce a batch of offers
#[allow(async_fn_in_trait)]
pub trait OfferSource {
    /// Fetch at most `limit` offers, in provider order
    async fn fetch(&self, limit: usize) -> AppResult<Vec<Offer>>;
}

/// Cuelinks offers API client
#[derive(Debug, Clone)]
pub struct CuelinksClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl CuelinksClient {
    /// Build a client with the configured timeout
    pub fn new(config: &OffersApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        })
    }

    fn authorization(&self) -> String {
        format!("Token token=\"{}\"", self.token)
    }

    async fn request(&self) -> AppResult<OffersResponse> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Offers request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Offers API returned status {}",
                status
            )));
        }

        response
            .json::<OffersResponse>()
            .await
            .map_err(|e| AppError::Network(format!("Invalid offers response body: {}", e)))
    }
}

impl OfferSource for CuelinksClient {
    async fn fetch(&self, limit: usize) -> AppResult<Vec<Offer>> {
        let start = Instant::now();
        let result = self
            .request()
            .instrument(fetch_span(&self.endpoint, limit))
            .await;

        match result {
            Ok(body) => {
                let total = body.offers.len();
                let offers: Vec<Offer> = body.offers.into_iter().take(limit).collect();
                record_fetch_metrics(true, start.elapsed(), offers.len());
                info!(
                    received = total,
                    kept = offers.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Fetched offers"
                );
                Ok(offers)
            }
            Err(e) => {
                record_fetch_metrics(false, start.elapsed(), 0);
                debug!(error = %e, "Offer fetch failed");
                Err(e)
            }
        }
    }
}

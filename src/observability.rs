//! Observability setup for the poster run.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Spans for each pipeline stage
//! - Metrics recording through the `metrics` facade

use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize structured logging from the environment
pub fn init_tracing() -> Result<()> {
    init_tracing_with_config(&ObservabilityConfig::from_env())
}

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("offer_poster={}", config.log_level.to_lowercase()).parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("teloxide=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    if config.use_pretty_format() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Create a span for the offers API call
pub fn fetch_span(endpoint: &str, limit: usize) -> tracing::Span {
    tracing::info_span!(
        "offer_fetch",
        endpoint = endpoint,
        limit = limit,
        component = "offers_api"
    )
}

/// Create a span for posted-offer store operations
pub fn store_span(operation: &str) -> tracing::Span {
    tracing::debug_span!("store_operation", operation = operation, component = "database")
}

/// Create a span for Telegram publish operations
pub fn telegram_span(operation: &str) -> tracing::Span {
    tracing::info_span!("telegram_operation", operation = operation, component = "telegram")
}

/// Create a span covering the handling of one offer
pub fn offer_span(offer_id: &str, merchant: &str) -> tracing::Span {
    tracing::info_span!("offer", offer_id = offer_id, merchant = merchant)
}

/// What happened to one offer during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    Posted,
    Failed,
    SkippedMerchant,
    SkippedDuplicate,
    SkippedInvalid,
}

impl OfferOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferOutcome::Posted => "posted",
            OfferOutcome::Failed => "failed",
            OfferOutcome::SkippedMerchant => "skipped_merchant",
            OfferOutcome::SkippedDuplicate => "skipped_duplicate",
            OfferOutcome::SkippedInvalid => "skipped_invalid",
        }
    }
}

/// Record offers API call metrics
pub fn record_fetch_metrics(success: bool, duration: Duration, offer_count: usize) {
    metrics::counter!("offer_fetch_total", "result" => if success { "success" } else { "failure" })
        .increment(1);
    metrics::histogram!("offer_fetch_duration_seconds").record(duration.as_secs_f64());
    metrics::counter!("offers_fetched_total").increment(offer_count as u64);
}

/// Record the outcome of a single offer
pub fn record_offer_outcome(outcome: OfferOutcome) {
    metrics::counter!("offer_outcomes_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record Telegram publish metrics
pub fn record_publish_metrics(with_image: bool, success: bool, duration: Duration) {
    let kind = if with_image { "photo" } else { "text" };
    let result = if success { "success" } else { "failure" };
    metrics::counter!("telegram_publish_total", "kind" => kind, "result" => result).increment(1);
    metrics::histogram!("telegram_publish_duration_seconds").record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels_are_distinct() {
        let outcomes = [
            OfferOutcome::Posted,
            OfferOutcome::Failed,
            OfferOutcome::SkippedMerchant,
            OfferOutcome::SkippedDuplicate,
            OfferOutcome::SkippedInvalid,
        ];
        let mut labels: Vec<_> = outcomes.iter().map(|o| o.as_str()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), outcomes.len());
    }

    #[test]
    fn test_metrics_without_recorder_are_noops() {
        record_fetch_metrics(true, Duration::from_millis(5), 3);
        record_offer_outcome(OfferOutcome::Posted);
        record_publish_metrics(false, true, Duration::from_millis(1));
    }
}

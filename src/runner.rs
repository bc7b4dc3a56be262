//! # Single-pass offer run
//!
//! Fetches one batch of offers and walks it in provider order:
//!
//! ```text
//! offer ─► merchant preferred? ─► has id? ─► not yet posted? ─► publish
//!                                                                 │
//!                          ok: record id, count, cap? stop : sleep │
//!                          err: leave unrecorded, abort after N in a row
//! ```
//!
//! Only offers whose publish succeeded are recorded, so a failed post stays
//! eligible for the next run.

use std::time::Duration;

use tracing::{info, warn, Instrument};

use crate::config::AppConfig;
use crate::db::PostedStore;
use crate::errors::{error_logging, AppResult};
use crate::filter::MerchantFilter;
use crate::format::format_offer;
use crate::observability::{offer_span, record_offer_outcome, OfferOutcome};
use crate::offers::OfferSource;
use crate::publisher::Publisher;

/// Knobs for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Maximum offers published in one run
    pub max_posts: usize,
    /// Maximum offers requested from the source
    pub fetch_limit: usize,
    /// Pause after each successful publish, unless the cap was just reached
    pub post_delay: Duration,
    /// Consecutive publish failures that end the run
    pub max_consecutive_failures: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_posts: 5,
            fetch_limit: 50,
            post_delay: Duration::from_secs(2),
            max_consecutive_failures: 3,
        }
    }
}

impl From<&AppConfig> for RunSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_posts: config.run.max_posts,
            fetch_limit: config.offers.fetch_limit,
            post_delay: Duration::from_secs(config.run.post_delay_secs),
            max_consecutive_failures: config.run.max_consecutive_failures,
        }
    }
}

/// What one run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub skipped_invalid: usize,
    pub skipped_merchant: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
    pub posted: usize,
    /// The source returned an error; the run proceeded with no offers
    pub fetch_failed: bool,
    /// The post cap ended the run
    pub cap_reached: bool,
    /// Too many consecutive publish failures ended the run
    pub aborted: bool,
}

/// Run the pipeline once.
///
/// A failed fetch is logged and treated as an empty batch. Store errors
/// propagate.
pub async fn run_once<S, P>(
    source: &S,
    store: &PostedStore,
    filter: &dyn MerchantFilter,
    publisher: &P,
    settings: &RunSettings,
) -> AppResult<RunSummary>
where
    S: OfferSource,
    P: Publisher,
{
    let mut summary = RunSummary::default();

    let offers = match source.fetch(settings.fetch_limit).await {
        Ok(offers) => offers,
        Err(e) => {
            error_logging::log_network_error(&e, "fetch_offers", None, Some(1));
            summary.fetch_failed = true;
            Vec::new()
        }
    };
    summary.fetched = offers.len();

    let mut consecutive_failures: u32 = 0;

    for offer in &offers {
        if !filter.accepts(offer) {
            summary.skipped_merchant += 1;
            record_offer_outcome(OfferOutcome::SkippedMerchant);
            continue;
        }

        let Some(offer_id) = offer.id() else {
            warn!(merchant = %offer.merchant(), "Skipping offer without id");
            summary.skipped_invalid += 1;
            record_offer_outcome(OfferOutcome::SkippedInvalid);
            continue;
        };

        let already_posted = store.contains(offer_id).await.inspect_err(|e| {
            error_logging::log_database_error(e, "contains", Some(offer_id));
        })?;
        if already_posted {
            summary.skipped_duplicate += 1;
            record_offer_outcome(OfferOutcome::SkippedDuplicate);
            continue;
        }

        let message = format_offer(offer);
        let image_url = offer.image_url();

        let published = publisher
            .publish(&message, image_url)
            .instrument(offer_span(offer_id, offer.merchant()))
            .await;

        match published {
            Ok(()) => {
                store.record(offer_id).await.inspect_err(|e| {
                    error_logging::log_database_error(e, "record", Some(offer_id));
                })?;
                summary.posted += 1;
                consecutive_failures = 0;
                record_offer_outcome(OfferOutcome::Posted);
                info!(
                    offer_id = %offer_id,
                    merchant = %offer.merchant(),
                    with_image = image_url.is_some(),
                    posted = summary.posted,
                    "Offer posted"
                );

                if summary.posted >= settings.max_posts {
                    summary.cap_reached = true;
                    break;
                }

                if !settings.post_delay.is_zero() {
                    tokio::time::sleep(settings.post_delay).await;
                }
            }
            Err(e) => {
                summary.failed += 1;
                consecutive_failures += 1;
                record_offer_outcome(OfferOutcome::Failed);
                error_logging::log_publish_error(
                    &e,
                    offer_id,
                    offer.merchant(),
                    image_url.is_some(),
                    consecutive_failures,
                );

                if consecutive_failures >= settings.max_consecutive_failures {
                    warn!(
                        consecutive_failures,
                        "Too many consecutive publish failures, ending run"
                    );
                    summary.aborted = true;
                    break;
                }
            }
        }
    }

    info!(
        fetched = summary.fetched,
        posted = summary.posted,
        failed = summary.failed,
        skipped_merchant = summary.skipped_merchant,
        skipped_duplicate = summary.skipped_duplicate,
        skipped_invalid = summary.skipped_invalid,
        fetch_failed = summary.fetch_failed,
        cap_reached = summary.cap_reached,
        aborted = summary.aborted,
        "Run finished"
    );

    Ok(summary)
}

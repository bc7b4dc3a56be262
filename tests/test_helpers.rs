//! # Test Helper Library
//!
//! Shared fixtures for the integration tests: throwaway stores, offer
//! builders, and in-memory `OfferSource` / `Publisher` implementations.

#![allow(dead_code)]

use std::sync::Mutex;

use offer_poster::db::PostedStore;
use offer_poster::errors::{AppError, AppResult};
use offer_poster::offers::{Offer, OfferSource};
use offer_poster::publisher::Publisher;
use tempfile::TempDir;

/// Open a file-backed store in a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub async fn temp_store() -> (PostedStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("posted_offers.db");
    let store = PostedStore::open(path.to_str().expect("utf-8 temp path"))
        .await
        .expect("Failed to open store");
    (store, dir)
}

/// Build an offer with an id and merchant
pub fn offer(id: &str, merchant: &str) -> Offer {
    Offer {
        id: Some(id.to_string()),
        merchant_name: Some(merchant.to_string()),
        ..Default::default()
    }
}

/// Build an offer with a title and tracking link
pub fn titled_offer(id: &str, merchant: &str, title: &str) -> Offer {
    Offer {
        title: Some(title.to_string()),
        tracking_url: Some(format!("https://track.example.com/{}", id)),
        ..offer(id, merchant)
    }
}

/// Source returning a fixed batch, or a fixed error
pub struct StaticSource {
    result: AppResult<Vec<Offer>>,
    requested_limits: Mutex<Vec<usize>>,
}

impl StaticSource {
    pub fn with_offers(offers: Vec<Offer>) -> Self {
        Self {
            result: Ok(offers),
            requested_limits: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AppError) -> Self {
        Self {
            result: Err(error),
            requested_limits: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_limits(&self) -> Vec<usize> {
        self.requested_limits.lock().unwrap().clone()
    }
}

impl OfferSource for StaticSource {
    async fn fetch(&self, limit: usize) -> AppResult<Vec<Offer>> {
        self.requested_limits.lock().unwrap().push(limit);
        self.result
            .clone()
            .map(|offers| offers.into_iter().take(limit).collect())
    }
}

/// One publish call as seen by [`RecordingPublisher`]
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedPost {
    pub text: String,
    pub image_url: Option<String>,
}

/// Publisher that records every call and fails on demand
#[derive(Default)]
pub struct RecordingPublisher {
    posts: Mutex<Vec<PublishedPost>>,
    fail_when_text_contains: Option<String>,
    always_fail: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every post whose text contains `needle`
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_when_text_contains: Some(needle.to_string()),
            ..Self::default()
        }
    }

    pub fn always_failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    pub fn posts(&self) -> Vec<PublishedPost> {
        self.posts.lock().unwrap().clone()
    }
}

impl Publisher for RecordingPublisher {
    async fn publish(&self, text: &str, image_url: Option<&str>) -> AppResult<()> {
        self.posts.lock().unwrap().push(PublishedPost {
            text: text.to_string(),
            image_url: image_url.map(str::to_string),
        });

        let should_fail = self.always_fail
            || self
                .fail_when_text_contains
                .as_deref()
                .is_some_and(|needle| text.contains(needle));

        if should_fail {
            return Err(AppError::Telegram("Bad Request: chat not found".to_string()));
        }
        Ok(())
    }
}

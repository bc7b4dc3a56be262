//! # Offer Poster
//!
//! A batch job that pulls affiliate offers from the Cuelinks API, keeps the
//! ones from preferred merchants, and posts each new offer once to a
//! Telegram channel, remembering what it posted in a local SQLite file.

pub mod config;
pub mod db;
pub mod errors;
pub mod filter;
pub mod format;
pub mod observability;
pub mod observability_config;
pub mod offers;
pub mod publisher;
pub mod runner;

// Re-export types for easier access
pub use offers::{Offer, OfferSource};
pub use publisher::Publisher;
pub use runner::{run_once, RunSettings, RunSummary};

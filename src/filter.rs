//! Merchant filtering strategies.

use regex::Regex;

use crate::config::FilterConfig;
use crate::errors::AppResult;
use crate::offers::Offer;

/// Decides whether an offer's merchant is worth posting
pub trait MerchantFilter {
    /// `merchant` is already lowercased and non-empty
    fn matches(&self, merchant: &str) -> bool;

    /// Offers without a merchant name never pass
    fn accepts(&self, offer: &Offer) -> bool {
        let merchant = offer.merchant();
        if merchant.is_empty() {
            return false;
        }
        self.matches(&merchant.to_lowercase())
    }
}

/// Unanchored substring match against an allow-list
#[derive(Debug, Clone)]
pub struct PreferredSites {
    sites: Vec<String>,
}

impl PreferredSites {
    pub fn new<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sites: sites
                .into_iter()
                .map(|site| site.as_ref().trim().to_lowercase())
                .filter(|site| !site.is_empty())
                .collect(),
        }
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }
}

impl MerchantFilter for PreferredSites {
    fn matches(&self, merchant: &str) -> bool {
        self.sites.iter().any(|site| merchant.contains(site.as_str()))
    }
}

/// Regex match against the lowercased merchant name
#[derive(Debug, Clone)]
pub struct MerchantPattern {
    pattern: Regex,
}

impl MerchantPattern {
    pub fn new(pattern: &str) -> AppResult<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl MerchantFilter for MerchantPattern {
    fn matches(&self, merchant: &str) -> bool {
        self.pattern.is_match(merchant)
    }
}

/// Build the filter selected by the configuration
pub fn from_config(config: &FilterConfig) -> AppResult<Box<dyn MerchantFilter>> {
    match &config.merchant_pattern {
        Some(pattern) => Ok(Box::new(MerchantPattern::new(pattern)?)),
        None => Ok(Box::new(PreferredSites::new(&config.preferred_sites))),
    }
}

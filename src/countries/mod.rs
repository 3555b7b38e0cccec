//! Country dial-code lookup for the phone sign-in screen
//!
//! Countries come from a remote provider with retries. If every attempt
//! fails the built-in short list is served instead, so the picker always
//! has something to show.

mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;

pub use rest::RestCountriesProvider;

/// Result type for country lookups
pub type CountryResult<T> = Result<T, CountryLookupError>;

/// Errors that can occur while fetching the country list
#[derive(Debug, thiserror::Error)]
pub enum CountryLookupError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Response parsing failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub name: String,
    pub dial_code: String,
    /// ISO 3166-1 alpha-2
    pub code: String,
    pub flag: String,
}

impl Country {
    fn new(name: &str, dial_code: &str, code: &str, flag: &str) -> Self {
        Self {
            name: name.to_string(),
            dial_code: dial_code.to_string(),
            code: code.to_string(),
            flag: flag.to_string(),
        }
    }
}

/// Served when the remote list can't be loaded
pub fn default_countries() -> Vec<Country> {
    vec![
        Country::new("United States", "+1", "US", "🇺🇸"),
        Country::new("United Kingdom", "+44", "GB", "🇬🇧"),
        Country::new("Canada", "+1", "CA", "🇨🇦"),
        Country::new("Australia", "+61", "AU", "🇦🇺"),
        Country::new("Germany", "+49", "DE", "🇩🇪"),
        Country::new("France", "+33", "FR", "🇫🇷"),
        Country::new("Italy", "+39", "IT", "🇮🇹"),
        Country::new("Spain", "+34", "ES", "🇪🇸"),
        Country::new("Japan", "+81", "JP", "🇯🇵"),
        Country::new("China", "+86", "CN", "🇨🇳"),
        Country::new("India", "+91", "IN", "🇮🇳"),
        Country::new("Brazil", "+55", "BR", "🇧🇷"),
    ]
}

/// Case-insensitive name match, or substring of the dial code
pub fn filter_countries(countries: &[Country], query: &str) -> Vec<Country> {
    let query = query.trim();
    if query.is_empty() {
        return countries.to_vec();
    }
    let needle = query.to_lowercase();
    countries
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle) || c.dial_code.contains(query))
        .cloned()
        .collect()
}

/// Trait that all country sources must implement
#[async_trait]
pub trait DialCodeProvider: Send + Sync {
    async fn fetch_countries(&self) -> CountryResult<Vec<Country>>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Fixed list, for offline use and tests
pub struct StaticProvider {
    countries: Vec<Country>,
}

impl StaticProvider {
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }
}

#[async_trait]
impl DialCodeProvider for StaticProvider {
    async fn fetch_countries(&self) -> CountryResult<Vec<Country>> {
        Ok(self.countries.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryListing {
    pub countries: Vec<Country>,
    pub source: ListingSource,
    /// Set when the fallback list is being served
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

const FALLBACK_MESSAGE: &str = "Failed to load countries. Please try again.";

/// Retrying, caching front for a [`DialCodeProvider`]
pub struct CountryDirectory {
    provider: Box<dyn DialCodeProvider>,
    max_retries: u32,
    retry_delay: Duration,
    cache: RwLock<Option<Vec<Country>>>,
}

impl CountryDirectory {
    pub fn new(provider: Box<dyn DialCodeProvider>, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            provider,
            max_retries,
            retry_delay,
            cache: RwLock::new(None),
        }
    }

    /// Cached list if we have one, otherwise fetch
    pub async fn load(&self) -> CountryListing {
        if let Some(countries) = self.cache.read().await.clone() {
            return CountryListing {
                countries,
                source: ListingSource::Remote,
                error: None,
            };
        }
        self.fetch_with_retries().await
    }

    /// Drop the cache and fetch again (the picker's retry button)
    pub async fn refresh(&self) -> CountryListing {
        *self.cache.write().await = None;
        self.fetch_with_retries().await
    }

    pub async fn search(&self, query: &str) -> CountryListing {
        let mut listing = self.load().await;
        listing.countries = filter_countries(&listing.countries, query);
        listing
    }

    async fn fetch_with_retries(&self) -> CountryListing {
        for attempt in 0..=self.max_retries {
            match self.provider.fetch_countries().await {
                Ok(countries) if !countries.is_empty() => {
                    tracing::info!(
                        "Loaded {} countries from {}",
                        countries.len(),
                        self.provider.name()
                    );
                    *self.cache.write().await = Some(countries.clone());
                    return CountryListing {
                        countries,
                        source: ListingSource::Remote,
                        error: None,
                    };
                }
                Ok(_) => {
                    tracing::warn!(
                        "Provider {} returned no countries (attempt {})",
                        self.provider.name(),
                        attempt + 1
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Provider {} failed (attempt {}): {}",
                        self.provider.name(),
                        attempt + 1,
                        e
                    );
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        tracing::error!("Country lookup failed, serving built-in list");
        CountryListing {
            countries: default_countries(),
            source: ListingSource::Fallback,
            error: Some(FALLBACK_MESSAGE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails a fixed number of times before succeeding
    struct FlakyProvider {
        calls: Arc<AtomicU32>,
        failures: u32,
    }

    #[async_trait]
    impl DialCodeProvider for FlakyProvider {
        async fn fetch_countries(&self) -> CountryResult<Vec<Country>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(CountryLookupError::Status(503))
            } else {
                Ok(vec![Country::new("Norway", "+47", "NO", "🇳🇴")])
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn flaky(failures: u32, max_retries: u32) -> (CountryDirectory, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let provider = FlakyProvider {
            calls: calls.clone(),
            failures,
        };
        let directory = CountryDirectory::new(Box::new(provider), max_retries, Duration::ZERO);
        (directory, calls)
    }

    #[test]
    fn test_filter_by_name_and_code() {
        let countries = default_countries();

        let by_name = filter_countries(&countries, "united");
        assert_eq!(by_name.len(), 2);

        let by_code = filter_countries(&countries, "+1");
        let codes: Vec<_> = by_code.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["US", "CA"]);

        let by_digit = filter_countries(&countries, "49");
        assert_eq!(by_digit.len(), 1);
        assert_eq!(by_digit[0].name, "Germany");

        assert_eq!(filter_countries(&countries, "  ").len(), countries.len());
        assert!(filter_countries(&countries, "atlantis").is_empty());
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let (directory, calls) = flaky(2, 3);
        let listing = directory.load().await;

        assert_eq!(listing.source, ListingSource::Remote);
        assert_eq!(listing.countries[0].code, "NO");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(listing.error.is_none());
    }

    #[tokio::test]
    async fn test_falls_back_after_max_retries() {
        let (directory, calls) = flaky(10, 3);
        let listing = directory.load().await;

        // One attempt plus three retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(listing.source, ListingSource::Fallback);
        assert_eq!(listing.countries, default_countries());
        assert_eq!(listing.error.as_deref(), Some(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_success_is_cached_until_refresh() {
        let (directory, calls) = flaky(0, 0);
        directory.load().await;
        directory.load().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        directory.refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_search_static_provider() {
        let directory = CountryDirectory::new(
            Box::new(StaticProvider::new(default_countries())),
            0,
            Duration::ZERO,
        );
        let listing = directory.search("jap").await;
        assert_eq!(listing.countries.len(), 1);
        assert_eq!(listing.countries[0].dial_code, "+81");
    }
}

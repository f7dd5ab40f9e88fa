//! Locator-based specification fetching.
//!
//! Locators starting with `http` are downloaded; anything else is read
//! from the filesystem.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;

use super::SpecSource;
use crate::config::FetchSettings;
use crate::domain::SpecificationText;

/// Fetches specifications over HTTP(S) or from local files
pub struct LocatorFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for LocatorFetcher {
    fn default() -> Self {
        Self::new(&FetchSettings::default())
    }
}

impl LocatorFetcher {
    pub fn new(settings: &FetchSettings) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }

    async fn fetch_url(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("HTTP error reading {}: {}", url, e);
                return None;
            }
        };

        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Failed to decode {}: {}", url, e);
                None
            }
        }
    }

    async fn fetch_path(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl SpecSource for LocatorFetcher {
    fn name(&self) -> &str {
        "locator"
    }

    async fn fetch(&self, locator: &str) -> Option<SpecificationText> {
        let locator = locator.trim();
        if locator.is_empty() {
            tracing::debug!(source = self.name(), "Empty locator, nothing to fetch");
            return None;
        }

        let text = if locator.starts_with("http") {
            self.fetch_url(locator).await?
        } else {
            self.fetch_path(Path::new(locator)).await?
        };

        tracing::debug!(source = self.name(), %locator, bytes = text.len(), "Fetched specification");
        Some(SpecificationText::new(locator, text))
    }
}

//! Adapter interfaces for external systems.
//!
//! The mapping core never performs I/O itself. Adapters resolve a
//! specification locator (URL or filesystem path) to its text.

pub mod fetch;

use async_trait::async_trait;

use crate::domain::SpecificationText;

// Re-export the locator fetcher
pub use fetch::LocatorFetcher;

/// Source of specification text, keyed by locator
#[async_trait]
pub trait SpecSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Read the text behind `locator`.
    ///
    /// Failures are not errors: an unreadable specification yields `None`,
    /// and callers render a placeholder instead of coverage.
    async fn fetch(&self, locator: &str) -> Option<SpecificationText>;
}

//! Port for the decorative drawer headline.

use async_trait::async_trait;

use crate::feed::error::SourceResult;

/// Source of a short text shown as the navigation drawer title.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Fetches one headline.
    ///
    /// # Errors
    ///
    /// Returns [`crate::feed::error::SourceError`] when the headline service
    /// cannot be reached.
    async fn fetch_headline(&self) -> SourceResult<String>;
}

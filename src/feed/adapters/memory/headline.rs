//! Fixed headline source.

use async_trait::async_trait;

use crate::feed::{
    error::{SourceError, SourceResult},
    ports::HeadlineSource,
};

/// [`HeadlineSource`] that always answers with the same outcome.
#[derive(Debug, Clone)]
pub struct StaticHeadlineSource {
    outcome: SourceResult<String>,
}

impl StaticHeadlineSource {
    /// Creates a source that always returns `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
        }
    }

    /// Creates a source that always fails with `error`.
    #[must_use]
    pub const fn failing(error: SourceError) -> Self {
        Self { outcome: Err(error) }
    }
}

#[async_trait]
impl HeadlineSource for StaticHeadlineSource {
    async fn fetch_headline(&self) -> SourceResult<String> {
        self.outcome.clone()
    }
}

//! Drawer headline shown above the navigation entries.

use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tracing::warn;

use crate::feed::ports::HeadlineSource;
use crate::resource::{Resource, resource_stream};

/// Turns a one-shot headline fetch into a drawer title.
pub struct HeadlineService<H>
where
    H: HeadlineSource + 'static,
{
    source: Arc<H>,
}

impl<H> HeadlineService<H>
where
    H: HeadlineSource + 'static,
{
    /// Creates the service.
    pub const fn new(source: Arc<H>) -> Self {
        Self { source }
    }

    /// Fetches the headline as a resource lifecycle.
    #[must_use]
    pub fn fetch(&self) -> BoxStream<'static, Resource<String>> {
        let source = Arc::clone(&self.source);
        resource_stream(async move { source.fetch_headline().await })
    }

    /// Streams the drawer title for one fetch.
    ///
    /// `Loading` clears the title, `Success` shows the headline, and
    /// `Failure` shows the failure message in its place.
    #[must_use]
    pub fn drawer_title(&self) -> BoxStream<'static, Option<String>> {
        self.fetch()
            .map(|resource| match resource {
                Resource::Loading => None,
                Resource::Success(text) => Some(text),
                Resource::Failure(failure) => {
                    warn!(code = %failure.code, "headline fetch failed");
                    Some(failure.message)
                }
            })
            .boxed()
    }
}

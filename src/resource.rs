//! Three-state envelope for one-shot asynchronous fetches.
//!
//! A producer emits [`Resource::Loading`] first and then exactly one terminal
//! value, either [`Resource::Success`] or [`Resource::Failure`]. Consumers treat
//! `Loading` as a presentation signal carrying no data and `Failure` as the
//! end of that particular fetch. The envelope implies no retry policy.
//!
//! # Example
//!
//! ```
//! use chatfeed::resource::{FailureCode, Resource};
//!
//! let done: Resource<u32> = Resource::Success(3);
//! assert!(done.is_terminal());
//! assert_eq!(done.data(), Some(&3));
//!
//! let failed: Resource<u32> = Resource::failure("offline");
//! assert_eq!(failed.failure_ref().map(|f| &f.code), Some(&FailureCode::unknown()));
//! ```

use std::fmt;
use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};

/// Classification attached to a [`Failure`].
///
/// Producers that do not classify their failures use the unknown sentinel
/// returned by [`FailureCode::unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureCode(String);

impl FailureCode {
    /// Sentinel code for failures the producer did not classify.
    pub const UNKNOWN: &'static str = "unknown_error";

    /// Creates a failure code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the unknown-error sentinel.
    #[must_use]
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    /// Returns `true` when this is the unknown-error sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FailureCode {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal failure payload of a [`Resource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Human-readable description suitable for display.
    pub message: String,
    /// Producer classification; unknown when unclassified.
    pub code: FailureCode,
}

impl Failure {
    /// Creates an unclassified failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: FailureCode::unknown(),
        }
    }

    /// Creates a failure with an explicit code.
    #[must_use]
    pub fn with_code(message: impl Into<String>, code: FailureCode) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// Lifecycle of a single asynchronous fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Resource<T> {
    /// The fetch is in flight. Always emitted first.
    Loading,
    /// The fetch completed with data.
    Success(T),
    /// The fetch failed. No further values follow for this fetch.
    Failure(Failure),
}

impl<T> Resource<T> {
    /// Creates an unclassified failure.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(Failure::new(message))
    }

    /// Creates a failure with an explicit code.
    #[must_use]
    pub fn failure_with_code(message: impl Into<String>, code: FailureCode) -> Self {
        Self::Failure(Failure::with_code(message, code))
    }

    /// Returns `true` for [`Resource::Loading`].
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` for the terminal states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    /// Returns the success payload, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the failure payload, if any.
    #[must_use]
    pub const fn failure_ref(&self) -> Option<&Failure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Maps the success payload, preserving the lifecycle state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Self::Loading => Resource::Loading,
            Self::Success(data) => Resource::Success(f(data)),
            Self::Failure(failure) => Resource::Failure(failure),
        }
    }
}

impl<T, E> From<Result<T, E>> for Resource<T>
where
    E: Into<Failure>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Failure(err.into()),
        }
    }
}

/// Wraps a fallible future in the resource lifecycle.
///
/// The returned stream yields `Loading`, then the terminal value produced by
/// `fetch`, then ends. The future is not polled until the stream is.
pub fn resource_stream<T, E, F>(fetch: F) -> BoxStream<'static, Resource<T>>
where
    T: Send + 'static,
    E: Into<Failure> + Send + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    stream::once(async { Resource::Loading })
        .chain(stream::once(async move { Resource::from(fetch.await) }))
        .boxed()
}

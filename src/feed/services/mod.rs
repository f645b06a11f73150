//! Application services for the feed subsystem.
//!
//! Services orchestrate the pure [`crate::feed::domain`] transitions over the
//! ports, owning the task trees that keep the feed up to date.

mod controller;
mod headline;
mod reconciler;
mod store;
mod subscription;

pub use controller::{ControllerTask, SessionFeedController};
pub use headline::HeadlineService;
pub use reconciler::FeedReconciler;
pub use store::{FeedStore, FeedTask};
pub use subscription::FeedSubscription;

//! Port trait definitions for the feed subsystem.
//!
//! Every collaborator of the reconciler is passed in explicitly through one
//! of these traits; nothing is looked up from global state.

pub mod content;
pub mod headline;
pub mod session;
pub mod snapshot;

pub use content::ContentSource;
pub use headline::HeadlineSource;
pub use session::SessionSignal;
pub use snapshot::SnapshotSource;

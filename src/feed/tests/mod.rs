//! Unit tests for the feed module.
//!
//! Domain transitions are tested as pure functions; the reconciler and the
//! session controller are tested against the in-memory adapters.

//! Adapter implementations of the feed ports.

pub mod memory;

//! Step definitions for feed reconciliation scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;

//! Application layer for AISADSA.
//!
//! Coordinates the core state machines with the file-backed stores and the
//! REST client.

pub mod assessment;
pub mod factory;

pub use assessment::{AssessmentApp, RemoteServices, TabEntry, TabStores};
pub use factory::build_app;

//! Question flow domain module.
//!
//! # Module Structure
//!
//! - `state`: phases, configuration and the render snapshot
//! - `engine`: the `FlowEngine` state machine
//!
//! # Usage
//!
//! ```ignore
//! use aisadsa_core::flow::{FlowEngine, FlowConfig, ResumeOutcome};
//!
//! let engine = FlowEngine::new(api, credentials, flow_store, FlowConfig::default());
//! if let ResumeOutcome::NotStarted = engine.resume().await? {
//!     engine.start_session().await?;
//! }
//! engine.select_option(0).await?;
//! engine.advance().await?;
//! ```

mod engine;
mod state;

pub use engine::FlowEngine;
pub use state::{
    AdvanceOutcome, DEFAULT_BOOTSTRAP_KEY, DEFAULT_INITIAL_REMAINING_COUNT, FlowConfig, FlowPhase,
    FlowSnapshot, ResumeOutcome,
};

//! Autonomous action loop.
//!
//! The orchestrating state machine: each iteration inspects the live
//! page, scans for actionable candidates, asks the decision policy to
//! pick one, executes it with failure isolation, measures how much the
//! page changed, records evidence through the capture sink, and decides
//! whether to keep going or stop. One loop drives exactly one flow;
//! concurrent flows are fully independent instances.

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod runner;

pub use config::FlowLoopConfig;
pub use errors::LoopError;
pub use orchestrator::{run_task, LoopDeps, TaskReport};
pub use runner::{FlowLoop, FlowOutcome};

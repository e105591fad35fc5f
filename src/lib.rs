//! UITrail: drives a real web app through its UI from a natural-language
//! task, capturing a verifiable trail of every state it passes through.
//!
//! The binary wires the crates together: a Chromium page boundary, a
//! decision policy (remote model or deterministic fallback), a
//! filesystem capture sink and the action loop itself.

pub mod apps;
pub mod config;
pub mod report;

pub use config::CliConfig;

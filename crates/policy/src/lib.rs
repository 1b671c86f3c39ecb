//! Capability gate and parameter-level guards applied before a tool is invoked.

pub mod capability_gate;
pub mod config;
pub mod engine;
pub mod extract;
pub mod param_checks;

pub use config::PolicyConfig;
pub use engine::check;

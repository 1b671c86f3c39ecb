//! Typed `RuntimeOptions` record and its YAML/JSON loader.

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{load, LoadedRuntimeOptions};
pub use types::{AdaptersSection, CoreToolsSection, RootEntry, RuntimeOptions, WatchSection};
pub use validation::AdvisoryWarning;

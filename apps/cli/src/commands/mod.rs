//! Subcommand implementations, one module per subcommand.

pub mod list;
pub mod scan;
pub mod shared;
pub mod verify;

//! Invocation pipeline: lookup, schema validation, policy, budget, adapter
//! dispatch, and observability, composed behind one `Runtime::invoke_tool`.

pub mod core_handlers;
pub mod pipeline;
pub mod schema;

pub use core_handlers::build_core_adapter;
pub use pipeline::Runtime;
pub use toolhub_core::ShutdownHandle;

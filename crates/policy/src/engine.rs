//! Top-level policy check: capability gate, then capability-conditional
//! parameter checks, in that order.

use serde_json::Value;
use toolhub_core::{Capability, ExecContext, ToolError, ToolSpec};

use crate::config::PolicyConfig;
use crate::{capability_gate, param_checks};

/// Run every check that applies to `spec`'s declared capabilities, in order:
/// capability gate, then `write:fs`, then `network`/`read:web`, then
/// `read:db`/`write:db`. The first failing check short-circuits the rest.
///
/// # Errors
/// `POLICY_DENIED` from whichever check rejects first.
pub fn check(
    spec: &ToolSpec,
    args: &Value,
    ctx: &ExecContext,
    config: &PolicyConfig,
) -> Result<(), ToolError> {
    capability_gate::check(spec, ctx)?;

    if spec.capabilities.contains(&Capability::WriteFs) {
        param_checks::check_write_fs(args, config)?;
    }
    if spec.capabilities.contains(&Capability::Network) || spec.capabilities.contains(&Capability::ReadWeb) {
        param_checks::check_network(args, config)?;
    }
    if spec.capabilities.contains(&Capability::ReadDb) || spec.capabilities.contains(&Capability::WriteDb) {
        param_checks::check_db(args, config)?;
    }

    Ok(())
}

//! Capability gate: `spec.capabilities ⊆ ctx.permissions`, plus an explicit
//! opt-in requirement for `danger:destructive`.

use toolhub_core::{Capability, ExecContext, ToolError, ToolSpec};

/// Check the capability gate for one invocation.
///
/// # Errors
/// `POLICY_DENIED` listing the missing capabilities, or denying
/// `danger:destructive` when the context has not opted in even if granted.
pub fn check(spec: &ToolSpec, ctx: &ExecContext) -> Result<(), ToolError> {
    let missing = spec.missing_capabilities(&ctx.permissions);
    if !missing.is_empty() {
        return Err(ToolError::policy_denied(&missing));
    }

    if spec.capabilities.contains(&Capability::DangerDestructive) && !ctx.allow_destructive {
        return Err(ToolError::policy_denied_reason(
            "danger:destructive requires an explicit allow_destructive opt-in",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use toolhub_core::{ToolImpl, ToolKind};

    fn spec_with(caps: &[Capability]) -> ToolSpec {
        ToolSpec {
            name: "dir/tool".into(),
            version: "1.0.0".into(),
            kind: ToolKind::Core,
            description: "d".into(),
            tags: BTreeSet::new(),
            input_schema: ToolSpec::permissive_schema(),
            output_schema: ToolSpec::permissive_schema(),
            capabilities: caps.iter().copied().collect(),
            cost_hints: None,
            endpoint: None,
            resource_id: None,
            r#impl: ToolImpl::None,
        }
    }

    #[test]
    fn denies_with_missing_capability_listed_in_message() {
        let spec = spec_with(&[Capability::WriteFs]);
        let ctx = ExecContext::new("r1", "t1");
        let err = check(&spec, &ctx).unwrap_err();
        assert_eq!(err.kind, toolhub_core::ErrorKind::PolicyDenied);
        assert!(err.message.contains("write:fs"));
    }

    #[test]
    fn admits_when_permissions_are_sufficient() {
        let spec = spec_with(&[Capability::WriteFs]);
        let ctx = ExecContext::new("r1", "t1").with_permissions([Capability::WriteFs]);
        assert!(check(&spec, &ctx).is_ok());
    }

    #[test]
    fn danger_destructive_requires_explicit_opt_in() {
        let spec = spec_with(&[Capability::DangerDestructive]);
        let granted = ExecContext::new("r1", "t1").with_permissions([Capability::DangerDestructive]);
        assert!(check(&spec, &granted).is_err());

        let opted_in = granted.allowing_destructive();
        assert!(check(&spec, &opted_in).is_ok());
    }
}

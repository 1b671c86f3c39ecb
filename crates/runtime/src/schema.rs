//! Thin wrapper over `jsonschema`, mapping validation failures to the
//! runtime's own tagged error kinds.

use serde_json::Value;
use toolhub_core::{ErrorKind, ToolError};

/// Validate `instance` against `schema`, tagging any failure with `kind`
/// (`INPUT_SCHEMA_INVALID` or `OUTPUT_SCHEMA_INVALID`).
///
/// # Errors
/// `kind` if the schema itself fails to compile, or if `instance` doesn't
/// satisfy it.
pub fn validate_against(schema: &Value, instance: &Value, kind: ErrorKind) -> Result<(), ToolError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ToolError::new(kind, format!("invalid schema: {e}")))?;
    if let Err(e) = validator.validate(instance) {
        return Err(ToolError::new(kind, e.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_schema_accepts_any_object() {
        let schema = serde_json::json!({ "type": "object" });
        assert!(validate_against(&schema, &serde_json::json!({"a": 1}), ErrorKind::InputSchemaInvalid).is_ok());
    }

    #[test]
    fn mismatched_instance_is_tagged_with_the_given_kind() {
        let schema = serde_json::json!({ "type": "object", "required": ["path"] });
        let err = validate_against(&schema, &serde_json::json!({}), ErrorKind::InputSchemaInvalid).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InputSchemaInvalid);
    }

    #[test]
    fn output_schema_failures_use_the_output_kind() {
        let schema = serde_json::json!({ "type": "string" });
        let err = validate_against(&schema, &serde_json::json!(42), ErrorKind::OutputSchemaInvalid).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutputSchemaInvalid);
    }
}

//! Pure utility tools: json.select, truncate, hashText, time.now, templateRender.

use chrono::Utc;
use sha2::{Digest, Sha256};
use toolhub_core::ToolError;

/// Select a value out of `input` using a JMESPath expression.
///
/// # Errors
/// `UPSTREAM_ERROR` if the expression doesn't compile or can't be applied.
pub fn json_select(input: &serde_json::Value, expression: &str) -> Result<serde_json::Value, ToolError> {
    let compiled = jmespath::compile(expression)
        .map_err(|e| ToolError::upstream(format!("invalid JMESPath expression '{expression}': {e}")))?;
    let json_text = serde_json::to_string(input).map_err(|e| ToolError::upstream(format!("input not serializable: {e}")))?;
    let variable = jmespath::Variable::from_json(&json_text)
        .map_err(|e| ToolError::upstream(format!("input could not be parsed by jmespath: {e}")))?;
    let result = compiled
        .search(variable)
        .map_err(|e| ToolError::upstream(format!("JMESPath evaluation failed: {e}")))?;
    serde_json::to_value(&*result).map_err(|e| ToolError::upstream(format!("JMESPath result not representable as JSON: {e}")))
}

/// Truncate `text` to at most `max_chars` characters, appending an ellipsis marker if cut.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('\u{2026}');
    out
}

/// SHA-256 hex digest of `text`.
#[must_use]
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// The current time rendered three ways.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TimeNow {
    pub iso: String,
    pub epoch_ms: i64,
    pub formatted: String,
}

/// Report the current time, optionally in an IANA timezone, with a strftime format.
///
/// # Errors
/// `UPSTREAM_ERROR` if `zone` isn't a recognized IANA name.
pub fn time_now(zone: Option<&str>, format: Option<&str>) -> Result<TimeNow, ToolError> {
    let now = Utc::now();
    let format = format.unwrap_or("%Y-%m-%d %H:%M:%S %Z");

    let formatted = match zone {
        None => now.format(format).to_string(),
        Some(zone_name) => {
            let tz: chrono_tz::Tz = zone_name
                .parse()
                .map_err(|_| ToolError::upstream(format!("unknown IANA timezone '{zone_name}'")))?;
            now.with_timezone(&tz).format(format).to_string()
        }
    };

    Ok(TimeNow {
        iso: now.to_rfc3339(),
        epoch_ms: now.timestamp_millis(),
        formatted,
    })
}

/// Render a `{{key}}`-style template against a flat string map.
///
/// # Errors
/// `UPSTREAM_ERROR` naming the first placeholder with no matching key.
pub fn template_render(template: &str, values: &std::collections::HashMap<String, String>) -> Result<String, ToolError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let key = after_open[..end].trim();
        let value = values
            .get(key)
            .ok_or_else(|| ToolError::upstream(format!("template placeholder '{key}' has no value")))?;
        out.push_str(value);
        rest = &after_open[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_select_extracts_a_nested_field() {
        let input = serde_json::json!({ "a": { "b": 42 } });
        let result = json_select(&input, "a.b").unwrap();
        assert_eq!(result, serde_json::json!(42));
    }

    #[test]
    fn json_select_errors_on_invalid_expression() {
        let input = serde_json::json!({});
        assert!(json_select(&input, "a..b").is_err());
    }

    #[test]
    fn truncate_leaves_short_text_untouched() {
        assert_eq!(truncate("hi", 10), "hi");
    }

    #[test]
    fn truncate_cuts_and_marks_long_text() {
        let result = truncate("hello world", 5);
        assert_eq!(result, "hello\u{2026}");
    }

    #[test]
    fn hash_text_matches_known_digest() {
        assert_eq!(hash_text("abc"), "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn time_now_rejects_unknown_zone() {
        assert!(time_now(Some("Not/AZone"), None).is_err());
    }

    #[test]
    fn time_now_accepts_a_known_zone() {
        let result = time_now(Some("America/New_York"), None).unwrap();
        assert!(!result.iso.is_empty());
    }

    #[test]
    fn template_render_substitutes_known_keys() {
        let mut values = std::collections::HashMap::new();
        values.insert("name".to_string(), "world".to_string());
        let rendered = template_render("hello {{name}}!", &values).unwrap();
        assert_eq!(rendered, "hello world!");
    }

    #[test]
    fn template_render_errors_on_unknown_key() {
        let values = std::collections::HashMap::new();
        assert!(template_render("hello {{missing}}", &values).is_err());
    }
}

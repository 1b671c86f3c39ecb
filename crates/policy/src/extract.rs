//! Recursive, case-insensitive-substring key extraction from invocation args.
//!
//! Shared by the `write:fs`, `network`/`read:web`, and `read:db`/`write:db`
//! parameter checks, all of which need "find every string value whose key
//! looks like a path/URL/SQL field" over an arbitrary args object.

use serde_json::Value;

/// Collect every string value reachable from `value` whose containing key
/// contains (case-insensitively) one of `key_substrings`. Recurses into
/// nested objects; does not recurse into arrays (per the spec's extraction rule).
pub fn extract_strings_by_key(value: &Value, key_substrings: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    collect(value, key_substrings, &mut out);
    out
}

fn collect(value: &Value, key_substrings: &[&str], out: &mut Vec<String>) {
    if let Value::Object(map) = value {
        for (key, val) in map {
            let key_lower = key.to_lowercase();
            let matches_key = key_substrings.iter().any(|s| key_lower.contains(s));
            match val {
                Value::String(s) if matches_key => out.push(s.clone()),
                Value::Object(_) => collect(val, key_substrings, out),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_matching_keys_case_insensitively() {
        let args = serde_json::json!({ "Path": "/tmp/a", "other": "ignored" });
        let found = extract_strings_by_key(&args, &["path"]);
        assert_eq!(found, vec!["/tmp/a".to_string()]);
    }

    #[test]
    fn recurses_into_nested_objects_not_arrays() {
        let args = serde_json::json!({
            "options": { "filepath": "/tmp/nested" },
            "list": [{ "path": "/tmp/in-array" }],
        });
        let found = extract_strings_by_key(&args, &["path", "file"]);
        assert_eq!(found, vec!["/tmp/nested".to_string()]);
    }
}

//! `SKILL.md` parsing: frontmatter validation, bundled-file classification,
//! and multi-program fan-out.

use std::path::Path;

use toolhub_core::{SkillDefinition, SkillFile, SkillFileClass};

const RESERVED_NAMES: &[&str] = &["anthropic", "claude"];
const MAX_NAME_LEN: usize = 64;
const MAX_DESCRIPTION_LEN: usize = 1024;

/// Parsed `---`-delimited YAML frontmatter from the top of `SKILL.md`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SkillFrontmatter {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub programs: Option<std::collections::BTreeMap<String, String>>,
}

/// Split `content` into (frontmatter, body), validate the frontmatter, and
/// return both.
///
/// # Errors
/// If the file doesn't open with a `---` frontmatter block, the YAML is
/// invalid, or `name`/`description` fail validation.
pub fn parse_skill_md(content: &str) -> Result<(SkillFrontmatter, String), String> {
    let rest = content.strip_prefix("---\n").or_else(|| content.strip_prefix("---\r\n")).ok_or("SKILL.md must open with a YAML frontmatter block delimited by '---'")?;
    let end = rest.find("\n---").ok_or("SKILL.md frontmatter is not closed by a second '---' line")?;
    let frontmatter_text = &rest[..end];
    let body = rest[end + 4..].trim_start_matches(['\r', '\n']).to_string();

    let frontmatter: SkillFrontmatter = serde_yaml::from_str(frontmatter_text).map_err(|e| format!("invalid frontmatter YAML: {e}"))?;

    validate_name(&frontmatter.name)?;
    validate_description(&frontmatter.description)?;

    Ok((frontmatter, body))
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(format!("skill name must be 1-{MAX_NAME_LEN} characters"));
    }
    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err("skill name must match [a-z0-9-]+".to_string());
    }
    if RESERVED_NAMES.iter().any(|r| name.contains(r)) {
        return Err(format!("skill name must not contain a reserved word ({})", RESERVED_NAMES.join(", ")));
    }
    if contains_xml_tag(name) {
        return Err("skill name must not contain XML tags".to_string());
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    if description.is_empty() || description.len() > MAX_DESCRIPTION_LEN {
        return Err(format!("skill description must be 1-{MAX_DESCRIPTION_LEN} characters"));
    }
    if contains_xml_tag(description) {
        return Err("skill description must not contain XML tags".to_string());
    }
    Ok(())
}

fn contains_xml_tag(s: &str) -> bool {
    s.contains('<') && s.contains('>')
}

/// Recursively enumerate bundled files under `dir`, skipping `SKILL.md`,
/// `tool.json`, hidden paths, and `node_modules`.
#[must_use]
pub fn collect_bundled_files(dir: &Path) -> Vec<SkillFile> {
    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    out
}

fn walk(root: &Path, current: &Path, out: &mut Vec<SkillFile>) {
    let Ok(entries) = std::fs::read_dir(current) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if name.starts_with('.') || name == "node_modules" || name == "SKILL.md" || name == "tool.json" {
            continue;
        }
        if path.is_dir() {
            walk(root, &path, out);
        } else {
            let relative = path.strip_prefix(root).unwrap_or(&path).to_string_lossy().to_string();
            out.push(SkillFile { relative_path: relative, class: classify(&path) });
        }
    }
}

fn classify(path: &Path) -> SkillFileClass {
    match path.extension().and_then(|e| e.to_str()) {
        Some("md" | "txt") => SkillFileClass::Instructions,
        Some("js" | "mjs" | "py" | "sh" | "rs") => SkillFileClass::Code,
        _ => SkillFileClass::Data,
    }
}

/// Candidate program-entry file names, auto-discovered when the frontmatter
/// has no explicit `programs` map: top-level `.js`/`.mjs` files excluding
/// hidden, `_`-prefixed, and `.test./.spec.`-infixed names.
#[must_use]
pub fn auto_discover_programs(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else { return Vec::new() };
    let mut files: Vec<String> = entries
        .flatten()
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            let is_entry_ext = name.ends_with(".js") || name.ends_with(".mjs");
            let excluded = name.starts_with('.') || name.starts_with('_') || name.contains(".test.") || name.contains(".spec.");
            (is_entry_ext && !excluded).then_some(name)
        })
        .collect();
    files.sort();
    files
}

/// Build one [`SkillDefinition`] per program, ordering `handler.js`/`index.js`
/// first as `"default"`, the rest keyed by file stem.
#[must_use]
pub fn build_program_definitions(
    instructions: &str,
    files: &[SkillFile],
    explicit_programs: Option<&std::collections::BTreeMap<String, String>>,
    dir: &Path,
) -> Vec<SkillDefinition> {
    if let Some(programs) = explicit_programs {
        return programs
            .iter()
            .map(|(key, handler)| SkillDefinition {
                instructions: instructions.to_string(),
                files: files.to_vec(),
                program_key: key.clone(),
                handler_path: Some(handler.clone()),
            })
            .collect();
    }

    let discovered = auto_discover_programs(dir);
    if discovered.is_empty() {
        return vec![SkillDefinition {
            instructions: instructions.to_string(),
            files: files.to_vec(),
            program_key: "default".to_string(),
            handler_path: None,
        }];
    }

    let mut ordered = discovered;
    ordered.sort_by_key(|name| match name.as_str() {
        "handler.js" | "index.js" => 0,
        _ => 1,
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, file)| {
            let key = if i == 0 {
                "default".to_string()
            } else {
                Path::new(&file).file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or(file.clone())
            };
            SkillDefinition {
                instructions: instructions.to_string(),
                files: files.to_vec(),
                program_key: key,
                handler_path: Some(file),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_frontmatter_and_body() {
        let content = "---\nname: my-skill\ndescription: does a thing\n---\ninstructions here\n";
        let (fm, body) = parse_skill_md(content).unwrap();
        assert_eq!(fm.name, "my-skill");
        assert_eq!(body.trim(), "instructions here");
    }

    #[test]
    fn rejects_missing_frontmatter_delimiter() {
        assert!(parse_skill_md("no frontmatter here").is_err());
    }

    #[test]
    fn rejects_reserved_words_in_name() {
        let content = "---\nname: claude-helper\ndescription: d\n---\nbody\n";
        assert!(parse_skill_md(content).is_err());
    }

    #[test]
    fn rejects_uppercase_in_name() {
        let content = "---\nname: MySkill\ndescription: d\n---\nbody\n";
        assert!(parse_skill_md(content).is_err());
    }

    #[test]
    fn rejects_xml_tags_in_description() {
        let content = "---\nname: ok-skill\ndescription: \"<script>bad</script>\"\n---\nbody\n";
        assert!(parse_skill_md(content).is_err());
    }

    #[test]
    fn collects_bundled_files_skipping_hidden_and_reserved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SKILL.md"), "").unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();
        std::fs::write(dir.path().join("handler.js"), "").unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join(".hidden").join("x.txt"), "").unwrap();

        let files = collect_bundled_files(dir.path());
        let names: Vec<_> = files.iter().map(|f| f.relative_path.clone()).collect();
        assert!(names.contains(&"notes.md".to_string()));
        assert!(names.contains(&"handler.js".to_string()));
        assert!(!names.iter().any(|n| n.contains(".hidden")));
    }

    #[test]
    fn builds_single_program_when_no_entries_discovered() {
        let dir = tempfile::tempdir().unwrap();
        let defs = build_program_definitions("do the thing", &[], None, dir.path());
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].program_key, "default");
    }

    #[test]
    fn builds_multiple_programs_with_default_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.js"), "").unwrap();
        std::fs::write(dir.path().join("report.js"), "").unwrap();
        let defs = build_program_definitions("instructions", &[], None, dir.path());
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].program_key, "default");
        assert_eq!(defs[1].program_key, "report");
    }
}

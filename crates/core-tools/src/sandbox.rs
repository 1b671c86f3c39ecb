//! Sandbox-relative path resolution shared by every filesystem tool.

use std::path::{Component, Path, PathBuf};

use toolhub_core::ToolError;

/// Resolve `input` against `root`, refusing any path that escapes it.
///
/// `root` is canonicalized first. Absolute inputs are only accepted if they
/// already lie under the canonicalized root; everything else is joined to
/// it. The result is walked component by component, following symlinks via
/// `realpath` as each ancestor is reached, so a symlink that would lead
/// outside `root` is rejected even if the leaf component doesn't exist yet.
///
/// # Errors
/// `PATH_OUTSIDE_SANDBOX` if resolution would escape `root`.
pub fn resolve_sandboxed_path(input: &str, root: &Path) -> Result<PathBuf, ToolError> {
    let root = std::fs::canonicalize(root)
        .map_err(|e| ToolError::path_outside_sandbox(format!("sandbox root '{}' is not accessible: {e}", root.display())))?;

    let candidate = Path::new(input);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let normalized = normalize_lexically(&joined);
    if !normalized.starts_with(&root) {
        return Err(ToolError::path_outside_sandbox(format!(
            "'{input}' resolves outside the sandbox root"
        )));
    }

    let resolved = resolve_through_symlinks(&normalized, &root)?;
    if !resolved.starts_with(&root) {
        return Err(ToolError::path_outside_sandbox(format!(
            "'{input}' escapes the sandbox root via a symlink"
        )));
    }

    Ok(resolved)
}

/// Collapse `.`/`..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Walk `path` from `root` downward, resolving each existing ancestor through
/// `realpath` so symlinks are followed; the deepest non-existent suffix is
/// appended unchanged (it doesn't exist yet, so it can't itself be a symlink).
fn resolve_through_symlinks(path: &Path, root: &Path) -> Result<PathBuf, ToolError> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut resolved = root.to_path_buf();
    let mut pending: Vec<&std::ffi::OsStr> = Vec::new();

    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        let candidate = resolved.join(part);
        match std::fs::canonicalize(&candidate) {
            Ok(real) => resolved = real,
            Err(_) => {
                pending.push(part);
            }
        }
    }

    for part in pending {
        resolved.push(part);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_a_simple_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_sandboxed_path("sub/file.txt", dir.path()).unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn returning_the_root_itself_is_permitted() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_sandboxed_path(".", dir.path()).unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn rejects_traversal_above_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_sandboxed_path("../escape.txt", dir.path()).unwrap_err();
        assert_eq!(err.kind, toolhub_core::ErrorKind::PathOutsideSandbox);
    }

    #[test]
    fn rejects_absolute_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_sandboxed_path("/etc/passwd", dir.path()).unwrap_err();
        assert_eq!(err.kind, toolhub_core::ErrorKind::PathOutsideSandbox);
    }

    #[test]
    fn accepts_absolute_paths_already_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let abs = root.join("inside.txt").to_string_lossy().to_string();
        let resolved = resolve_sandboxed_path(&abs, dir.path()).unwrap();
        assert!(resolved.starts_with(&root));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlinks_that_escape_the_root() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let link = root.join("escape-link");
        symlink(outside.path(), &link).unwrap();

        let err = resolve_sandboxed_path("escape-link/file.txt", dir.path()).unwrap_err();
        assert_eq!(err.kind, toolhub_core::ErrorKind::PathOutsideSandbox);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinks_that_stay_inside_the_root() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir(root.join("real")).unwrap();
        symlink(root.join("real"), root.join("alias")).unwrap();

        let resolved = resolve_sandboxed_path("alias/file.txt", dir.path()).unwrap();
        assert!(resolved.starts_with(&root));
    }
}

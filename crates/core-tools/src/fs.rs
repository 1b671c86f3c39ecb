//! Sandboxed filesystem tools: readText, writeText, listDir, searchText, sha256, deletePath.

use std::path::Path;

use sha2::{Digest, Sha256};
use toolhub_core::{EvidenceType, ToolError, ToolEvidence};

use crate::config::CoreToolsConfig;
use crate::sandbox::resolve_sandboxed_path;

/// Read a UTF-8 text file, rejecting anything over `max_read_bytes`.
///
/// # Errors
/// `PATH_OUTSIDE_SANDBOX`, `FILE_TOO_LARGE`, or an upstream I/O error.
pub async fn read_text(
    config: &CoreToolsConfig,
    path: &str,
) -> Result<(String, Vec<ToolEvidence>), ToolError> {
    let resolved = resolve_sandboxed_path(path, &config.sandbox_root)?;
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| ToolError::upstream(format!("stat '{path}' failed: {e}")))?;
    if metadata.len() > config.max_read_bytes {
        return Err(ToolError::file_too_large(format!(
            "'{path}' is {} bytes, exceeds the {}-byte limit",
            metadata.len(),
            config.max_read_bytes
        )));
    }

    let content = tokio::fs::read_to_string(&resolved)
        .await
        .map_err(|e| ToolError::upstream(format!("read '{path}' failed: {e}")))?;
    let evidence = vec![ToolEvidence::new(EvidenceType::File, resolved.to_string_lossy(), "read text file")];
    Ok((content, evidence))
}

/// Write `content` to a sandboxed path, creating parent directories as needed.
///
/// # Errors
/// `PATH_OUTSIDE_SANDBOX` or an upstream I/O error.
pub async fn write_text(
    config: &CoreToolsConfig,
    path: &str,
    content: &str,
) -> Result<Vec<ToolEvidence>, ToolError> {
    let resolved = resolve_sandboxed_path(path, &config.sandbox_root)?;
    if let Some(parent) = resolved.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::upstream(format!("creating parent dirs for '{path}' failed: {e}")))?;
    }
    tokio::fs::write(&resolved, content)
        .await
        .map_err(|e| ToolError::upstream(format!("write '{path}' failed: {e}")))?;
    Ok(vec![ToolEvidence::new(EvidenceType::File, resolved.to_string_lossy(), "wrote text file")])
}

/// One directory entry.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// List the immediate children of a sandboxed directory.
///
/// # Errors
/// `PATH_OUTSIDE_SANDBOX` or an upstream I/O error.
pub async fn list_dir(config: &CoreToolsConfig, path: &str) -> Result<(Vec<DirEntry>, Vec<ToolEvidence>), ToolError> {
    let resolved = resolve_sandboxed_path(path, &config.sandbox_root)?;
    let mut read_dir = tokio::fs::read_dir(&resolved)
        .await
        .map_err(|e| ToolError::upstream(format!("list '{path}' failed: {e}")))?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| ToolError::upstream(format!("reading directory entry failed: {e}")))?
    {
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| ToolError::upstream(format!("stat directory entry failed: {e}")))?;
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            is_dir: metadata.is_dir(),
            size: metadata.len(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let evidence = vec![ToolEvidence::new(EvidenceType::File, resolved.to_string_lossy(), "listed directory")];
    Ok((entries, evidence))
}

/// One text search match.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchMatch {
    pub path: String,
    pub line: usize,
    pub text: String,
}

/// Recursively search text files under a sandboxed directory for a literal substring.
///
/// # Errors
/// `PATH_OUTSIDE_SANDBOX` or an upstream I/O error.
pub async fn search_text(
    config: &CoreToolsConfig,
    path: &str,
    query: &str,
) -> Result<(Vec<SearchMatch>, Vec<ToolEvidence>), ToolError> {
    let resolved = resolve_sandboxed_path(path, &config.sandbox_root)?;
    let mut matches = Vec::new();
    search_dir(&resolved, query, &mut matches).await?;
    let evidence = vec![ToolEvidence::new(
        EvidenceType::Text,
        resolved.to_string_lossy(),
        format!("searched for '{query}', {} matches", matches.len()),
    )];
    Ok((matches, evidence))
}

fn search_dir<'a>(
    dir: &'a Path,
    query: &'a str,
    matches: &'a mut Vec<SearchMatch>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), ToolError>> + Send + 'a>> {
    Box::pin(async move {
        let mut read_dir = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| ToolError::upstream(format!("search: reading '{}' failed: {e}", dir.display())))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| ToolError::upstream(format!("search: directory entry failed: {e}")))?
        {
            let entry_path = entry.path();
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| ToolError::upstream(format!("search: stat failed: {e}")))?;
            if metadata.is_dir() {
                search_dir(&entry_path, query, matches).await?;
            } else if let Ok(content) = tokio::fs::read_to_string(&entry_path).await {
                for (idx, line) in content.lines().enumerate() {
                    if line.contains(query) {
                        matches.push(SearchMatch {
                            path: entry_path.to_string_lossy().to_string(),
                            line: idx + 1,
                            text: line.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    })
}

/// Compute the SHA-256 digest of a sandboxed file's contents.
///
/// # Errors
/// `PATH_OUTSIDE_SANDBOX` or an upstream I/O error.
pub async fn sha256(config: &CoreToolsConfig, path: &str) -> Result<(String, Vec<ToolEvidence>), ToolError> {
    let resolved = resolve_sandboxed_path(path, &config.sandbox_root)?;
    let bytes = tokio::fs::read(&resolved)
        .await
        .map_err(|e| ToolError::upstream(format!("read '{path}' for hashing failed: {e}")))?;
    let digest = Sha256::digest(&bytes);
    let hex = hex_encode(&digest);
    let evidence = vec![ToolEvidence::new(EvidenceType::File, resolved.to_string_lossy(), "sha256")];
    Ok((hex, evidence))
}

/// Delete a sandboxed file or directory. Callers must already hold `danger:destructive`;
/// this function performs the filesystem operation and no capability check itself.
///
/// # Errors
/// `PATH_OUTSIDE_SANDBOX` or an upstream I/O error.
pub async fn delete_path(config: &CoreToolsConfig, path: &str) -> Result<Vec<ToolEvidence>, ToolError> {
    let resolved = resolve_sandboxed_path(path, &config.sandbox_root)?;
    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| ToolError::upstream(format!("stat '{path}' failed: {e}")))?;
    if metadata.is_dir() {
        tokio::fs::remove_dir_all(&resolved)
            .await
            .map_err(|e| ToolError::upstream(format!("remove_dir '{path}' failed: {e}")))?;
    } else {
        tokio::fs::remove_file(&resolved)
            .await
            .map_err(|e| ToolError::upstream(format!("remove_file '{path}' failed: {e}")))?;
    }
    Ok(vec![ToolEvidence::new(EvidenceType::File, resolved.to_string_lossy(), "deleted path")])
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

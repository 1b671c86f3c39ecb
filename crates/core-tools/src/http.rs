//! SSRF-guarded HTTP tools: fetchText, fetchJson, head, downloadFile.

use std::net::IpAddr;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use toolhub_core::{EvidenceType, ToolError, ToolEvidence};

use crate::config::CoreToolsConfig;
use crate::sandbox::resolve_sandboxed_path;

/// Validate `url` against the SSRF policy: scheme, resolved-address CIDR
/// blocklist, and the `allowedHosts` glob list.
///
/// # Errors
/// `HTTP_DISALLOWED_HOST` for any failing check.
pub async fn validate_url(url: &str, config: &CoreToolsConfig) -> Result<reqwest::Url, ToolError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| ToolError::http_disallowed_host(format!("'{url}' is not a valid URL: {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ToolError::http_disallowed_host(format!(
            "scheme '{}' is not http/https",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ToolError::http_disallowed_host(format!("'{url}' has no host")))?;

    if !host_allowed(host, &config.allowed_hosts) {
        return Err(ToolError::http_disallowed_host(format!(
            "host '{host}' is not in the allowed hosts list"
        )));
    }

    let addrs = resolve_host(host, parsed.port_or_known_default().unwrap_or(443)).await?;
    for addr in &addrs {
        if config.blocked_cidrs.iter().any(|cidr| cidr.contains(addr)) {
            return Err(ToolError::http_disallowed_host(format!(
                "'{host}' resolves to blocked address {addr}"
            )));
        }
    }

    Ok(parsed)
}

fn host_allowed(host: &str, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return false;
    }
    allowed.iter().any(|pattern| {
        pattern
            .strip_prefix("*.")
            .map_or_else(|| pattern == host, |suffix| host == suffix || host.ends_with(&format!(".{suffix}")))
    })
}

async fn resolve_host(host: &str, port: u16) -> Result<Vec<IpAddr>, ToolError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }
    tokio::net::lookup_host((host, port))
        .await
        .map(|iter| iter.map(|addr| addr.ip()).collect())
        .map_err(|e| ToolError::http_disallowed_host(format!("DNS resolution for '{host}' failed: {e}")))
}

async fn checked_get(client: &reqwest::Client, url: reqwest::Url, config: &CoreToolsConfig) -> Result<reqwest::Response, ToolError> {
    let response = tokio::time::timeout(
        std::time::Duration::from_millis(config.default_timeout_ms),
        client.get(url.clone()).header("User-Agent", &config.http_user_agent).send(),
    )
    .await
    .map_err(|_| ToolError::http_timeout(format!("GET {url} exceeded {}ms", config.default_timeout_ms)))?
    .map_err(|e| ToolError::upstream(format!("GET {url} failed: {e}")))?;

    if let Some(len) = response.content_length() {
        if len > config.max_http_bytes {
            return Err(ToolError::http_too_large(format!(
                "{url} declares Content-Length {len}, exceeds the {}-byte limit",
                config.max_http_bytes
            )));
        }
    }
    Ok(response)
}

async fn stream_body_capped(mut response: reqwest::Response, cap: u64) -> Result<Vec<u8>, ToolError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ToolError::upstream(format!("reading response body failed: {e}")))?
    {
        bytes.extend_from_slice(&chunk);
        if bytes.len() as u64 > cap {
            return Err(ToolError::http_too_large(format!(
                "response body exceeded the {cap}-byte limit"
            )));
        }
    }
    Ok(bytes)
}

/// `GET` a URL and return its body as text.
///
/// # Errors
/// `HTTP_DISALLOWED_HOST`, `HTTP_TIMEOUT`, `HTTP_TOO_LARGE`, or an upstream error.
pub async fn fetch_text(
    client: &reqwest::Client,
    config: &CoreToolsConfig,
    url: &str,
) -> Result<(String, Vec<ToolEvidence>), ToolError> {
    let parsed = validate_url(url, config).await?;
    let response = checked_get(client, parsed, config).await?;
    let bytes = stream_body_capped(response, config.max_http_bytes).await?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok((text, vec![ToolEvidence::new(EvidenceType::Url, url, "fetched text")]))
}

/// `GET` a URL and parse its body as JSON.
///
/// # Errors
/// As [`fetch_text`], plus an `UPSTREAM_ERROR` if the body is not valid JSON.
pub async fn fetch_json(
    client: &reqwest::Client,
    config: &CoreToolsConfig,
    url: &str,
) -> Result<(serde_json::Value, Vec<ToolEvidence>), ToolError> {
    let (text, evidence) = fetch_text(client, config, url).await?;
    let value = serde_json::from_str(&text).map_err(|e| ToolError::upstream(format!("'{url}' did not return valid JSON: {e}")))?;
    Ok((value, evidence))
}

/// Status and headers for a `HEAD` request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HeadResult {
    pub status: u16,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

/// Issue a `HEAD` request.
///
/// # Errors
/// `HTTP_DISALLOWED_HOST`, `HTTP_TIMEOUT`, or an upstream error.
pub async fn head(
    client: &reqwest::Client,
    config: &CoreToolsConfig,
    url: &str,
) -> Result<(HeadResult, Vec<ToolEvidence>), ToolError> {
    let parsed = validate_url(url, config).await?;
    let response = tokio::time::timeout(
        std::time::Duration::from_millis(config.default_timeout_ms),
        client.head(parsed.clone()).header("User-Agent", &config.http_user_agent).send(),
    )
    .await
    .map_err(|_| ToolError::http_timeout(format!("HEAD {parsed} exceeded {}ms", config.default_timeout_ms)))?
    .map_err(|e| ToolError::upstream(format!("HEAD {parsed} failed: {e}")))?;

    let result = HeadResult {
        status: response.status().as_u16(),
        content_length: response.content_length(),
        content_type: response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    Ok((result, vec![ToolEvidence::new(EvidenceType::Url, url, "HEAD request")]))
}

/// Download a URL to a sandboxed path, streaming while hashing SHA-256.
///
/// # Errors
/// As [`fetch_text`], `PATH_OUTSIDE_SANDBOX`, or an upstream error if the
/// destination exists and `overwrite` is false.
pub async fn download_file(
    client: &reqwest::Client,
    config: &CoreToolsConfig,
    url: &str,
    dest: &str,
    overwrite: bool,
) -> Result<(String, Vec<ToolEvidence>), ToolError> {
    let resolved = resolve_sandboxed_path(dest, &config.sandbox_root)?;
    if !overwrite && tokio::fs::metadata(&resolved).await.is_ok() {
        return Err(ToolError::upstream(format!(
            "'{dest}' already exists; pass overwrite=true to replace it"
        )));
    }

    let parsed = validate_url(url, config).await?;
    let mut response = checked_get(client, parsed, config).await?;

    if let Some(parent) = resolved.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::upstream(format!("creating parent dirs for '{dest}' failed: {e}")))?;
    }

    let mut file = tokio::fs::File::create(&resolved)
        .await
        .map_err(|e| ToolError::upstream(format!("creating '{dest}' failed: {e}")))?;
    let mut hasher = Sha256::new();
    let mut total: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ToolError::upstream(format!("reading response body failed: {e}")))?
    {
        total += chunk.len() as u64;
        if total > config.max_download_bytes {
            let _ = tokio::fs::remove_file(&resolved).await;
            return Err(ToolError::http_too_large(format!(
                "download exceeded the {}-byte limit",
                config.max_download_bytes
            )));
        }
        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .map_err(|e| ToolError::upstream(format!("writing '{dest}' failed: {e}")))?;
    }
    file.flush().await.map_err(|e| ToolError::upstream(format!("flushing '{dest}' failed: {e}")))?;

    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    Ok((hex, vec![ToolEvidence::new(EvidenceType::File, resolved.to_string_lossy(), "downloaded file")]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(root: &Path, host: &str) -> CoreToolsConfig {
        CoreToolsConfig {
            sandbox_root: root.to_path_buf(),
            allowed_hosts: vec![host.to_string()],
            blocked_cidrs: Vec::new(),
            ..CoreToolsConfig::default()
        }
    }

    #[test]
    fn host_allowed_matches_exact_and_wildcard_suffix() {
        assert!(host_allowed("api.example.com", &["api.example.com".to_string()]));
        assert!(host_allowed("sub.example.com", &["*.example.com".to_string()]));
        assert!(!host_allowed("example.com", &["*.example.com".to_string()]));
        assert!(!host_allowed("evil.com", &["*.example.com".to_string()]));
    }

    #[tokio::test]
    async fn fetch_text_returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = server.uri();
        let host = url::Url::parse(&url).unwrap().host_str().unwrap().to_string();
        let config = config_for(dir.path(), &host);
        let client = reqwest::Client::new();

        let (text, _) = fetch_text(&client, &config, &url).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn fetch_rejects_hosts_not_on_the_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), "only-this-host.example");
        let client = reqwest::Client::new();
        let err = fetch_text(&client, &config, "http://127.0.0.1:1/").await.unwrap_err();
        assert_eq!(err.kind, toolhub_core::ErrorKind::HttpDisallowedHost);
    }

    #[tokio::test]
    async fn fetch_json_parses_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"a":1}"#))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = server.uri();
        let host = url::Url::parse(&url).unwrap().host_str().unwrap().to_string();
        let config = config_for(dir.path(), &host);
        let client = reqwest::Client::new();

        let (value, _) = fetch_json(&client, &config, &url).await.unwrap();
        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn download_file_refuses_overwrite_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("data"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = server.uri();
        let host = url::Url::parse(&url).unwrap().host_str().unwrap().to_string();
        let config = config_for(dir.path(), &host);
        let client = reqwest::Client::new();

        download_file(&client, &config, &url, "out.bin", false).await.unwrap();
        let err = download_file(&client, &config, &url, "out.bin", false).await.unwrap_err();
        assert_eq!(err.kind, toolhub_core::ErrorKind::UpstreamError);
    }
}

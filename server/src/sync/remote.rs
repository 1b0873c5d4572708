//! Remote content store client.
//!
//! Collections live as JSON files in a Git repository, reached through the
//! hosting provider's contents API. Reads return the decoded record list
//! plus the file's version token (`sha`); writes must present that token or
//! the store rejects them. The client performs one bounded network call per
//! operation and never retries — failure handling belongs to the callers
//! (queue fallback on writes, mirror fallback on reads).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::SharedConfig;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const PUSH_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors from the remote store.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request to remote store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote store returned status {status} for {path}")]
    Status { path: String, status: u16 },
}

/// Read/write access to collection files in the remote store.
///
/// `fetch` distinguishes "file does not exist" (`Ok` with an empty list and
/// no version token) from "store is broken" (`Err`). `push` never raises on
/// a rejected write; it reports `false` and leaves fallback to the caller.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<(Vec<Value>, Option<String>), RemoteError>;

    async fn push(
        &self,
        path: &str,
        records: &[Value],
        version: Option<&str>,
        message: &str,
    ) -> bool;
}

/// Contents-API file object, as returned by a read.
#[derive(Debug, Deserialize)]
struct ContentsFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    sha: Option<String>,
}

/// GitHub contents-API backed store.
pub struct GithubStore {
    http: reqwest::Client,
    config: SharedConfig,
}

impl GithubStore {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn apply_headers(
        &self,
        builder: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let builder = builder.header("Accept", "application/vnd.github.v3+json");
        let builder = builder.header("User-Agent", "quadro-server");
        match token {
            Some(token) => builder.header("Authorization", format!("token {token}")),
            None => builder,
        }
    }
}

#[async_trait]
impl RemoteStore for GithubStore {
    async fn fetch(&self, path: &str) -> Result<(Vec<Value>, Option<String>), RemoteError> {
        let config = self.config.current();
        let url = config.remote.contents_url(path);

        let response = self
            .apply_headers(self.http.get(&url), config.remote.token.as_deref())
            .query(&[("ref", config.remote.branch.as_str())])
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            // Missing file means an empty collection with no version token,
            // not an error.
            return Ok((Vec::new(), None));
        }
        if !status.is_success() {
            return Err(RemoteError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let file: ContentsFile = response.json().await?;
        Ok(interpret_contents(path, file))
    }

    async fn push(
        &self,
        path: &str,
        records: &[Value],
        version: Option<&str>,
        message: &str,
    ) -> bool {
        let config = self.config.current();
        let url = config.remote.contents_url(path);

        let mut body = json!({
            "message": message,
            "branch": config.remote.branch,
            "content": quadro_engine::encode_records(records),
        });
        if let Some(sha) = version {
            body["sha"] = json!(sha);
        }

        let request = self
            .apply_headers(self.http.put(&url), config.remote.token.as_deref())
            .timeout(PUSH_TIMEOUT)
            .json(&body);

        match request.send().await {
            Ok(response) if matches!(response.status().as_u16(), 200 | 201) => true,
            Ok(response) => {
                tracing::warn!(
                    path,
                    status = response.status().as_u16(),
                    "remote store rejected write"
                );
                false
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "remote store write failed");
                false
            }
        }
    }
}

/// Decode a fetched content object into records plus version token.
///
/// All malformed-content fallbacks funnel through here so the
/// availability-over-correctness behavior stays observable in the logs.
fn interpret_contents(path: &str, file: ContentsFile) -> (Vec<Value>, Option<String>) {
    let sha = file.sha;
    let Some(content) = file.content.filter(|c| !c.trim().is_empty()) else {
        return (Vec::new(), sha);
    };
    match quadro_engine::decode_records(&content) {
        Ok(records) => (records, sha),
        Err(err) => {
            tracing::warn!(path, error = %err, "malformed remote content, treating as empty");
            (Vec::new(), sha)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contents_with_records_decode() {
        let records = vec![json!({"id": "1", "nome": "Ana"})];
        let file = ContentsFile {
            content: Some(quadro_engine::encode_records(&records)),
            sha: Some("abc".to_string()),
        };

        let (decoded, sha) = interpret_contents("candidatos.json", file);
        assert_eq!(decoded, records);
        assert_eq!(sha.as_deref(), Some("abc"));
    }

    #[test]
    fn empty_content_keeps_the_version_token() {
        // An existing-but-empty file still carries a sha; distinguishable
        // from a 404 which yields no token at all.
        let file = ContentsFile {
            content: Some(String::new()),
            sha: Some("abc".to_string()),
        };

        let (decoded, sha) = interpret_contents("candidatos.json", file);
        assert!(decoded.is_empty());
        assert_eq!(sha.as_deref(), Some("abc"));
    }

    #[test]
    fn malformed_content_degrades_to_empty() {
        let file = ContentsFile {
            content: Some("!!! not base64 !!!".to_string()),
            sha: Some("abc".to_string()),
        };

        let (decoded, sha) = interpret_contents("candidatos.json", file);
        assert!(decoded.is_empty());
        assert_eq!(sha.as_deref(), Some("abc"));
    }
}

//! GitHub-backed implementation of the content store.
//!
//! Uses the Contents API for listings, file reads and writes, and the
//! Commits API for history. Writes go through `PUT /contents/{path}` with
//! a base64 payload; updates carry the expected blob SHA so GitHub's own
//! optimistic-concurrency check rejects stale writes.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::types::{CommitInfo, FileNode, NodeKind};
use super::{ContentStore, StoreError};

const API_BASE: &str = "https://api.github.com";

/// Content store client for a single GitHub repository.
pub struct GithubStore {
    client: Client,
    token: String,
    owner: String,
    repo: String,
    api_base: String,
}

impl GithubStore {
    /// Create a client for `owner/repo`, authenticated with `token`.
    pub fn new(token: String, owner: String, repo: String) -> Self {
        Self {
            client: Client::new(),
            token,
            owner,
            repo,
            api_base: API_BASE.to_string(),
        }
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    fn apply_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "vanguard-portal");
        if self.token.is_empty() {
            req
        } else {
            req.header("Authorization", format!("Bearer {}", self.token))
        }
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<(StatusCode, String), StoreError> {
        let response = self.apply_headers(req).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Network(format!("request timeout: {}", e))
            } else if e.is_connect() {
                StoreError::Network(format!("connection failed: {}", e))
            } else {
                StoreError::Network(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            Ok((status, body))
        } else if status == StatusCode::NOT_FOUND {
            Err(StoreError::NotFound(path.to_string()))
        } else {
            Err(StoreError::Api {
                status: status.as_u16(),
                message: truncate_body(&body),
            })
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, StoreError> {
        serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentStore for GithubStore {
    async fn list_dir(&self, path: &str) -> Result<Vec<FileNode>, StoreError> {
        let req = self.client.get(self.contents_url(path));
        let (_, body) = self.send(req, path).await?;

        match Self::parse::<ContentsResponse>(&body)? {
            ContentsResponse::Dir(entries) => Ok(entries
                .into_iter()
                .map(|e| FileNode {
                    name: e.name,
                    path: e.path,
                    kind: e.kind,
                    sha: e.sha,
                    size: e.size,
                    url: e.download_url,
                })
                .collect()),
            // Listing a file path is not an error upstream; treat it as empty.
            ContentsResponse::File(_) => Ok(Vec::new()),
        }
    }

    async fn file_content(&self, path: &str) -> Result<String, StoreError> {
        let req = self.client.get(self.contents_url(path));
        let (_, body) = self.send(req, path).await?;

        match Self::parse::<ContentsResponse>(&body)? {
            ContentsResponse::File(file) => {
                let raw: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = BASE64
                    .decode(raw)
                    .map_err(|e| StoreError::Decode(format!("base64: {}", e)))?;
                String::from_utf8(bytes).map_err(|e| StoreError::Decode(format!("utf-8: {}", e)))
            }
            ContentsResponse::Dir(_) => Err(StoreError::Decode(format!(
                "expected a file at {}, found a directory",
                path
            ))),
        }
    }

    async fn file_sha(&self, path: &str) -> Result<String, StoreError> {
        let req = self.client.get(self.contents_url(path));
        let (_, body) = self.send(req, path).await?;

        match Self::parse::<ContentsResponse>(&body)? {
            ContentsResponse::File(file) => Ok(file.sha),
            ContentsResponse::Dir(_) => Err(StoreError::Decode(format!(
                "expected a file at {}, found a directory",
                path
            ))),
        }
    }

    async fn history(&self, path: &str, limit: usize) -> Result<Vec<CommitInfo>, StoreError> {
        let url = format!(
            "{}/repos/{}/{}/commits",
            self.api_base, self.owner, self.repo
        );
        let mut req = self
            .client
            .get(url)
            .query(&[("per_page", limit.to_string())]);
        if !path.is_empty() {
            req = req.query(&[("path", path)]);
        }
        let (_, body) = self.send(req, path).await?;

        let commits: Vec<RawCommit> = Self::parse(&body)?;
        Ok(commits
            .into_iter()
            .map(|c| {
                let author = c.commit.author.as_ref();
                CommitInfo {
                    sha: c.sha,
                    message: c.commit.message,
                    author: author
                        .and_then(|a| a.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    date: author
                        .and_then(|a| a.date.clone())
                        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
                    url: c.html_url,
                }
            })
            .collect())
    }

    async fn update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), StoreError> {
        let payload = WritePayload {
            message,
            content: BASE64.encode(content),
            sha: Some(sha),
        };
        let req = self.client.put(self.contents_url(path)).json(&payload);
        match self.send(req, path).await {
            Ok(_) => Ok(()),
            // 409/422 from the contents PUT means the expected SHA is stale.
            Err(StoreError::Api { status: 409 | 422, .. }) => Err(StoreError::Conflict {
                path: path.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn create_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), StoreError> {
        let payload = WritePayload {
            message,
            content: BASE64.encode(content),
            sha: None,
        };
        let req = self.client.put(self.contents_url(path)).json(&payload);
        match self.send(req, path).await {
            Ok(_) => Ok(()),
            Err(StoreError::Api { status: 409 | 422, .. }) => Err(StoreError::Conflict {
                path: path.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 300;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

/// Contents API response: an array for directories, an object for files.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Dir(Vec<RawEntry>),
    File(RawFile),
}

#[derive(Deserialize)]
struct RawEntry {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    size: Option<u64>,
    download_url: Option<String>,
}

#[derive(Deserialize)]
struct RawFile {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct WritePayload<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct RawCommit {
    sha: String,
    html_url: String,
    commit: RawCommitDetail,
}

#[derive(Deserialize)]
struct RawCommitDetail {
    message: String,
    author: Option<RawCommitAuthor>,
}

#[derive(Deserialize)]
struct RawCommitAuthor {
    name: Option<String>,
    date: Option<String>,
}

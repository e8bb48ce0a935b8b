//! Repository metadata from the GitHub REST API
//!
//! The project store only sees the [`RepoMetadataSource`] trait, so tests and
//! offline builds can substitute their own source. [`GitHubClient`] is the
//! network implementation; every request is bounded by the client timeout.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::GitHubConfig;

/// User-Agent header value for API requests
const USER_AGENT_VALUE: &str = concat!("website/", env!("CARGO_PKG_VERSION"));

/// Errors from fetching repository metadata
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// What the site needs to know about a hosted repository
#[derive(Debug, Clone, PartialEq)]
pub struct RepoMetadata {
    pub owner: String,
    pub html_url: String,
    pub description: Option<String>,
    /// Languages by descending byte count
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    html_url: String,
    description: Option<String>,
    owner: OwnerResponse,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

impl RepoMetadata {
    /// Build metadata from raw API response bodies: the repository document
    /// and the `languages` document (a map of language to byte count).
    pub fn from_api_bytes(repo_json: &[u8], languages_json: &[u8]) -> Result<Self, FetchError> {
        let repo: RepoResponse =
            serde_json::from_slice(repo_json).map_err(|e| FetchError::Decode(e.to_string()))?;
        let languages: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(languages_json)
                .map_err(|e| FetchError::Decode(e.to_string()))?;

        let mut by_size: Vec<(String, u64)> = languages
            .into_iter()
            .map(|(name, bytes)| (name, bytes.as_u64().unwrap_or(0)))
            .collect();
        by_size.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            owner: repo.owner.login,
            html_url: repo.html_url,
            description: repo.description,
            languages: by_size.into_iter().map(|(name, _)| name).collect(),
        })
    }
}

/// A source of repository metadata
#[async_trait]
pub trait RepoMetadataSource: Send + Sync {
    async fn fetch(&self, owner: &str, repo: &str) -> Result<RepoMetadata, FetchError>;
}

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl GitHubClient {
    pub fn new(
        api_base: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build a client from configuration, reading the token from the
    /// environment variable it names.
    pub fn from_config(config: &GitHubConfig) -> Result<Self, FetchError> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(
                "{} is not set; GitHub requests are unauthenticated",
                config.token_env
            );
        }
        Self::new(
            config.api_base.clone(),
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}{}", self.api_base, path);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, USER_AGENT_VALUE);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(map_request_error)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(map_request_error)?;
        Ok(body.to_vec())
    }
}

fn map_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}

#[async_trait]
impl RepoMetadataSource for GitHubClient {
    async fn fetch(&self, owner: &str, repo: &str) -> Result<RepoMetadata, FetchError> {
        let repo_json = self.get_bytes(&format!("/repos/{}/{}", owner, repo)).await?;
        let languages_json = self
            .get_bytes(&format!("/repos/{}/{}/languages", owner, repo))
            .await?;
        RepoMetadata::from_api_bytes(&repo_json, &languages_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo_body() -> serde_json::Value {
        json!({
            "name": "hello",
            "html_url": "https://github.com/octo/hello",
            "description": "Says hello",
            "owner": { "login": "octo" }
        })
    }

    #[test]
    fn test_from_api_bytes_sorts_languages() {
        let repo = serde_json::to_vec(&repo_body()).unwrap();
        let languages = br#"{"CSS": 120, "Rust": 9000, "Shell": 120, "HTML": 800}"#;

        let metadata = RepoMetadata::from_api_bytes(&repo, languages).unwrap();
        assert_eq!(metadata.owner, "octo");
        assert_eq!(metadata.html_url, "https://github.com/octo/hello");
        assert_eq!(metadata.description.as_deref(), Some("Says hello"));
        assert_eq!(metadata.languages, vec!["Rust", "HTML", "CSS", "Shell"]);
    }

    #[test]
    fn test_from_api_bytes_rejects_garbage() {
        let err = RepoMetadata::from_api_bytes(b"not json", b"{}").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_from_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/hello"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(repo_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/hello/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Rust": 10})))
            .mount(&server)
            .await;

        let client = GitHubClient::new(
            server.uri(),
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let metadata = client.fetch("octo", "hello").await.unwrap();
        assert_eq!(metadata.languages, vec!["Rust"]);
        assert_eq!(metadata.owner, "octo");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        let err = client.fetch("octo", "missing").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        match client.fetch("octo", "hello").await.unwrap_err() {
            FetchError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(repo_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), None, Duration::from_millis(100)).unwrap();
        let err = client.fetch("octo", "hello").await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }
}

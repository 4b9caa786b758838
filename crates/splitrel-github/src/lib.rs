//! GitHub REST API transport for splitrel.
//!
//! [`GithubClient`] owns one blocking HTTP client and the endpoint bases. It
//! knows how to address the endpoints splitrel uses and attaches the headers
//! every GitHub call needs, but it does not interpret status codes: callers
//! decide what a 404 or a non-201 means for their workflow.
//!
//! # Example
//!
//! ```no_run
//! use splitrel_github::GithubClient;
//! use splitrel_types::Project;
//!
//! let client = GithubClient::new(Some("ghp_example".to_string())).expect("client");
//! let project = Project::new("acme", "widget");
//! let response = client.get(&client.latest_release_url(&project)).expect("request");
//! println!("{}", response.status);
//! ```

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use splitrel_types::Project;
use thiserror::Error;

pub mod wire;

/// Default API endpoint for github.com
pub const GITHUB_API: &str = "https://api.github.com";

/// Default endpoint serving raw repository contents
pub const GITHUB_RAW: &str = "https://raw.githubusercontent.com";

/// Default web endpoint
pub const GITHUB_HTML: &str = "https://github.com";

/// REST API version sent with every request
pub const API_VERSION: &str = "2022-11-28";

/// Media type requested from the REST API
pub const ACCEPT: &str = "application/vnd.github+json";

/// Default timeout for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for API requests
pub const USER_AGENT: &str = concat!("splitrel/", env!("CARGO_PKG_VERSION"));

/// Response header listing the permissions an endpoint accepts
pub const ACCEPTED_PERMISSIONS_HEADER: &str = "X-Accepted-GitHub-Permissions";

/// Transport-level failures. HTTP status codes are not errors at this layer.
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to encode request body for {url}")]
    Encode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Requested URL, including the query string
    pub url: String,
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// Value of `X-Accepted-GitHub-Permissions`, when present
    pub accepted_permissions: Option<String>,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }

    pub fn is_created(&self) -> bool {
        self.status == StatusCode::CREATED.as_u16()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GithubError> {
        serde_json::from_str(&self.body).map_err(|source| GithubError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

/// GitHub API client shared by every workflow step.
#[derive(Debug, Clone)]
pub struct GithubClient {
    api_base: String,
    raw_base: String,
    html_base: String,
    api_version: String,
    token: Option<String>,
    http: Client,
}

impl GithubClient {
    /// Create a client for github.com.
    pub fn new(token: Option<String>) -> Result<Self, GithubError> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            api_base: GITHUB_API.to_string(),
            raw_base: GITHUB_RAW.to_string(),
            html_base: GITHUB_HTML.to_string(),
            api_version: API_VERSION.to_string(),
            token,
            http: build_http(timeout)?,
        })
    }

    /// Set the REST API base URL
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Set the raw contents base URL
    pub fn with_raw_base(mut self, base: &str) -> Self {
        self.raw_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Set the web base URL used for generated links
    pub fn with_html_base(mut self, base: &str) -> Self {
        self.html_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, GithubError> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    pub fn html_base(&self) -> &str {
        &self.html_base
    }

    /// `<raw>/<org>/<name>/<branch>/<file>`
    pub fn split_file_url(&self, project: &Project, branch: &str, file: &str) -> String {
        format!("{}/{}/{}/{}", self.raw_base, project, branch, file)
    }

    pub fn latest_release_url(&self, project: &Project) -> String {
        format!("{}/repos/{}/releases/latest", self.api_base, project)
    }

    pub fn commits_url(&self, project: &Project) -> String {
        format!("{}/repos/{}/commits", self.api_base, project)
    }

    pub fn commit_pulls_url(&self, project: &Project, sha: &str) -> String {
        format!("{}/repos/{}/commits/{}/pulls", self.api_base, project, sha)
    }

    pub fn compare_url(&self, project: &Project, base: &str, head: &str) -> String {
        format!("{}/repos/{}/compare/{}...{}", self.api_base, project, base, head)
    }

    pub fn matching_refs_url(&self, project: &Project, branch: &str) -> String {
        format!(
            "{}/repos/{}/git/matching-refs/heads/{}",
            self.api_base, project, branch
        )
    }

    pub fn releases_url(&self, project: &Project) -> String {
        format!("{}/repos/{}/releases", self.api_base, project)
    }

    pub fn git_tags_url(&self, project: &Project) -> String {
        format!("{}/repos/{}/git/tags", self.api_base, project)
    }

    pub fn git_refs_url(&self, project: &Project) -> String {
        format!("{}/repos/{}/git/refs", self.api_base, project)
    }

    /// Send a GET request.
    pub fn get(&self, url: &str) -> Result<ApiResponse, GithubError> {
        tracing::debug!(method = "GET", %url, "http request");
        let request = self.authorize(self.http.get(url));
        self.execute(url, request)
    }

    /// Send a GET request with URL-encoded query parameters appended.
    pub fn get_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, GithubError> {
        if query.is_empty() {
            return self.get(url);
        }
        let full = reqwest::Url::parse_with_params(url, query).map_err(|e| {
            GithubError::InvalidUrl {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;
        self.get(full.as_str())
    }

    /// POST a JSON body.
    pub fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<ApiResponse, GithubError> {
        let body = serde_json::to_string(body).map_err(|source| GithubError::Encode {
            url: url.to_string(),
            source,
        })?;
        tracing::debug!(method = "POST", %url, "http request");
        tracing::trace!(%body, "http request body");

        let request = self
            .authorize(self.http.post(url))
            .header("Content-Type", "application/json")
            .body(body);
        self.execute(url, request)
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        let request = request
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", &self.api_version);
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn execute(
        &self,
        url: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<ApiResponse, GithubError> {
        let transport = |source| GithubError::Transport {
            url: url.to_string(),
            source,
        };
        let response = request.send().map_err(transport)?;
        let status = response.status().as_u16();
        let accepted_permissions = response
            .headers()
            .get(ACCEPTED_PERMISSIONS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().map_err(transport)?;
        tracing::debug!(%url, status, bytes = body.len(), "http response");

        Ok(ApiResponse {
            url: url.to_string(),
            status,
            body,
            accepted_permissions,
        })
    }
}

fn build_http(timeout: Duration) -> Result<Client, GithubError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(GithubError::Client)
}

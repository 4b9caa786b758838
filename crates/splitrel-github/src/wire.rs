//! Request and response shapes of the GitHub endpoints splitrel calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}/releases/latest`
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseResponse {
    pub tag_name: String,
    pub published_at: DateTime<Utc>,
}

/// One row of `GET /repos/{owner}/{repo}/commits` and of `compare.commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRow {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
}

/// One row of `GET /repos/{owner}/{repo}/commits/{sha}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRow {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub user: UserRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub login: String,
}

/// `GET /repos/{owner}/{repo}/compare/{base}...{head}`
#[derive(Debug, Clone, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub commits: Vec<CommitRow>,
}

/// One row of `GET /repos/{owner}/{repo}/git/matching-refs/heads/{branch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefRow {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: RefObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefObject {
    pub sha: String,
}

/// `201` body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRelease {
    pub html_url: String,
}

/// `201` body of `POST /repos/{owner}/{repo}/git/tags`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTag {
    pub url: String,
    pub sha: String,
    pub tag: String,
}

/// `201` body of `POST /repos/{owner}/{repo}/git/refs`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRef {
    pub url: String,
    #[serde(rename = "ref")]
    pub name: String,
}

/// The API takes `make_latest` as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MakeLatest {
    #[serde(rename = "true")]
    True,
    #[serde(rename = "false")]
    False,
}

impl From<bool> for MakeLatest {
    fn from(value: bool) -> Self {
        if value {
            MakeLatest::True
        } else {
            MakeLatest::False
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePayload {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
    pub generate_release_notes: bool,
    pub make_latest: MakeLatest,
}

impl ReleasePayload {
    /// Release named `Release <version>`; never a prerelease and never
    /// using GitHub-generated notes.
    pub fn new(
        version: &str,
        target_branch: &str,
        notes: &str,
        draft: bool,
        make_latest: MakeLatest,
    ) -> Self {
        Self {
            tag_name: version.to_string(),
            target_commitish: target_branch.to_string(),
            name: format!("Release {version}"),
            body: notes.to_string(),
            draft,
            prerelease: false,
            generate_release_notes: false,
            make_latest,
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/git/tags` (annotated tag object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagPayload {
    pub tag: String,
    pub message: String,
    /// SHA of the tagged commit
    pub object: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TagPayload {
    pub fn commit(tag: &str, sha: &str) -> Self {
        Self {
            tag: tag.to_string(),
            message: format!("Tagging {tag}"),
            object: sha.to_string(),
            kind: "commit".to_string(),
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/git/refs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefPayload {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

impl RefPayload {
    /// `refs/tags/<tag>` pointing at `sha`.
    pub fn tag(tag: &str, sha: &str) -> Self {
        Self {
            name: format!("refs/tags/{tag}"),
            sha: sha.to_string(),
        }
    }
}

use splitrel_github::GithubClient;
use splitrel_github::wire::PullRow;
use splitrel_types::{PullRequest, Repository};

use crate::engine::Reporter;
use crate::error::{ReleaseError, Result};

/// Find the pull request a commit of `repository`'s upstream came from.
///
/// A commit associated with several pull requests resolves to the first one
/// the API lists.
pub fn pull_request(
    client: &GithubClient,
    repository: &Repository,
    sha: &str,
    reporter: &mut dyn Reporter,
) -> Result<PullRequest> {
    let url = client.commit_pulls_url(&repository.upstream, sha);
    let response = client.get(&url)?;

    if response.is_not_found() {
        return Err(ReleaseError::PullRequestNotFound {
            sha: sha.to_string(),
        });
    }
    if !response.is_ok() {
        tracing::debug!(%url, body = %response.body, "pull request lookup failed");
        return Err(ReleaseError::PullRequestFetch {
            sha: sha.to_string(),
            status: response.status,
            body: response.body,
        });
    }

    let rows: Vec<PullRow> = response.json()?;
    if rows.len() > 1 {
        reporter.warn(&format!("multiple PRs for commit {sha}, choosing first..."));
    }
    let Some(row) = rows.into_iter().next() else {
        return Err(ReleaseError::PullRequestNotFound {
            sha: sha.to_string(),
        });
    };

    Ok(PullRequest {
        id: row.number.to_string(),
        url: row.html_url,
        title: row.title,
        author: row.user.login,
    })
}

//! Release and commit history of split repositories.

use splitrel_github::GithubClient;
use splitrel_github::wire::{CommitRow, ReleaseResponse};
use splitrel_types::{Commit, CommitSource, Project, Release, Repository};

use crate::engine::Reporter;
use crate::error::{ReleaseError, Result};
use crate::pulls;

/// Latest published release of `project`, or `None` if it never released.
pub fn latest_release(
    client: &GithubClient,
    project: &Project,
    reporter: &mut dyn Reporter,
) -> Result<Option<Release>> {
    let response = client.get(&client.latest_release_url(project))?;

    if response.is_not_found() {
        reporter.info(&format!("no latest release found for {project}"));
        return Ok(None);
    }
    if !response.is_ok() {
        return Err(ReleaseError::ReleaseFetch {
            project: project.clone(),
            status: response.status,
            body: response.body,
        });
    }

    let data: ReleaseResponse = response.json()?;
    let release = Release::new(data.tag_name, data.published_at);
    tracing::debug!(%project, %release, "latest release");
    Ok(Some(release))
}

/// Commits made since the repository's latest release, each annotated with
/// its pull request, in API order.
///
/// [`CommitSource::Upstream`] reads the monorepo history restricted to the
/// split path; [`CommitSource::Downstream`] reads the whole split target.
pub fn unreleased_commits(
    client: &GithubClient,
    repository: &Repository,
    source: CommitSource,
    reporter: &mut dyn Reporter,
) -> Result<Vec<Commit>> {
    let since = repository.latest_release.as_ref().map(Release::since);

    let (url, mut query) = match source {
        CommitSource::Upstream => (
            client.commits_url(&repository.upstream),
            vec![("path", repository.path.as_str())],
        ),
        CommitSource::Downstream => (client.commits_url(&repository.downstream), Vec::new()),
    };
    if let Some(since) = &since {
        query.push(("since", since.as_str()));
    }

    let response = client.get_with_query(&url, &query)?;
    if !response.is_ok() {
        return Err(ReleaseError::Fetch {
            url: response.url,
            status: response.status,
            body: response.body,
        });
    }

    let rows: Vec<CommitRow> = response.json()?;
    let mut commits = Vec::with_capacity(rows.len());
    for row in rows {
        let pull_request = pulls::pull_request(client, repository, &row.sha, reporter)?;
        commits.push(Commit {
            sha: row.sha,
            message: row.commit.message,
            pull_request: Some(pull_request),
        });
    }

    Ok(commits)
}

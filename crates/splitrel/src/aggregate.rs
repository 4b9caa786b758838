use splitrel_github::GithubClient;
use splitrel_types::{CommitSource, Repository};

use crate::engine::Reporter;
use crate::error::Result;
use crate::history;

/// Fill in the latest downstream release and the unreleased upstream
/// commits since it.
///
/// Any failure, including a commit without a pull request, aborts the
/// aggregation for this repository.
pub fn populate(
    client: &GithubClient,
    repository: Repository,
    reporter: &mut dyn Reporter,
) -> Result<Repository> {
    let mut repository = populate_latest(client, repository, reporter)?;
    repository.commits =
        history::unreleased_commits(client, &repository, CommitSource::Upstream, reporter)?;
    tracing::debug!(
        downstream = %repository.downstream,
        commits = repository.commits.len(),
        "unreleased commits"
    );
    Ok(repository)
}

/// Fill in the latest downstream release only.
pub fn populate_latest(
    client: &GithubClient,
    mut repository: Repository,
    reporter: &mut dyn Reporter,
) -> Result<Repository> {
    repository.latest_release = history::latest_release(client, &repository.downstream, reporter)?;
    Ok(repository)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use splitrel_types::Project;

    use super::*;
    use crate::error::ReleaseError;
    use crate::test_support::{
        CollectingReporter, client, commit_json, pull_json, release_json, route,
        spawn_github_server,
    };

    fn repository() -> Repository {
        Repository::new(
            Project::new("acme", "mono"),
            "src/A",
            Project::new("acme", "a"),
        )
    }

    #[test]
    fn populate_sets_release_then_commits() {
        let mut routes = BTreeMap::new();
        route(
            &mut routes,
            "/repos/acme/a/releases/latest",
            200,
            &release_json("1.2.0", "2024-05-06T07:08:09Z"),
        );
        route(
            &mut routes,
            "/repos/acme/mono/commits?path=src%2FA&since=2024-05-06T07%3A08%3A09Z",
            200,
            &format!("[{}]", commit_json("abc", "Fix bug (#42)")),
        );
        route(
            &mut routes,
            "/repos/acme/mono/commits/abc/pulls",
            200,
            &format!("[{}]", pull_json(42, "Fix bug", "alice")),
        );
        let server = spawn_github_server(routes, 3);
        let mut reporter = CollectingReporter::default();

        let repo = populate(&client(&server.base_url), repository(), &mut reporter).expect("populate");
        let seen = server.join();

        let urls: Vec<&str> = seen.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "/repos/acme/a/releases/latest",
                "/repos/acme/mono/commits?path=src%2FA&since=2024-05-06T07%3A08%3A09Z",
                "/repos/acme/mono/commits/abc/pulls",
            ]
        );
        assert_eq!(repo.previous_version(), "1.2.0");
        assert_eq!(repo.commits.len(), 1);
        assert_eq!(repo.commits[0].pull_request.as_ref().map(|p| p.title.as_str()), Some("Fix bug"));
        assert!(repo.diff.is_empty());
    }

    #[test]
    fn populate_propagates_release_fetch_error() {
        let mut routes = BTreeMap::new();
        route(&mut routes, "/repos/acme/a/releases/latest", 502, "bad gateway");
        let server = spawn_github_server(routes, 1);
        let mut reporter = CollectingReporter::default();

        let err = populate(&client(&server.base_url), repository(), &mut reporter)
            .expect_err("must fail");
        let seen = server.join();

        assert_eq!(seen.len(), 1);
        assert!(matches!(err, ReleaseError::ReleaseFetch { status: 502, .. }));
    }

    #[test]
    fn populate_latest_skips_commits() {
        let server = spawn_github_server(BTreeMap::new(), 1);
        let mut reporter = CollectingReporter::default();

        let repo = populate_latest(&client(&server.base_url), repository(), &mut reporter)
            .expect("populate");
        let seen = server.join();

        assert_eq!(seen.len(), 1);
        assert!(repo.latest_release.is_none());
        assert!(repo.commits.is_empty());
    }
}

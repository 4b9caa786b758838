//! Cross-check of date-based discovery against the downstream commit range.
//!
//! Splitting rewrites commits, so the upstream commits found by date cannot
//! be matched by SHA. The only shared key is the commit message: every
//! message in `<latest tag>...<branch>` of the downstream should also appear
//! among the unreleased upstream commits.

use std::collections::HashMap;

use splitrel_github::GithubClient;
use splitrel_github::wire::CompareResponse;
use splitrel_types::{Commit, Decision, Diff, Repository};

use crate::engine::Reporter;
use crate::error::Result;
use crate::prompt::Prompter;

/// Commit range between the latest downstream release and `branch`.
///
/// A repository without a release has nothing to compare against. A failed
/// comparison is reported and yields an empty diff.
pub fn compute_diff(
    client: &GithubClient,
    repository: &Repository,
    branch: &str,
    reporter: &mut dyn Reporter,
) -> Result<Diff> {
    let Some(release) = &repository.latest_release else {
        return Ok(Diff::default());
    };

    let url = client.compare_url(&repository.downstream, &release.version, branch);
    let response = client.get(&url)?;
    if !response.is_ok() {
        reporter.error(&format!(
            "failed to compare {} {} with {branch} ({}): {}",
            repository.downstream, release.version, response.status, response.body
        ));
        return Ok(Diff::default());
    }

    let data: CompareResponse = response.json()?;
    Ok(Diff {
        commits: data
            .commits
            .into_iter()
            .map(|row| Commit::new(row.sha, row.commit.message))
            .collect(),
    })
}

/// Decide whether the unreleased commits account for the whole diff.
///
/// Messages are compared as multisets: a message appearing twice in the
/// diff needs two matching commits. Unmatched messages are returned in diff
/// order.
pub fn reconcile(repository: &Repository) -> Decision {
    if repository.latest_release.is_none() {
        return Decision::Proceed;
    }
    if repository.diff.is_empty() && repository.commits.is_empty() {
        return Decision::Proceed;
    }

    let mut available: HashMap<&str, usize> = HashMap::new();
    for commit in &repository.commits {
        *available.entry(commit.message.as_str()).or_default() += 1;
    }

    let mut differences = Vec::new();
    for commit in &repository.diff.commits {
        match available.get_mut(commit.message.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => differences.push(commit.message.clone()),
        }
    }

    tracing::debug!(
        downstream = %repository.downstream,
        diff = ?repository.diff.commits.iter().map(|c| c.message.as_str()).collect::<Vec<_>>(),
        found = ?repository.commits.iter().map(|c| c.message.as_str()).collect::<Vec<_>>(),
        "compare"
    );

    if differences.is_empty() {
        Decision::Proceed
    } else {
        Decision::ProceedWithWarning { differences }
    }
}

/// Put a warning in front of the operator.
///
/// `ProceedWithWarning` stays as is when the operator agrees to continue and
/// becomes `Abort` otherwise. The prompt defaults to no, so an unattended run
/// aborts. Other decisions pass through without a prompt.
pub fn confirm(decision: Decision, prompter: &mut dyn Prompter) -> Decision {
    match decision {
        Decision::ProceedWithWarning { differences } => {
            if prompter.ask_bool("Continue anyway", false) {
                Decision::ProceedWithWarning { differences }
            } else {
                Decision::Abort { differences }
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use proptest::prelude::*;
    use splitrel_types::{Project, Release};

    use super::*;
    use crate::test_support::{
        CollectingReporter, client, commit_json, route, scripted, spawn_github_server,
    };

    fn repository(released: bool, diff: &[&str], commits: &[&str]) -> Repository {
        let mut repo = Repository::new(
            Project::new("acme", "mono"),
            "src/A",
            Project::new("acme", "a"),
        );
        if released {
            repo.latest_release = Some(Release::new("1.2.0", Utc::now()));
        }
        repo.diff = Diff {
            commits: diff.iter().map(|m| Commit::new("d", *m)).collect(),
        };
        repo.commits = commits.iter().map(|m| Commit::new("u", *m)).collect();
        repo
    }

    #[test]
    fn no_release_always_proceeds() {
        let repo = repository(false, &["x"], &[]);
        assert_eq!(reconcile(&repo), Decision::Proceed);
    }

    #[test]
    fn nothing_to_compare_proceeds() {
        assert_eq!(reconcile(&repository(true, &[], &[])), Decision::Proceed);
    }

    #[test]
    fn covered_diff_proceeds() {
        let repo = repository(true, &["a", "b"], &["b", "c", "a"]);
        assert_eq!(reconcile(&repo), Decision::Proceed);
    }

    #[test]
    fn missing_messages_warn_in_diff_order() {
        let repo = repository(true, &["z", "a", "y"], &["a"]);
        assert_eq!(
            reconcile(&repo),
            Decision::ProceedWithWarning {
                differences: vec!["z".to_string(), "y".to_string()]
            }
        );
    }

    #[test]
    fn duplicate_messages_count() {
        let repo = repository(true, &["Bump deps", "Bump deps"], &["Bump deps"]);
        assert_eq!(
            reconcile(&repo),
            Decision::ProceedWithWarning {
                differences: vec!["Bump deps".to_string()]
            }
        );
    }

    #[test]
    fn compute_diff_without_release_makes_no_call() {
        let server = spawn_github_server(BTreeMap::new(), 0);
        let mut reporter = CollectingReporter::default();

        let diff = compute_diff(
            &client(&server.base_url),
            &repository(false, &[], &[]),
            "main",
            &mut reporter,
        )
        .expect("diff");

        assert!(diff.is_empty());
        assert!(server.join().is_empty());
    }

    #[test]
    fn compute_diff_parses_compare() {
        let mut routes = BTreeMap::new();
        route(
            &mut routes,
            "/repos/acme/a/compare/1.2.0...main",
            200,
            &format!(
                r#"{{"status":"ahead","commits":[{},{}]}}"#,
                commit_json("s1", "Fix bug (#42)"),
                commit_json("s2", "Add feature (#43)\n\ndetails")
            ),
        );
        let server = spawn_github_server(routes, 1);
        let mut reporter = CollectingReporter::default();

        let diff = compute_diff(
            &client(&server.base_url),
            &repository(true, &[], &[]),
            "main",
            &mut reporter,
        )
        .expect("diff");
        server.join();

        assert_eq!(diff.commits.len(), 2);
        assert_eq!(diff.commits[1].sha, "s2");
        assert_eq!(diff.commits[1].message, "Add feature (#43)\n\ndetails");
        assert!(diff.commits.iter().all(|c| c.pull_request.is_none()));
    }

    #[test]
    fn compute_diff_failure_is_advisory() {
        let mut routes = BTreeMap::new();
        route(&mut routes, "/repos/acme/a/compare/1.2.0...develop", 404, "No common ancestor");
        let server = spawn_github_server(routes, 1);
        let mut reporter = CollectingReporter::default();

        let diff = compute_diff(
            &client(&server.base_url),
            &repository(true, &[], &[]),
            "develop",
            &mut reporter,
        )
        .expect("diff");
        server.join();

        assert!(diff.is_empty());
        assert_eq!(
            reporter.errors,
            ["failed to compare acme/a 1.2.0 with develop (404): No common ancestor"]
        );
    }

    #[test]
    fn confirm_declined_warning_aborts() {
        let warning = Decision::ProceedWithWarning {
            differences: vec!["Hotfix".to_string()],
        };

        let mut prompter = scripted("");
        assert_eq!(
            confirm(warning.clone(), &mut prompter),
            Decision::Abort {
                differences: vec!["Hotfix".to_string()],
            }
        );
        assert_eq!(String::from_utf8_lossy(prompter.output()), "Continue anyway (y/N)? \n");

        let mut prompter = scripted("y\n");
        assert_eq!(confirm(warning, &mut prompter), Decision::ProceedWithWarning {
            differences: vec!["Hotfix".to_string()],
        });
    }

    #[test]
    fn confirm_passes_proceed_without_prompting() {
        let mut prompter = scripted("n\n");
        assert_eq!(confirm(Decision::Proceed, &mut prompter), Decision::Proceed);
        assert!(prompter.output().is_empty());
    }

    fn messages() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-d]{1,2}", 0..8)
    }

    proptest! {
        #[test]
        fn covered_subset_always_proceeds(commits in messages(), picks in prop::collection::vec(any::<prop::sample::Index>(), 0..8)) {
            // Draw the diff without replacement from the commits.
            let mut pool = commits.clone();
            let mut diff = Vec::new();
            for pick in picks {
                if pool.is_empty() {
                    break;
                }
                diff.push(pool.remove(pick.index(pool.len())));
            }
            let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();
            let commit_refs: Vec<&str> = commits.iter().map(String::as_str).collect();
            prop_assert_eq!(reconcile(&repository(true, &diff_refs, &commit_refs)), Decision::Proceed);
        }

        #[test]
        fn differences_come_from_diff(diff in messages(), commits in messages()) {
            let diff_refs: Vec<&str> = diff.iter().map(String::as_str).collect();
            let commit_refs: Vec<&str> = commits.iter().map(String::as_str).collect();
            match reconcile(&repository(true, &diff_refs, &commit_refs)) {
                Decision::Proceed => prop_assert!(diff.len() <= commits.len() || diff.is_empty()),
                Decision::ProceedWithWarning { differences } => {
                    prop_assert!(!differences.is_empty());
                    prop_assert!(differences.len() <= diff.len());
                    prop_assert!(differences.len() >= diff.len().saturating_sub(commits.len()));
                    for d in &differences {
                        prop_assert!(diff.contains(d));
                    }
                }
                Decision::Abort { .. } => prop_assert!(false, "reconcile never aborts"),
            }
        }
    }
}

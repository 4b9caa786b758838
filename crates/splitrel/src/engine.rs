//! The release run: discover, evaluate and publish each split repository.
//!
//! Each repository moves through
//! `Evaluating -> AwaitingVersionInput -> AwaitingConfirmations -> Publishing`
//! and ends as one [`Outcome`]. A repository that fails never stops the
//! batch; only discovery failures abort the whole run.

use splitrel_github::GithubClient;
use splitrel_github::wire::{CreatedRelease, ReleasePayload};
use splitrel_types::{Decision, Outcome, Project, Repository, RunSummary};

use crate::aggregate;
use crate::diff;
use crate::error::{ReleaseError, Result};
use crate::notes;
use crate::prompt::Prompter;
use crate::splitmap;

pub trait Reporter {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
}

/// Options of a release run.
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Branch to tag off and compare against
    pub branch: String,
    /// Split mapping file name in each source monorepo
    pub split_file: String,
    /// Only handle split prefixes containing this (case-insensitive)
    pub filter: Option<String>,
    /// Report the release calls instead of making them
    pub dry_run: bool,
    /// Prompt for a version even without unreleased commits
    pub force: bool,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            split_file: ".gitsplit.yml".to_string(),
            filter: None,
            dry_run: false,
            force: false,
        }
    }
}

/// Run the release workflow over every repository split from `sources`.
///
/// Fails only when discovery fails or finds nothing; per-repository results
/// are in the returned summary.
pub fn run_release(
    client: &GithubClient,
    sources: &[Project],
    opts: &ReleaseOptions,
    reporter: &mut dyn Reporter,
    prompter: &mut dyn Prompter,
) -> Result<RunSummary> {
    let repositories = splitmap::resolve(
        client,
        sources,
        &opts.branch,
        &opts.split_file,
        opts.filter.as_deref(),
        reporter,
    )?;
    if repositories.is_empty() {
        return Err(ReleaseError::NoRepositories);
    }
    reporter.info(&format!("found {} repositories", repositories.len()));

    let mut summary = RunSummary::default();
    for repository in repositories {
        let downstream = repository.downstream.clone();
        let outcome = release_repository(client, repository, opts, reporter, prompter);
        tracing::debug!(%downstream, %outcome, "repository done");
        summary.record(downstream, outcome);
    }

    Ok(summary)
}

/// Evaluate and, if the operator agrees, publish one repository.
pub fn release_repository(
    client: &GithubClient,
    repository: Repository,
    opts: &ReleaseOptions,
    reporter: &mut dyn Reporter,
    prompter: &mut dyn Prompter,
) -> Outcome {
    let downstream = repository.downstream.clone();
    tracing::debug!(%downstream, path = %repository.path, "processing");

    let repository = match evaluate(client, repository, &opts.branch, reporter) {
        Ok(repository) => repository,
        Err(e) => {
            reporter.error(&format!("{downstream}: {e}"));
            return Outcome::Errored {
                message: e.to_string(),
            };
        }
    };

    if repository.commits.is_empty() && !opts.force {
        reporter.info(&format!("[SKIP] {downstream} (no new commits)"));
        return Outcome::Skipped {
            reason: "no new commits".to_string(),
        };
    }

    let decision = diff::reconcile(&repository);
    if let Decision::ProceedWithWarning { differences } = &decision {
        reporter.warn(&format!(
            "downstream compare of {downstream} contains commits not found upstream:"
        ));
        for message in differences {
            reporter.warn(&format!("  {}", message.lines().next().unwrap_or_default()));
        }
    }
    if let Decision::Abort { differences } = diff::confirm(decision, prompter) {
        reporter.info(&format!("[SKIP] {downstream} due to differences"));
        return Outcome::Aborted { differences };
    }

    reporter.info(&format!(
        "[{downstream}] {} unreleased change(s):",
        repository.commits.len()
    ));
    for commit in &repository.commits {
        reporter.info(&notes::change_line(commit));
    }

    let question = format!(
        "Latest={}, enter new tag (blank to skip):",
        repository.previous_version()
    );
    let Some(version) = prompter.ask_text(&question, None) else {
        reporter.info(&format!("[SKIP] not going to release {downstream}"));
        return Outcome::Skipped {
            reason: "no version given".to_string(),
        };
    };

    let make_latest = prompter.ask_bool("Make this the latest release", true);
    let draft = prompter.ask_bool("Mark as draft", false);

    publish(client, &repository, &version, make_latest, draft, opts, reporter)
}

/// Latest release, unreleased commits and the downstream diff.
fn evaluate(
    client: &GithubClient,
    repository: Repository,
    branch: &str,
    reporter: &mut dyn Reporter,
) -> Result<Repository> {
    let mut repository = aggregate::populate(client, repository, reporter)?;
    repository.diff = diff::compute_diff(client, &repository, branch, reporter)?;
    Ok(repository)
}

fn publish(
    client: &GithubClient,
    repository: &Repository,
    version: &str,
    make_latest: bool,
    draft: bool,
    opts: &ReleaseOptions,
    reporter: &mut dyn Reporter,
) -> Outcome {
    let downstream = &repository.downstream;
    let notes = notes::release_notes(repository, version, client.html_base());
    let payload = ReleasePayload::new(version, &opts.branch, &notes, draft, make_latest.into());
    let url = client.releases_url(downstream);

    if opts.dry_run {
        tracing::trace!(?payload, "release payload");
        reporter.info(&format!("[DRY-RUN] POST {url}"));
        return Outcome::Published {
            version: version.to_string(),
            url: None,
            dry_run: true,
        };
    }

    let response = match client.post_json(&url, &payload) {
        Ok(response) => response,
        Err(e) => {
            reporter.error(&format!("[ERROR] {downstream}: {e}"));
            return Outcome::Failed {
                status: None,
                message: e.to_string(),
            };
        }
    };

    if !response.is_created() {
        reporter.error(&format!("[ERROR] ({}) {}", response.status, response.body));
        return Outcome::Failed {
            status: Some(response.status),
            message: response.body,
        };
    }

    let html_url = match response.json::<CreatedRelease>() {
        Ok(created) => Some(created.html_url),
        Err(e) => {
            reporter.warn(&format!("release created but response was unreadable: {e}"));
            None
        }
    };
    reporter.info(&format!(
        "[CREATED] {downstream} {version}: {}",
        html_url.as_deref().unwrap_or("-")
    ));

    Outcome::Published {
        version: version.to_string(),
        url: html_url,
        dry_run: false,
    }
}

//! Tag-only workflow: create an annotated tag on one repository's branch
//! head without a GitHub release.

use splitrel_github::GithubClient;
use splitrel_github::wire::{CreatedRef, CreatedTag, RefPayload, RefRow, TagPayload};
use splitrel_types::{CommitSource, Outcome, Project, Repository};

use crate::engine::Reporter;
use crate::error::{ReleaseError, Result};
use crate::history;
use crate::prompt::Prompter;

#[derive(Debug, Clone)]
pub struct TagOptions {
    /// Branch whose head is tagged
    pub branch: String,
    pub dry_run: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            dry_run: false,
        }
    }
}

/// Head commit of `branch`, taken from the first matching ref.
///
/// `matching-refs` is a prefix match, so `main` also returns
/// `refs/heads/main-backport` and the like. The first ref in API order wins;
/// GitHub sorts refs by name, which puts the exact branch ahead of longer
/// names sharing its prefix. The other refs are ignored.
pub fn branch_sha(client: &GithubClient, project: &Project, branch: &str) -> Result<String> {
    let url = client.matching_refs_url(project, branch);
    let response = client.get(&url)?;
    if !response.is_ok() {
        return Err(ReleaseError::Fetch {
            url,
            status: response.status,
            body: response.body,
        });
    }

    let refs: Vec<RefRow> = response.json()?;
    if refs.len() > 1 {
        tracing::debug!(%project, %branch, count = refs.len(), "several matching refs, using the first");
    }
    let Some(first) = refs.into_iter().next() else {
        return Err(ReleaseError::RefNotFound {
            branch: branch.to_string(),
        });
    };
    tracing::debug!(%project, reference = %first.name, sha = %first.object.sha, "branch head");
    Ok(first.object.sha)
}

/// Show what changed since the last release, ask for a tag name and create
/// it on the head of the configured branch.
pub fn run_tag(
    client: &GithubClient,
    project: &Project,
    opts: &TagOptions,
    reporter: &mut dyn Reporter,
    prompter: &mut dyn Prompter,
) -> Result<Outcome> {
    let sha = branch_sha(client, project, &opts.branch)?;

    let mut repository = Repository::single(project.clone());
    repository.latest_release = history::latest_release(client, project, reporter)?;

    match history::unreleased_commits(client, &repository, CommitSource::Downstream, reporter) {
        Ok(commits) => {
            reporter.info(&format!("[{project}] {} unreleased change(s):", commits.len()));
            for commit in &commits {
                match &commit.pull_request {
                    Some(pr) => {
                        reporter.info(&format!("[#{}] {} ({})", pr.id, pr.title, pr.author))
                    }
                    None => reporter.info(commit.summary()),
                }
            }
        }
        Err(e) => reporter.warn(&format!("could not list unreleased changes: {e}")),
    }

    let question = format!(
        "Latest={}, enter new tag (blank to skip):",
        repository.previous_version()
    );
    let Some(tag) = prompter.ask_text(&question, None) else {
        reporter.info("[SKIP] not going to tag");
        return Ok(Outcome::Skipped {
            reason: "no tag given".to_string(),
        });
    };

    reporter.info(&format!("Creating tag {tag} from branch {}", opts.branch));
    Ok(create_tag(client, project, &sha, &tag, opts.dry_run, reporter))
}

/// Create the annotated tag object, then the `refs/tags/<tag>` reference
/// pointing at it. No reference is created when the tag object fails.
pub fn create_tag(
    client: &GithubClient,
    project: &Project,
    sha: &str,
    tag: &str,
    dry_run: bool,
    reporter: &mut dyn Reporter,
) -> Outcome {
    let tags_url = client.git_tags_url(project);
    let refs_url = client.git_refs_url(project);
    let payload = TagPayload::commit(tag, sha);

    if dry_run {
        tracing::trace!(?payload, "tag payload");
        reporter.info(&format!("[DRY-RUN] POST {tags_url}"));
        reporter.info(&format!("[DRY-RUN] POST {refs_url} refs/tags/{tag}"));
        return Outcome::Published {
            version: tag.to_string(),
            url: None,
            dry_run: true,
        };
    }

    let created: CreatedTag = match post_created(client, &tags_url, &payload, reporter) {
        Ok(created) => created,
        Err(outcome) => return outcome,
    };
    reporter.info(&format!("[CREATED] {project} {tag}: {}", created.url));

    let reference = RefPayload::tag(&created.tag, &created.sha);
    let created: CreatedRef = match post_created(client, &refs_url, &reference, reporter) {
        Ok(created) => created,
        Err(outcome) => return outcome,
    };
    reporter.info(&format!("[CREATED] {project} {}: {}", created.name, created.url));

    Outcome::Published {
        version: tag.to_string(),
        url: Some(created.url),
        dry_run: false,
    }
}

/// POST and decode a `201 Created` body; anything else becomes the final
/// outcome.
fn post_created<P, T>(
    client: &GithubClient,
    url: &str,
    payload: &P,
    reporter: &mut dyn Reporter,
) -> std::result::Result<T, Outcome>
where
    P: serde::Serialize,
    T: serde::de::DeserializeOwned,
{
    let response = client.post_json(url, payload).map_err(|e| {
        reporter.error(&format!("[ERROR] {e}"));
        Outcome::Failed {
            status: None,
            message: e.to_string(),
        }
    })?;

    if !response.is_created() {
        reporter.error(&format!("[ERROR] ({}) {}", response.status, response.body));
        if let Some(permissions) = &response.accepted_permissions {
            reporter.info(&format!("[HELP] X-Accepted-GitHub-Permissions: {permissions}"));
        }
        return Err(Outcome::Failed {
            status: Some(response.status),
            message: response.body,
        });
    }

    response.json().map_err(|e| {
        reporter.error(&e.to_string());
        Outcome::Errored {
            message: e.to_string(),
        }
    })
}

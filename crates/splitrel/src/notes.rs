use splitrel_types::{Commit, Repository};

/// Release notes for publishing `version` of `repository`.
///
/// A first release gets `Initial release`. Later releases list each
/// unreleased pull request and link the full changelog on `html_base`.
pub fn release_notes(repository: &Repository, version: &str, html_base: &str) -> String {
    let Some(previous) = &repository.latest_release else {
        return "Initial release".to_string();
    };

    let mut lines = vec!["What's Changed:".to_string()];
    for commit in &repository.commits {
        lines.push(match &commit.pull_request {
            Some(pr) => format!("* {} by @{} in [{}]({})", pr.title, pr.author, pr.id, pr.url),
            None => format!("* {}", commit.summary()),
        });
    }
    lines.push(String::new());
    lines.push(format!(
        "**Full Changelog**: {}/{}/compare/{}...{}",
        html_base.trim_end_matches('/'),
        repository.downstream,
        previous.version,
        version
    ));

    lines.join("\n")
}

/// Operator-facing line for one unreleased commit.
pub fn change_line(commit: &Commit) -> String {
    match &commit.pull_request {
        Some(pr) => format!("* {} ({})", pr.title, pr.author),
        None => format!("* {}", commit.summary()),
    }
}

use splitrel_github::GithubError;
use splitrel_types::Project;
use thiserror::Error;

/// Errors raised while discovering, aggregating or tagging repositories.
///
/// Publication failures, rejected or unanswered, are not errors: they are
/// reported and recorded as
/// [`Outcome::Failed`](splitrel_types::Outcome::Failed) so the batch can
/// continue.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Invalid operator input, detected before any network call.
    #[error("{0}")]
    Configuration(String),

    #[error("error fetching {url} ({status}): {body}")]
    Fetch { url: String, status: u16, body: String },

    #[error("error retrieving latest release for {project} ({status}): {body}")]
    ReleaseFetch {
        project: Project,
        status: u16,
        body: String,
    },

    #[error("pull request not found for commit SHA {sha}")]
    PullRequestNotFound { sha: String },

    #[error("error retrieving pull request for commit SHA {sha} ({status}): {body}")]
    PullRequestFetch {
        sha: String,
        status: u16,
        body: String,
    },

    #[error("no matching refs found for branch: {branch}")]
    RefNotFound { branch: String },

    #[error("invalid split map at {url}: {message}")]
    InvalidSplitMap { url: String, message: String },

    #[error("invalid project reference: {0}")]
    InvalidProject(String),

    #[error("no repositories found")]
    NoRepositories,

    #[error(transparent)]
    Http(#[from] GithubError),
}

pub type Result<T, E = ReleaseError> = std::result::Result<T, E>;

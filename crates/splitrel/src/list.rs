//! Latest release of every split repository.

use semver::Version;
use splitrel_github::GithubClient;
use splitrel_types::{Project, Release, Repository};

use crate::aggregate;
use crate::engine::Reporter;
use crate::error::{ReleaseError, Result};

/// Which releases a listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stability {
    #[default]
    Any,
    /// Versions at or above 1.0.0
    Stable,
    /// Versions below 1.0.0
    Unstable,
}

impl Stability {
    pub fn from_flags(stable: bool, unstable: bool) -> Result<Self> {
        match (stable, unstable) {
            (true, true) => Err(ReleaseError::Configuration(
                "can only use one of --stable/--unstable".to_string(),
            )),
            (true, false) => Ok(Stability::Stable),
            (false, true) => Ok(Stability::Unstable),
            (false, false) => Ok(Stability::Any),
        }
    }

    /// Whether a repository with this latest release is listed.
    ///
    /// Repositories without a release are always listed. A version that is
    /// not semver-like is only listed when no stability filter is set.
    pub fn shows(self, release: Option<&Release>) -> bool {
        let Some(release) = release.filter(|r| !r.version.is_empty()) else {
            return true;
        };
        if self == Stability::Any {
            return true;
        }
        let Some(version) = parse_version(&release.version) else {
            return false;
        };
        let stable = version >= Version::new(1, 0, 0);
        match self {
            Stability::Stable => stable,
            Stability::Unstable => !stable,
            Stability::Any => true,
        }
    }
}

/// Lenient version parsing: `v1.2` reads as `1.2.0`.
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    // Pad the numeric core, keeping any pre-release/build suffix.
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);
    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.parse::<u64>().is_err()) {
        return None;
    }
    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    Version::parse(&format!("{padded}{suffix}")).ok()
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRelease {
    pub downstream: Project,
    /// Latest version, `None` before the first release
    pub version: Option<String>,
}

/// Fetch the latest release of each repository and keep the ones
/// `stability` selects, in input order.
pub fn list_releases(
    client: &GithubClient,
    repositories: Vec<Repository>,
    stability: Stability,
    reporter: &mut dyn Reporter,
) -> Result<Vec<ListedRelease>> {
    let mut rows = Vec::new();
    for repository in repositories {
        let repository = aggregate::populate_latest(client, repository, reporter)?;
        if stability.shows(repository.latest_release.as_ref()) {
            rows.push(ListedRelease {
                downstream: repository.downstream,
                version: repository.latest_release.map(|r| r.version),
            });
        }
    }
    Ok(rows)
}

/// Render rows as a two-column text table.
pub fn render_table(rows: &[ListedRelease]) -> String {
    const HEADERS: [&str; 2] = ["Repository", "Latest Version"];

    let cells: Vec<[String; 2]> = rows
        .iter()
        .map(|r| {
            [
                r.downstream.to_string(),
                r.version.clone().unwrap_or_else(|| "none".to_string()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = format!("+-{}-+-{}-+", "-".repeat(widths[0]), "-".repeat(widths[1]));
    let line = |a: &str, b: &str| format!("| {a:<w0$} | {b:<w1$} |", w0 = widths[0], w1 = widths[1]);

    let mut out = vec![border.clone(), line(HEADERS[0], HEADERS[1]), border.clone()];
    out.extend(cells.iter().map(|[a, b]| line(a.as_str(), b.as_str())));
    out.push(border);
    out.join("\n")
}

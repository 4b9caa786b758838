//! Split mapping discovery.
//!
//! A monorepo publishes its subtree-split configuration as YAML:
//!
//! ```yaml
//! splits:
//!   - prefix: "src/Contrib/Otlp"
//!     target: "https://${GH_TOKEN}@github.com/acme/exporter-otlp.git"
//! ```
//!
//! Each entry becomes one [`Repository`]. A document whose shape is wrong is
//! ignored as a whole (with a warning) rather than partially applied.

use serde_yaml::Value;
use splitrel_github::GithubClient;
use splitrel_types::{Project, Repository};

use crate::engine::Reporter;
use crate::error::{ReleaseError, Result};

/// One `splits` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitEntry {
    /// Subtree prefix inside the monorepo
    pub prefix: String,
    /// Split target URL
    pub target: String,
}

/// Structurally checked split mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitMap {
    Entries(Vec<SplitEntry>),
    /// Well-formed YAML of the wrong shape, with the reason.
    Invalid(String),
}

/// Parse a split mapping document.
///
/// Every entry is checked before any is returned: one bad entry makes the
/// whole document [`SplitMap::Invalid`]. Only unparseable YAML is an error.
pub fn parse_split_map(document: &str) -> std::result::Result<SplitMap, serde_yaml::Error> {
    let value: Value = serde_yaml::from_str(document)?;

    let Some(splits) = value.get("splits") else {
        return Ok(SplitMap::Invalid("missing `splits` key".to_string()));
    };
    let Some(splits) = splits.as_sequence() else {
        return Ok(SplitMap::Invalid("`splits` is not a list".to_string()));
    };

    let mut entries = Vec::with_capacity(splits.len());
    for (idx, entry) in splits.iter().enumerate() {
        let prefix = entry.get("prefix").and_then(Value::as_str);
        let target = entry.get("target").and_then(Value::as_str);
        match (prefix, target) {
            (Some(prefix), Some(target)) => entries.push(SplitEntry {
                prefix: prefix.to_string(),
                target: target.to_string(),
            }),
            _ => {
                return Ok(SplitMap::Invalid(format!(
                    "entry {idx} lacks a string `prefix` or `target`"
                )));
            }
        }
    }

    Ok(SplitMap::Entries(entries))
}

/// Whether `prefix` is selected by `filter`: a case-insensitive substring
/// match. A missing or blank filter selects everything.
pub fn matches_filter(prefix: &str, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) => prefix.to_lowercase().contains(&f.to_lowercase()),
        None => true,
    }
}

/// Discover the release units of every source monorepo, in source order and
/// then document order.
///
/// With `filter`, entries whose prefix does not contain it
/// (case-insensitively) are skipped.
pub fn resolve(
    client: &GithubClient,
    sources: &[Project],
    branch: &str,
    split_file: &str,
    filter: Option<&str>,
    reporter: &mut dyn Reporter,
) -> Result<Vec<Repository>> {
    let mut repositories = Vec::new();

    for source in sources {
        let url = client.split_file_url(source, branch, split_file);
        tracing::debug!(%source, %url, "fetching split mapping");

        let response = client.get(&url)?;
        if !response.is_ok() {
            return Err(ReleaseError::Fetch {
                url,
                status: response.status,
                body: response.body,
            });
        }

        let entries = match parse_split_map(&response.body) {
            Ok(SplitMap::Entries(entries)) => entries,
            Ok(SplitMap::Invalid(reason)) => {
                reporter.warn(&format!("ignoring split mapping {url}: {reason}"));
                continue;
            }
            Err(e) => {
                return Err(ReleaseError::InvalidSplitMap {
                    url,
                    message: e.to_string(),
                });
            }
        };

        for entry in entries {
            if !matches_filter(&entry.prefix, filter) {
                reporter.info(&format!("[SKIP] {} (does not match filter)", entry.prefix));
                continue;
            }

            let downstream = Project::from_target(&entry.target)
                .map_err(|e| ReleaseError::InvalidProject(format!("{}: {e}", entry.target)))?;
            repositories.push(Repository::new(source.clone(), entry.prefix, downstream));
        }
    }

    tracing::debug!(count = repositories.len(), "resolved repositories");
    Ok(repositories)
}

//! Configuration file handling for splitrel.
//!
//! This crate loads `.splitrel.toml` files and merges them with values
//! supplied on the command line. Every setting has a default, so a missing
//! file is equivalent to an empty one.
//!
//! # Example
//!
//! ```
//! use splitrel_config::{Config, load_config};
//! use std::path::Path;
//!
//! let config = load_config(Path::new(".")).expect("load config");
//! println!("branch: {}", config.branch());
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use splitrel_types::Project;

/// Default configuration file name
pub const CONFIG_FILE: &str = ".splitrel.toml";

/// Default GitHub REST API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default endpoint serving raw repository files
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Default web endpoint used for links in release notes
pub const DEFAULT_HTML_BASE: &str = "https://github.com";

/// Pinned REST API version
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default branch releases are cut from
pub const DEFAULT_BRANCH: &str = "main";

/// Default split mapping file name
pub const DEFAULT_SPLIT_FILE: &str = ".gitsplit.yml";

/// Default project for the tag-only workflow
pub const DEFAULT_TAG_PROJECT: &str = "open-telemetry/opentelemetry-php-instrumentation";

/// Get the config file path for a directory
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Complete splitrel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    github: GithubConfig,
    #[serde(default)]
    release: ReleaseConfig,
    /// Monorepos whose split mappings are scanned, in processing order
    #[serde(default)]
    sources: Vec<SourceConfig>,
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_base(&self) -> &str {
        self.github.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn raw_base(&self) -> &str {
        self.github.raw_base.as_deref().unwrap_or(DEFAULT_RAW_BASE)
    }

    pub fn html_base(&self) -> &str {
        self.github.html_base.as_deref().unwrap_or(DEFAULT_HTML_BASE)
    }

    pub fn api_version(&self) -> &str {
        self.github
            .api_version
            .as_deref()
            .unwrap_or(DEFAULT_API_VERSION)
    }

    /// Branch to tag off and compare against
    pub fn branch(&self) -> &str {
        self.release.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    pub fn split_file(&self) -> &str {
        self.release
            .split_file
            .as_deref()
            .unwrap_or(DEFAULT_SPLIT_FILE)
    }

    /// Project tagged by the tag-only workflow
    pub fn tag_project(&self) -> Result<Project> {
        let raw = self
            .release
            .tag_project
            .as_deref()
            .unwrap_or(DEFAULT_TAG_PROJECT);
        raw.parse()
            .with_context(|| format!("invalid tag project in config: {raw}"))
    }

    /// Configured sources, falling back to the built-in monorepos.
    pub fn sources(&self) -> Vec<SourceConfig> {
        if self.sources.is_empty() {
            default_sources()
        } else {
            self.sources.clone()
        }
    }

    /// Resolve the sources to scan, optionally restricted to one key.
    pub fn select_sources(&self, key: Option<&str>) -> Result<Vec<(String, Project)>> {
        let sources = self.sources();
        let selected: Vec<SourceConfig> = match key {
            None => sources,
            Some(key) => {
                let Some(found) = sources.iter().find(|s| s.key == key) else {
                    let options = sources
                        .iter()
                        .map(|s| s.key.as_str())
                        .collect::<Vec<_>>()
                        .join(",");
                    bail!("invalid source: {key}. Options: {options}");
                };
                vec![found.clone()]
            }
        };

        selected
            .into_iter()
            .map(|s| {
                let project = s
                    .project
                    .parse()
                    .with_context(|| format!("invalid project for source {}: {}", s.key, s.project))?;
                Ok((s.key, project))
            })
            .collect()
    }

    /// Override the API base URL
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.github.api_base = Some(url.into());
        self
    }

    /// Override the raw file base URL
    pub fn with_raw_base(mut self, url: impl Into<String>) -> Self {
        self.github.raw_base = Some(url.into());
        self
    }

    /// Override the release branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.release.branch = Some(branch.into());
        self
    }

    /// Merge this config with another (other takes precedence)
    pub fn merge(&self, other: &Config) -> Config {
        Config {
            github: GithubConfig {
                api_base: other.github.api_base.clone().or(self.github.api_base.clone()),
                raw_base: other.github.raw_base.clone().or(self.github.raw_base.clone()),
                html_base: other.github.html_base.clone().or(self.github.html_base.clone()),
                api_version: other
                    .github
                    .api_version
                    .clone()
                    .or(self.github.api_version.clone()),
            },
            release: ReleaseConfig {
                branch: other.release.branch.clone().or(self.release.branch.clone()),
                split_file: other
                    .release
                    .split_file
                    .clone()
                    .or(self.release.split_file.clone()),
                tag_project: other
                    .release
                    .tag_project
                    .clone()
                    .or(self.release.tag_project.clone()),
            },
            sources: if other.sources.is_empty() {
                self.sources.clone()
            } else {
                other.sources.clone()
            },
        }
    }
}

/// GitHub endpoint configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Release workflow configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_project: Option<String>,
}

/// A monorepo whose split mapping is scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short selector used with `--repo`
    pub key: String,
    /// `org/name` of the monorepo
    pub project: String,
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            key: "core".to_string(),
            project: "open-telemetry/opentelemetry-php".to_string(),
        },
        SourceConfig {
            key: "contrib".to_string(),
            project: "open-telemetry/opentelemetry-php-contrib".to_string(),
        },
    ]
}

/// Load configuration from a directory
pub fn load_config(dir: &Path) -> Result<Config> {
    load_config_from_file(&config_path(dir))
}

/// Load configuration from a specific file path
pub fn load_config_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Find configuration file by walking up the directory tree
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let config_file = current.join(CONFIG_FILE);
        if config_file.exists() {
            return Some(config_file);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

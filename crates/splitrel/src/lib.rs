//! # splitrel
//!
//! Release orchestration for a monorepo whose subdirectories are mirrored
//! ("split") into read-only downstream repositories.
//!
//! ## Pipeline
//!
//! The release flow is **resolve → populate → diff → publish**:
//!
//! 1. [`splitmap::resolve`] fetches each monorepo's split mapping and yields
//!    one [`Repository`](splitrel_types::Repository) per split target.
//! 2. [`aggregate::populate`] looks up the latest downstream release and the
//!    unreleased upstream commits since then, each correlated with its pull
//!    request by [`pulls::pull_request`].
//! 3. [`diff::compute_diff`] compares the downstream tag against the release
//!    branch and [`diff::reconcile`] checks that the date-based discovery
//!    covers every commit of that range.
//! 4. [`engine::run_release`] prompts the operator for a version and creates
//!    the GitHub release (or reports what it would do, in dry-run).
//!
//! [`tag::run_tag`] is the tag-only variant for a single repository, and
//! [`list::list_releases`] prints the latest release of every split target.
//!
//! ## Example
//!
//! ```no_run
//! use std::io;
//!
//! use splitrel::engine::{self, ReleaseOptions, Reporter};
//! use splitrel::prompt::LinePrompter;
//! use splitrel_github::GithubClient;
//! use splitrel_types::Project;
//!
//! struct Stderr;
//!
//! impl Reporter for Stderr {
//!     fn info(&mut self, msg: &str) { eprintln!("[info] {msg}"); }
//!     fn warn(&mut self, msg: &str) { eprintln!("[warn] {msg}"); }
//!     fn error(&mut self, msg: &str) { eprintln!("[error] {msg}"); }
//! }
//!
//! let client = GithubClient::new(Some("ghp_example".to_string())).expect("client");
//! let sources = vec![Project::new("acme", "mono")];
//! let opts = ReleaseOptions {
//!     dry_run: true,
//!     ..ReleaseOptions::default()
//! };
//! let mut prompter = LinePrompter::new(io::stdin().lock(), io::stderr());
//! let summary = engine::run_release(&client, &sources, &opts, &mut Stderr, &mut prompter)
//!     .expect("release run");
//! println!("published {}", summary.published());
//! ```

pub mod aggregate;
pub mod diff;
pub mod engine;
pub mod error;
pub mod history;
pub mod list;
pub mod notes;
pub mod prompt;
pub mod pulls;
pub mod splitmap;
pub mod tag;

pub use error::{ReleaseError, Result};

#[cfg(test)]
pub(crate) mod test_support;

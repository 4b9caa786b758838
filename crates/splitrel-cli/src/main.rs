use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splitrel::engine::{self, ReleaseOptions, Reporter};
use splitrel::list::{self, Stability};
use splitrel::prompt::LinePrompter;
use splitrel::splitmap;
use splitrel::tag::{self, TagOptions};
use splitrel_auth::{mask_token, require_token};
use splitrel_config::{Config, find_config, load_config_from_file};
use splitrel_github::GithubClient;
use splitrel_types::{Project, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "splitrel", version)]
#[command(about = "Find unreleased changes in split repositories and publish GitHub releases")]
struct Cli {
    /// GitHub token (default: $GITHUB_TOKEN, then $GH_TOKEN)
    #[arg(short = 't', long, global = true)]
    token: Option<String>,

    /// Path to the config file (default: nearest .splitrel.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub REST API base URL (default: https://api.github.com)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Raw contents base URL (default: https://raw.githubusercontent.com)
    #[arg(long, global = true)]
    raw_base: Option<String>,

    /// More diagnostics on stderr (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find unreleased changes and create new releases.
    Release {
        /// Report the release calls instead of making them.
        #[arg(long)]
        dry_run: bool,

        /// Branch to tag off (default: main)
        #[arg(long)]
        branch: Option<String>,

        /// Source monorepo to handle (default: all configured sources)
        #[arg(short = 'r', long)]
        repo: Option<String>,

        /// Only handle split prefixes containing this text
        #[arg(long)]
        filter: Option<String>,

        /// Ask for a version even when there are no unreleased commits.
        #[arg(long)]
        force: bool,
    },
    /// List the latest release of each split repository.
    List {
        /// Source monorepo to list (default: all configured sources)
        #[arg(short = 'r', long)]
        repo: Option<String>,

        /// Only show versions at or above 1.0.0
        #[arg(long)]
        stable: bool,

        /// Only show versions below 1.0.0
        #[arg(long)]
        unstable: bool,
    },
    /// Create a new tag on a repository's branch head.
    Tag {
        /// Report the tag calls instead of making them.
        #[arg(long)]
        dry_run: bool,

        /// Branch to tag from (default: main)
        #[arg(short = 'b', long)]
        branch: Option<String>,

        /// Repository to tag as org/name
        #[arg(long)]
        project: Option<String>,
    },
}

struct CliReporter;

impl Reporter for CliReporter {
    fn info(&mut self, msg: &str) {
        eprintln!("[info] {msg}");
    }

    fn warn(&mut self, msg: &str) {
        eprintln!("[warn] {msg}");
    }

    fn error(&mut self, msg: &str) {
        eprintln!("[error] {msg}");
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    let mut reporter = CliReporter;

    match &cli.cmd {
        Commands::Release {
            dry_run,
            branch,
            repo,
            filter,
            force,
        } => {
            let config = match branch {
                Some(branch) => config.merge(&Config::new().with_branch(branch.as_str())),
                None => config,
            };
            let sources = select_sources(&config, repo.as_deref())?;
            let client = build_client(&cli, &config)?;
            let opts = ReleaseOptions {
                branch: config.branch().to_string(),
                split_file: config.split_file().to_string(),
                filter: filter.clone(),
                dry_run: *dry_run,
                force: *force,
            };

            let mut prompter = LinePrompter::new(io::stdin().lock(), io::stderr());
            let summary = engine::run_release(&client, &sources, &opts, &mut reporter, &mut prompter)?;
            print_summary(&summary);
            Ok(exit_code(summary.is_success()))
        }
        Commands::List {
            repo,
            stable,
            unstable,
        } => {
            let stability = Stability::from_flags(*stable, *unstable)?;
            let sources = select_sources(&config, repo.as_deref())?;
            let client = build_client(&cli, &config)?;

            let repositories = splitmap::resolve(
                &client,
                &sources,
                config.branch(),
                config.split_file(),
                None,
                &mut reporter,
            )?;
            if repositories.is_empty() {
                bail!("no repositories found");
            }
            let rows = list::list_releases(&client, repositories, stability, &mut reporter)?;
            println!("{}", list::render_table(&rows));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Tag {
            dry_run,
            branch,
            project,
        } => {
            let project: Project = match project {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid --project: {raw}"))?,
                None => config.tag_project()?,
            };
            let opts = TagOptions {
                branch: branch.clone().unwrap_or_else(|| config.branch().to_string()),
                dry_run: *dry_run,
            };
            let client = build_client(&cli, &config)?;

            let mut prompter = LinePrompter::new(io::stdin().lock(), io::stderr());
            let outcome = tag::run_tag(&client, &project, &opts, &mut reporter, &mut prompter)?;
            println!("{project}: {outcome}");
            Ok(exit_code(!outcome.is_fatal()))
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,splitrel={default_level},splitrel_github={default_level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// File config (explicit path, else the nearest `.splitrel.toml`) with the
/// endpoint flags applied on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let file = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file not found: {}", path.display());
            }
            load_config_from_file(path)?
        }
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            match find_config(&cwd) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "using config file");
                    load_config_from_file(&path)?
                }
                None => Config::default(),
            }
        }
    };

    let mut overrides = Config::new();
    if let Some(api_base) = &cli.api_base {
        overrides = overrides.with_api_base(api_base.as_str());
    }
    if let Some(raw_base) = &cli.raw_base {
        overrides = overrides.with_raw_base(raw_base.as_str());
    }
    Ok(file.merge(&overrides))
}

fn select_sources(config: &Config, key: Option<&str>) -> Result<Vec<Project>> {
    let selected = config.select_sources(key)?;
    for (key, project) in &selected {
        tracing::debug!(%key, %project, "source");
    }
    Ok(selected.into_iter().map(|(_, project)| project).collect())
}

/// Resolve the token and build the API client. Fails before any request
/// when no token is available.
fn build_client(cli: &Cli, config: &Config) -> Result<GithubClient> {
    let token = require_token(cli.token.as_deref())?;
    tracing::debug!(token = %mask_token(&token), "github token");

    let client = GithubClient::new(Some(token))
        .context("failed to build GitHub client")?
        .with_api_base(config.api_base())
        .with_raw_base(config.raw_base())
        .with_html_base(config.html_base())
        .with_api_version(config.api_version());
    Ok(client)
}

fn print_summary(summary: &RunSummary) {
    println!("Summary:");
    for report in &summary.repositories {
        println!("  {}: {}", report.downstream, report.outcome);
    }
    println!(
        "{} of {} repositories published",
        summary.published(),
        summary.repositories.len()
    );
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

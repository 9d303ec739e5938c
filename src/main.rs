/// `aca` looks through the configuration files of a repository for IP
/// addresses and ports, and flips 0/1 adapter switches in an environment's
/// properties file, optionally committing the change and opening a pull
/// request for it.
use aca_utils::builders::reporter::OutputMode;
use aca_utils::builders::selector::{FALLBACK_EXCLUDES, FALLBACK_INCLUDES};
use aca_utils::core::config::{AcaConfig, ConfigManager};
use aca_utils::core::engine::{AcaEngine, FlipRequest, ScanRequest};
use aca_utils::utils::{self, AdapterAction};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aca", version)]
#[command(about = "IP/Port extraction + adapter toggler")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON); defaults to ~/.gh-aca-utils/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Scan repo for IP/Port key/value pairs across branches
    IpPort {
        /// Target repo as ORG/REPO
        #[arg(long)]
        repo: String,
        /// Branch or tag (default: default branch)
        #[arg(long = "ref")]
        reference: Option<String>,
        /// Scan all branches in the repository
        #[arg(long)]
        all_branches: bool,
        /// Comma-separated glob patterns to include
        #[arg(long)]
        include: Option<String>,
        /// Comma-separated glob patterns to exclude
        #[arg(long)]
        exclude: Option<String>,
        /// Output format (default: csv)
        #[arg(long, value_enum)]
        output: Option<OutputMode>,
    },
    /// Toggle adapter values (0↔1) in env/<ENV>/parameters.properties
    FlipAdapters {
        /// Target repo as ORG/REPO
        #[arg(long)]
        repo: String,
        /// Environment directory under env/
        #[arg(long)]
        env: String,
        /// Comma-separated adapter keys (or use stored adapters from 'set-adapters')
        #[arg(long)]
        adapters: Option<String>,
        /// Branch name to create (with --commit)
        #[arg(long)]
        branch: Option<String>,
        /// Commit the change to a new branch and push
        #[arg(long)]
        commit: bool,
        /// Create a pull request (implies --commit)
        #[arg(long)]
        pr: bool,
        /// Show planned changes without writing (default: true)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        dry_run: Option<bool>,
        /// Output format (default: table)
        #[arg(long, value_enum)]
        output: Option<OutputMode>,
    },
    /// Manage stored adapter lists for reuse in flip-adapters command
    SetAdapters {
        /// Comma-separated list of adapter names to store
        #[arg(long)]
        adapters: Option<String>,
        /// List currently stored adapters
        #[arg(long)]
        list: bool,
        /// Clear all stored adapters
        #[arg(long)]
        clear: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Loads and validates the configuration, starts logging and builds the engine.
fn load(config_path: Option<PathBuf>, verbose: bool) -> Result<(AcaConfig, AcaEngine)> {
    let config = ConfigManager::new(config_path)?.load_validated()?;
    init_tracing(verbose || config.global_settings.verbose);
    let engine = AcaEngine::new(config.clone())?;
    Ok((config, engine))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Init => {
            init_tracing(cli.verbose);
            utils::initialize_config(cli.config, &mut stdout)
        }
        Commands::IpPort {
            repo,
            reference,
            all_branches,
            include,
            exclude,
            output,
        } => {
            let (config, engine) = load(cli.config, cli.verbose)?;
            let request = ScanRequest {
                repo,
                reference,
                all_branches,
                include: utils::resolve_globs(
                    include.as_deref(),
                    &config.scan.include,
                    FALLBACK_INCLUDES,
                ),
                exclude: utils::resolve_globs(
                    exclude.as_deref(),
                    &config.scan.exclude,
                    FALLBACK_EXCLUDES,
                ),
            };
            let mode = output.unwrap_or(config.scan.output);
            utils::run_ip_port(&engine, &request, mode, &mut stdout)
        }
        Commands::FlipAdapters {
            repo,
            env,
            adapters,
            branch,
            commit,
            pr,
            dry_run,
            output,
        } => {
            let (config, engine) = load(cli.config, cli.verbose)?;
            let request = FlipRequest {
                repo,
                env,
                adapters: adapters
                    .filter(|a| !a.trim().is_empty())
                    .map(|a| utils::split_csv(&a)),
                branch,
                commit: commit || pr,
                pull_request: pr,
                dry_run: dry_run.unwrap_or(config.flip.dry_run),
            };
            let mode = output.unwrap_or(config.flip.output);
            utils::run_flip_adapters(&engine, &request, mode, &mut stdout)
        }
        Commands::SetAdapters {
            adapters,
            list,
            clear,
        } => {
            let (_, mut engine) = load(cli.config, cli.verbose)?;
            let action = if list {
                AdapterAction::List
            } else if clear {
                AdapterAction::Clear
            } else {
                AdapterAction::Store(adapters.unwrap_or_default())
            };
            utils::run_set_adapters(&mut engine, action, &mut stdout)
        }
    }
}

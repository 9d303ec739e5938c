use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::builders::selector::{FileSelector, GlobSelector};
use crate::builders::storage::{AdapterStore, FileAdapterStore};
use crate::builders::validator::{validate_adapter_names, validate_env_name, validate_repo};
use crate::core::config::AcaConfig;
use crate::core::fetcher::{FetchedRepo, GhCliFetcher, RepositoryFetcher};
use crate::core::git::{Git2Client, GitClient};
use crate::core::publisher::{GitPublisher, PublishRequest, Publisher, PullRequest};
use crate::core::scanner::{ScanReport, Scanner};
use crate::core::toggle::{ToggleOutcome, toggle};

/// Parameters of an `ip-port` run, with defaults already applied.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub repo: String,
    pub reference: Option<String>,
    pub all_branches: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Parameters of a `flip-adapters` run, with defaults already applied.
#[derive(Debug, Clone)]
pub struct FlipRequest {
    pub repo: String,
    pub env: String,
    /// `None` means "use the stored list".
    pub adapters: Option<Vec<String>>,
    pub branch: Option<String>,
    pub commit: bool,
    pub pull_request: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipStatus {
    /// Nothing flipped; nothing written.
    NoChanges,
    /// Changes computed but not written.
    DryRun,
    /// The properties file was rewritten.
    Written,
}

/// The result of a flip, holding on to the fetched repository so the change
/// can still be published.
pub struct FlipOutcome {
    pub repo: FetchedRepo,
    /// The validated environment name.
    pub env: String,
    /// Properties file relative to the repository root.
    pub properties_path: PathBuf,
    pub adapters: Vec<String>,
    pub toggle: ToggleOutcome,
    pub status: FlipStatus,
}

/// Wires the fetcher, selector, engines, store and publisher together.
pub struct AcaEngine {
    config: AcaConfig,
    fetcher: Box<dyn RepositoryFetcher>,
    publisher: Box<dyn Publisher>,
    store: Box<dyn AdapterStore>,
}

impl AcaEngine {
    /// Builds an engine with the `gh`/`git` backed collaborators and the
    /// file-based adapter store.
    pub fn new(config: AcaConfig) -> Result<Self> {
        let store = FileAdapterStore::new(config.adapters_file()?);
        Ok(Self::with_components(
            config,
            Box::new(GhCliFetcher::new()),
            Box::new(GitPublisher::new()),
            Box::new(store),
        ))
    }

    pub fn with_components(
        config: AcaConfig,
        fetcher: Box<dyn RepositoryFetcher>,
        publisher: Box<dyn Publisher>,
        store: Box<dyn AdapterStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            publisher,
            store,
        }
    }

    /// Selects and scans the files of one local tree.
    pub fn scan_tree(&self, root: &Path, include: &[String], exclude: &[String]) -> ScanReport {
        let files = GlobSelector::new(include, exclude).select(root);
        Scanner::relative_to(root).scan(&files)
    }

    /// Fetches the repository and scans it, either at one ref or across every
    /// remote branch.
    pub fn scan_repository(&self, request: &ScanRequest) -> Result<ScanReport> {
        validate_repo(&request.repo)?;

        if !request.all_branches {
            let fetched = self
                .fetcher
                .fetch(&request.repo, request.reference.as_deref())?;
            return Ok(self.scan_tree(fetched.root(), &request.include, &request.exclude));
        }

        let fetched = self.fetcher.fetch_all_branches(&request.repo)?;
        let git = Git2Client::new(fetched.root())?;
        let branches = git.remote_branches().context("failed to get branches")?;
        info!(count = branches.len(), "scanning branches");

        let mut combined = ScanReport::default();
        for branch in branches {
            if let Err(e) = git.checkout_remote_branch(&branch) {
                warn!(branch = %branch, error = %e, "failed to checkout branch; skipping");
                continue;
            }
            let mut report = self.scan_tree(fetched.root(), &request.include, &request.exclude);
            for record in &mut report.records {
                record.file_path = format!("[{branch}] {}", record.file_path);
            }
            combined.records.extend(report.records);
            combined.warnings.extend(report.warnings);
        }
        Ok(combined)
    }

    /// Returns the explicit list when given, otherwise the stored one.
    pub fn resolve_adapters(&self, explicit: Option<Vec<String>>) -> Result<Vec<String>> {
        let adapters = match explicit {
            Some(list) => list,
            None => {
                let stored = self.store.load().map_err(|e| {
                    warn!(error = %e, "failed to load stored adapters");
                    anyhow::anyhow!(
                        "--adapters is required (comma list) or run 'aca set-adapters' to store adapters first"
                    )
                })?;
                if stored.is_empty() {
                    anyhow::bail!(
                        "--adapters is required (comma list) or run 'aca set-adapters' to store adapters first"
                    );
                }
                if stored.iter().any(|a| a.trim().is_empty()) {
                    anyhow::bail!("invalid empty adapter name found in stored adapters");
                }
                stored
            }
        };
        validate_adapter_names(&adapters)?;
        Ok(adapters)
    }

    /// Toggles the requested adapters of one environment.
    ///
    /// The properties file is written only when something changed and the
    /// request is not a dry run. A failed write aborts the run.
    pub fn flip_adapters(&self, request: &FlipRequest) -> Result<FlipOutcome> {
        validate_repo(&request.repo)?;
        let env = validate_env_name(&request.env)?;
        let adapters = self.resolve_adapters(request.adapters.clone())?;

        let repo = self.fetcher.fetch(&request.repo, None)?;
        let properties_path = self.config.flip.properties_path_for(env);
        let full_path = repo.root().join(&properties_path);
        let content = fs::read_to_string(&full_path)
            .with_context(|| format!("read {}", properties_path.display()))?;

        let label = properties_path.to_string_lossy().replace('\\', "/");
        let outcome = toggle(&content, &adapters, &label);

        let status = if outcome.is_noop() {
            FlipStatus::NoChanges
        } else if request.dry_run {
            FlipStatus::DryRun
        } else {
            fs::write(&full_path, &outcome.content)
                .with_context(|| format!("write {}", properties_path.display()))?;
            info!(file = %label, changes = outcome.changes.len(), "wrote properties file");
            FlipStatus::Written
        };

        Ok(FlipOutcome {
            repo,
            env: env.to_string(),
            properties_path,
            adapters,
            toggle: outcome,
            status,
        })
    }

    /// Commits and pushes a written flip, opening a pull request when asked.
    /// `--pr` implies `--commit`. Returns the branch that was pushed.
    pub fn publish_flip(&self, request: &FlipRequest, flip: &FlipOutcome) -> Result<Option<String>> {
        if !(request.commit || request.pull_request) {
            return Ok(None);
        }
        if flip.status != FlipStatus::Written {
            info!(status = ?flip.status, "nothing written; skipping commit");
            return Ok(None);
        }

        let publish = self.publish_request(request, flip);
        self.publisher.publish(flip.repo.root(), &publish)?;
        Ok(Some(publish.branch))
    }

    /// Builds the branch, commit message and pull request for a flip.
    pub fn publish_request(&self, request: &FlipRequest, flip: &FlipOutcome) -> PublishRequest {
        let env = &flip.env;
        let branch = request
            .branch
            .clone()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| self.config.flip.branch_for(env));
        let pull_request = request.pull_request.then(|| PullRequest {
            title: format!("Flip adapters in {env}: {}", flip.adapters.join(", ")),
            body: self.config.flip.pr_body.clone(),
        });

        PublishRequest {
            branch,
            files: vec![flip.properties_path.clone()],
            commit_message: format!(
                "chore(env:{env}): flip adapters {}",
                flip.adapters.join(",")
            ),
            pull_request,
        }
    }

    /// Replaces the stored adapter list and returns what was stored.
    pub fn store_adapters(&mut self, adapters: Vec<String>) -> Result<Vec<String>> {
        validate_adapter_names(&adapters)?;
        self.store.save(&adapters)?;
        Ok(adapters)
    }

    pub fn stored_adapters(&self) -> Result<Vec<String>> {
        self.store.load()
    }

    pub fn clear_adapters(&mut self) -> Result<()> {
        self.store.clear()
    }

    pub fn store_location(&self) -> String {
        self.store.location()
    }
}

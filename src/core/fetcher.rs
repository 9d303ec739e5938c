use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::builders::validator::validate_repo;

/// A local copy of a remote repository.
///
/// When the copy was made into a scratch directory, that directory is deleted
/// when this value is dropped.
pub struct FetchedRepo {
    root: PathBuf,
    _scratch: Option<TempDir>,
}

impl FetchedRepo {
    /// Takes ownership of a scratch directory holding the repository.
    pub fn from_temp_dir(dir: TempDir) -> Self {
        Self {
            root: dir.path().to_path_buf(),
            _scratch: Some(dir),
        }
    }

    /// Wraps a directory that outlives the fetch and is never deleted.
    pub fn borrowed<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            _scratch: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Supplies a local directory tree for a repository identifier.
pub trait RepositoryFetcher {
    /// Shallow copy of one ref (the default branch when `reference` is `None`).
    fn fetch(&self, repo: &str, reference: Option<&str>) -> Result<FetchedRepo>;

    /// Full clone with every remote branch available for checkout.
    fn fetch_all_branches(&self, repo: &str) -> Result<FetchedRepo>;
}

/// Fetches through the GitHub CLI, falling back to a tarball download.
pub struct GhCliFetcher {
    gh: String,
    git: String,
}

impl GhCliFetcher {
    pub fn new() -> Self {
        Self {
            gh: "gh".to_string(),
            git: "git".to_string(),
        }
    }

    fn scratch_dir() -> Result<TempDir> {
        tempfile::Builder::new()
            .prefix("gh-aca-utils-")
            .tempdir()
            .context("Failed to create temporary directory")
    }

    fn clone_with_gh(&self, repo: &str, reference: Option<&str>, dest: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.gh);
        cmd.args(["repo", "clone", repo])
            .arg(dest)
            .args(["--", "--depth", "1"]);
        if let Some(reference) = reference {
            cmd.args(["--branch", reference]);
        }
        run(&mut cmd, "gh repo clone")
    }

    /// Streams `gh api .../tarball` into `tar`, dropping the top-level folder
    /// GitHub wraps the archive in.
    fn download_tarball(&self, repo: &str, reference: Option<&str>, dest: &Path) -> Result<()> {
        let url = match reference {
            Some(reference) => format!("repos/{repo}/tarball/{reference}"),
            None => format!("repos/{repo}/tarball"),
        };

        let mut api = Command::new(&self.gh)
            .args(["api", "-H", "Accept: application/vnd.github+json", url.as_str()])
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to start gh api")?;
        let archive = api.stdout.take().context("gh api produced no output stream")?;

        let status = Command::new("tar")
            .args(["-xz", "--strip-components=1", "-C"])
            .arg(dest)
            .stdin(archive)
            .status()
            .context("Failed to run tar")?;

        let api_status = api.wait().context("Failed to wait for gh api")?;
        if !status.success() {
            anyhow::bail!("tar extraction failed with {status}");
        }
        if !api_status.success() {
            warn!(status = %api_status, "gh api exited unsuccessfully after extraction");
        }
        Ok(())
    }
}

impl Default for GhCliFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryFetcher for GhCliFetcher {
    fn fetch(&self, repo: &str, reference: Option<&str>) -> Result<FetchedRepo> {
        validate_repo(repo)?;
        let scratch = Self::scratch_dir()?;

        match self.clone_with_gh(repo, reference, scratch.path()) {
            Ok(()) => {
                info!(repo, "cloned repository");
                return Ok(FetchedRepo::from_temp_dir(scratch));
            }
            Err(e) => warn!(repo, error = %e, "clone failed; falling back to tarball"),
        }

        // A failed clone can leave partial content behind.
        let scratch = Self::scratch_dir()?;
        self.download_tarball(repo, reference, scratch.path())?;
        info!(repo, "downloaded repository tarball");
        Ok(FetchedRepo::from_temp_dir(scratch))
    }

    fn fetch_all_branches(&self, repo: &str) -> Result<FetchedRepo> {
        validate_repo(repo)?;
        let scratch = Self::scratch_dir()?;

        // Full history; `gh` resolves ORG/REPO to the remote URL.
        let mut clone = Command::new(&self.gh);
        clone.args(["repo", "clone", repo]).arg(scratch.path());
        run(&mut clone, "gh repo clone").context("failed to clone repository")?;

        let mut fetch = Command::new(&self.git);
        fetch.args(["fetch", "--all"]).current_dir(scratch.path());
        if let Err(e) = run(&mut fetch, "git fetch --all") {
            warn!(error = %e, "failed to fetch all branches");
        }

        Ok(FetchedRepo::from_temp_dir(scratch))
    }
}

/// Runs a command with inherited stdio and fails on a non-zero exit.
pub fn run(cmd: &mut Command, label: &str) -> Result<()> {
    debug!(command = ?cmd, "running");
    let status = cmd
        .status()
        .with_context(|| format!("Failed to run {label}"))?;
    if !status.success() {
        anyhow::bail!("{label} failed with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        let fetched = FetchedRepo::from_temp_dir(dir);
        assert_eq!(fetched.root(), path.as_path());
        assert!(path.exists());
        drop(fetched);
        assert!(!path.exists());
    }

    #[test]
    fn test_borrowed_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        drop(FetchedRepo::borrowed(dir.path()));
        assert!(dir.path().exists());
    }

    #[test]
    fn test_fetch_rejects_bad_identifier_before_running_anything() {
        let fetcher = GhCliFetcher::new();
        assert!(fetcher.fetch("", None).is_err());
        assert!(fetcher.fetch_all_branches("-x").is_err());
    }

    #[test]
    fn test_run_reports_failure() {
        let err = run(&mut Command::new("definitely-not-a-real-binary-aca"), "probe").unwrap_err();
        assert!(err.to_string().contains("probe"));
    }
}

use anyhow::{Context, Result, anyhow};
use git2::{BranchType, Repository, build::CheckoutBuilder};
use std::path::Path;
use tracing::debug;

/// Trait defining the Git operations the commands need.
/// This abstraction allows for easier testing and decoupling from specific git implementations.
pub trait GitClient {
    /// Creates `branch` at HEAD and makes it the current branch.
    fn create_and_checkout_branch(&self, branch: &str) -> Result<()>;

    /// Stages a file given relative to the repository root.
    fn stage_file(&self, path: &Path) -> Result<()>;

    /// Commits the index on the current branch and returns the commit id.
    fn commit(&self, message: &str) -> Result<String>;

    /// Names of the remote-tracking branches without their remote prefix,
    /// de-duplicated, `HEAD` excluded, in the order git reports them.
    fn remote_branches(&self) -> Result<Vec<String>>;

    /// Forces the working tree to the tip of `origin/<branch>` (detached).
    fn checkout_remote_branch(&self, branch: &str) -> Result<()>;
}

/// Concrete implementation of GitClient using the git2 crate.
pub struct Git2Client {
    repo: Repository,
}

impl Git2Client {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref())
            .with_context(|| format!("Failed to open repository at {}", path.as_ref().display()))?;
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }
}

impl GitClient for Git2Client {
    fn create_and_checkout_branch(&self, branch: &str) -> Result<()> {
        let head = self
            .repo
            .head()
            .context("Repository has no HEAD to branch from")?
            .peel_to_commit()?;
        self.repo
            .branch(branch, &head, false)
            .with_context(|| format!("Failed to create branch {branch}"))?;
        self.repo.set_head(&format!("refs/heads/{branch}"))?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().safe()))
            .with_context(|| format!("Failed to check out branch {branch}"))?;
        debug!(branch, "created and checked out branch");
        Ok(())
    }

    fn stage_file(&self, path: &Path) -> Result<()> {
        let mut index = self.repo.index()?;
        index
            .add_path(path)
            .with_context(|| format!("Failed to stage {}", path.display()))?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let signature = self
            .repo
            .signature()
            .context("No git identity configured (user.name / user.email)")?;
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .context("Failed to create commit")?;
        debug!(commit = %oid, "created commit");
        Ok(oid.to_string())
    }

    fn remote_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if name.contains("HEAD") {
                continue;
            }
            let short = name.split_once('/').map_or(name, |(_, rest)| rest).to_string();
            if !short.is_empty() && !names.contains(&short) {
                names.push(short);
            }
        }
        Ok(names)
    }

    fn checkout_remote_branch(&self, branch: &str) -> Result<()> {
        let reference = self
            .repo
            .find_branch(&format!("origin/{branch}"), BranchType::Remote)
            .or_else(|_| self.repo.find_branch(branch, BranchType::Local))
            .map_err(|e| anyhow!("Branch {branch} not found: {e}"))?;
        let commit = reference.get().peel_to_commit()?;
        self.repo
            .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))
            .with_context(|| format!("Failed to check out {branch}"))?;
        self.repo.set_head_detached(commit.id())?;
        debug!(branch, commit = %commit.id(), "checked out branch");
        Ok(())
    }
}

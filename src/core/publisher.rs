use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

use crate::core::fetcher::run;
use crate::core::git::{Git2Client, GitClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub title: String,
    pub body: String,
}

/// What to publish from a modified working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub branch: String,
    /// Files to stage, relative to the repository root.
    pub files: Vec<PathBuf>,
    pub commit_message: String,
    pub pull_request: Option<PullRequest>,
}

/// Commits, pushes and optionally opens a pull request.
pub trait Publisher {
    fn publish(&self, repo_root: &Path, request: &PublishRequest) -> Result<()>;
}

/// Commits through `git2`, then pushes with `git` and opens the pull request
/// with `gh`, both run inside the repository.
pub struct GitPublisher {
    remote: String,
}

impl GitPublisher {
    pub fn new() -> Self {
        Self {
            remote: "origin".to_string(),
        }
    }

    /// Creates the branch, stages the files and commits. Returns the commit id.
    pub fn commit_locally(&self, repo_root: &Path, request: &PublishRequest) -> Result<String> {
        let client = Git2Client::new(repo_root)?;
        client.create_and_checkout_branch(&request.branch)?;
        for file in &request.files {
            client.stage_file(file)?;
        }
        client.commit(&request.commit_message)
    }

    fn push(&self, repo_root: &Path, branch: &str) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["push", "-u", self.remote.as_str(), branch])
            .current_dir(repo_root);
        run(&mut cmd, "git push")
    }

    fn open_pull_request(&self, repo_root: &Path, pr: &PullRequest) -> Result<()> {
        let mut cmd = Command::new("gh");
        cmd.args([
            "pr",
            "create",
            "--fill",
            "--title",
            pr.title.as_str(),
            "--body",
            pr.body.as_str(),
        ])
        .current_dir(repo_root);
        run(&mut cmd, "gh pr create")
    }
}

impl Default for GitPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, repo_root: &Path, request: &PublishRequest) -> Result<()> {
        let commit = self.commit_locally(repo_root, request)?;
        info!(branch = %request.branch, commit = %commit, "committed change");

        self.push(repo_root, &request.branch)?;
        info!(branch = %request.branch, remote = %self.remote, "pushed branch");

        if let Some(pr) = &request.pull_request {
            self.open_pull_request(repo_root, pr)?;
            info!(title = %pr.title, "opened pull request");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Repository;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_commit_locally_creates_branch_commit() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();

        let props = Path::new("env/dev/parameters.properties");
        fs::create_dir_all(dir.path().join("env/dev")).unwrap();
        fs::write(dir.path().join(props), "a.adapter=0\n").unwrap();
        let client = Git2Client::from_repository(repo);
        client.stage_file(props).unwrap();
        client.commit("seed").unwrap();

        fs::write(dir.path().join(props), "a.adapter=1\n").unwrap();
        let request = PublishRequest {
            branch: "toggle/adapters-dev".to_string(),
            files: vec![props.to_path_buf()],
            commit_message: "chore(env:dev): flip adapters a.adapter".to_string(),
            pull_request: None,
        };
        GitPublisher::new()
            .commit_locally(dir.path(), &request)
            .unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        let head = repo.head().unwrap();
        assert_eq!(head.shorthand(), Some("toggle/adapters-dev"));
        let commit = head.peel_to_commit().unwrap();
        assert_eq!(commit.message(), Some("chore(env:dev): flip adapters a.adapter"));
        let blob = commit
            .tree()
            .unwrap()
            .get_path(props)
            .unwrap()
            .to_object(&repo)
            .unwrap()
            .peel_to_blob()
            .unwrap();
        assert_eq!(blob.content(), b"a.adapter=1\n");
    }
}

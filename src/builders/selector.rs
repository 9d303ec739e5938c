use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const DEFAULT_INCLUDES: &[&str] = &[
    "**/*.properties",
    "**/*.yml",
    "**/*.yaml",
    "**/*.conf",
    "**/*.ini",
    "**/*.txt",
    "**/*.env",
    "**/*.json",
];
pub const DEFAULT_EXCLUDES: &[&str] = &["**/.git/**", "**/node_modules/**", "**/dist/**"];

/// Used when the include list given on the command line is empty.
pub const FALLBACK_INCLUDES: &[&str] = &["**/*"];
/// Used when the exclude list given on the command line is empty.
pub const FALLBACK_EXCLUDES: &[&str] = &["**/.git/**", "**/node_modules/**"];

/// Picks the files of a directory tree that a scan should look at.
pub trait FileSelector {
    fn select(&self, root: &Path) -> Vec<PathBuf>;
}

/// Include/exclude glob filtering over a `walkdir` traversal.
///
/// Globs are matched against the path relative to the root with `/`
/// separators; `*` stays within one path segment and `**` crosses them.
/// Exclusion wins over inclusion.
pub struct GlobSelector {
    includes: GlobSet,
    excludes: GlobSet,
}

impl GlobSelector {
    /// Compiles both lists. Patterns that fail to compile are dropped with a
    /// warning instead of failing the whole scan.
    pub fn new<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Self {
        Self {
            includes: build_set(includes),
            excludes: build_set(excludes),
        }
    }

    /// Whether a root-relative, `/`-separated path is selected.
    pub fn is_selected(&self, relative: &str) -> bool {
        !self.excludes.is_match(relative) && self.includes.is_match(relative)
    }
}

impl FileSelector for GlobSelector {
    fn select(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "error walking directory; skipping entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                warn!(path = %entry.path().display(), "failed to get relative path");
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            if self.is_selected(&relative) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!(root = %root.display(), selected = files.len(), "selected files");
        files
    }
}

/// Checks that a glob pattern compiles with the same options the selector uses.
pub fn compile_glob(pattern: &str) -> Result<globset::Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

fn build_set<S: AsRef<str>>(patterns: &[S]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns.iter().map(AsRef::as_ref) {
        match compile_glob(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(pattern, error = %e, "invalid glob pattern; ignoring"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "failed to build glob set; matching nothing");
        GlobSet::empty()
    })
}

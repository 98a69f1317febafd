//! Repository backend — the narrow interface the ordering core consumes.
//!
//! [`Repository`] is the seam: revision parsing, remote listing and
//! reachability enumeration. [`GitRepository`] is the production backend:
//! revisions and remotes come from libgit2, reachability comes from the
//! `git log` CLI (topo-order walks are what git itself is fastest at).

use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use crate::{CommitId, SortError};

#[cfg(test)]
pub(crate) mod memory;

// ─── Backend contract ───────────────────────────────────────────────

/// Why a revision specification did not resolve to a commit.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RevisionError {
    /// Not a syntactically valid revision specification
    #[error("invalid revision: {0}")]
    Invalid(String),
    /// Valid syntax, but nothing (or nothing unambiguous) in the repository matches
    #[error("revision not found: {0}")]
    NotFound(String),
}

/// Operations the ordering core needs from a version-control store.
pub trait Repository {
    /// Resolve a revision spec (full or abbreviated hash, ref name, `HEAD`, ...) to a commit id.
    fn resolve_revision(&self, spec: &str) -> Result<CommitId, RevisionError>;

    /// Configured remotes as `(remote name, url)` pairs.
    fn list_remotes(&self) -> Result<Vec<(String, String)>, SortError>;

    /// Commits reachable from any of `includes` but from none of `excludes`,
    /// in ancestry order, oldest first.
    fn enumerate_reachable(
        &self,
        includes: &[CommitId],
        excludes: &[CommitId],
    ) -> Result<Vec<CommitId>, SortError>;
}

// ─── Repository location ────────────────────────────────────────────

/// Locate the repository to sort against.
///
/// `GIT_DIR` wins when set; otherwise walk up from the current directory.
pub fn open_repository() -> Result<GitRepository, SortError> {
    match std::env::var_os("GIT_DIR") {
        Some(dir) => GitRepository::open(Path::new(&dir)),
        None => GitRepository::discover(&std::env::current_dir()?),
    }
}

// ─── libgit2 + git CLI backend ──────────────────────────────────────

/// Production backend over an on-disk git repository.
pub struct GitRepository {
    repo: git2::Repository,
    git_dir: PathBuf,
}

impl GitRepository {
    /// Open the repository whose git directory (or work tree) is exactly `path`.
    pub fn open(path: &Path) -> Result<Self, SortError> {
        Ok(Self::from_git2(git2::Repository::open(path)?))
    }

    /// Find the enclosing repository by walking up from `start`.
    pub fn discover(start: &Path) -> Result<Self, SortError> {
        Ok(Self::from_git2(git2::Repository::discover(start)?))
    }

    fn from_git2(repo: git2::Repository) -> Self {
        let git_dir = repo.path().to_path_buf();
        GitRepository { repo, git_dir }
    }

    /// The `.git` directory backing this repository.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}

impl Repository for GitRepository {
    fn resolve_revision(&self, spec: &str) -> Result<CommitId, RevisionError> {
        let object = self.repo.revparse_single(spec).map_err(|e| match e.code() {
            git2::ErrorCode::InvalidSpec => RevisionError::Invalid(e.message().to_string()),
            _ => RevisionError::NotFound(e.message().to_string()),
        })?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| RevisionError::NotFound(e.message().to_string()))?;
        Ok(commit.id().to_string())
    }

    fn list_remotes(&self) -> Result<Vec<(String, String)>, SortError> {
        let names = self.repo.remotes()?;
        let mut remotes = Vec::with_capacity(names.len());
        for name in names.iter().flatten() {
            let remote = self.repo.find_remote(name)?;
            if let Some(url) = remote.url() {
                remotes.push((name.to_string(), url.to_string()));
            }
        }
        Ok(remotes)
    }

    fn enumerate_reachable(
        &self,
        includes: &[CommitId],
        excludes: &[CommitId],
    ) -> Result<Vec<CommitId>, SortError> {
        let start = Instant::now();

        let mut cmd = Command::new("git");
        cmd.arg("--git-dir")
            .arg(&self.git_dir)
            .args(["log", "--topo-order", "--reverse", "--pretty=tformat:%H"])
            .args(excludes.iter().map(|rev| format!("^{}", rev)))
            .args(includes)
            .arg("--")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let commits = stream_hashes(&mut cmd)?;

        debug!(
            commits = commits.len(),
            includes = includes.len(),
            excludes = excludes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "enumerated reachable commits"
        );
        Ok(commits)
    }
}

/// Run `cmd`, collecting commit ids from its stdout while stderr drains on a
/// separate thread so neither pipe can fill up and stall the child.
pub(crate) fn stream_hashes(cmd: &mut Command) -> Result<Vec<CommitId>, SortError> {
    let mut child = cmd.spawn().map_err(|e| {
        SortError::Backend(format!("Failed to execute git: {}. Is git installed and in PATH?", e))
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SortError::Backend("Failed to capture git log stdout".to_string()))?;
    let stderr = child.stderr.take();

    let (commits, diagnostic) = std::thread::scope(|scope| {
        let drain = scope.spawn(move || -> std::io::Result<Vec<u8>> {
            let mut bytes = Vec::new();
            if let Some(mut pipe) = stderr {
                pipe.read_to_end(&mut bytes)?;
            }
            Ok(bytes)
        });
        let commits = parse_hash_stream(std::io::BufReader::new(stdout));
        let diagnostic = drain
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stderr reader panicked")));
        (commits, diagnostic)
    });
    let commits = commits?;
    let diagnostic = diagnostic?;

    let status = child.wait()?;
    if !status.success() {
        let mut message = String::from_utf8_lossy(&diagnostic).trim_end().to_string();
        if message.is_empty() {
            message = format!("git log exited with status: {}", status);
        }
        return Err(SortError::Backend(message));
    }
    Ok(commits)
}

/// Collect one commit id per non-empty line of `git log --pretty=tformat:%H` output.
pub(crate) fn parse_hash_stream<R: BufRead>(reader: R) -> Result<Vec<CommitId>, SortError> {
    let mut commits = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let hash = line.trim();
        if !hash.is_empty() {
            commits.push(hash.to_string());
        }
    }
    Ok(commits)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

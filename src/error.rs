//! Unified error type for upstream ordering.

use thiserror::Error;

/// All fatal errors raised while resolving heads, building history or mapping input lines.
///
/// Commits that resolve fine but never appear upstream are not an error here;
/// they are carried back in [`crate::SortReport`] so sorted output can still be produced.
#[derive(Error, Debug)]
pub enum SortError {
    /// Two heads in one head list share a link name
    #[error("head name \"{0}\" is not unique")]
    DuplicateLink(String),

    /// A remote matched a chain link but its primary branch is missing
    #[error("could not read revision \"{rev}\", does that remote not have a master branch?")]
    MissingBranch { rev: String },

    /// A revision the tool itself needs (e.g. `HEAD`) did not resolve
    #[error("could not resolve revision \"{rev}\": {message}")]
    Revision { rev: String, message: String },

    /// The leading token of an input line is not a revision specification
    #[error("did not find a commit hash on line {line}:\n{content}")]
    InvalidToken { line: usize, content: String },

    /// The leading token parsed but names no commit in the repository
    #[error("commit hash on line {line} not found in the repository:\n{content}")]
    UnknownCommit { line: usize, content: String },

    /// The log enumeration process failed; the message is its diagnostic output
    #[error("git log exited with an error:\n{0}")]
    Backend(String),

    /// libgit2 error (repository discovery, revision parsing, config access)
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error (stdin, stdout, cache file, subprocess pipes)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache record encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Cache file exists but cannot be decoded
    #[error("Failed to load history cache from {path}: {message}")]
    CacheLoad { path: String, message: String },
}

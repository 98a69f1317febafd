//! # git_sort — upstream commit ordering
//!
//! Orders lines that start with a commit hash by the order those commits
//! landed upstream across a chain of related repositories (a subsystem tree
//! feeding an integration tree feeding mainline).
//!
//! Pipeline, leaves first:
//!
//! 1. [`chain::resolve_heads`]: which links of the [`chain::DEFAULT_CHAIN`]
//!    are configured as remotes, and where their `master` branches point.
//! 2. [`history::build_history`]: the commits each link contributes that no
//!    earlier link already has, oldest first.
//! 3. [`cache::resolve_history`]: reuses the last history while the head
//!    list is unchanged.
//! 4. [`ordering::UpstreamOrder`]: walks links and their histories, claiming
//!    input commits in upstream order.
//! 5. [`lines::sort_lines`]: maps raw input lines onto commits and drives the rest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod cache;
pub mod chain;
pub mod error;
pub mod git;
pub mod history;
pub mod lines;
pub mod ordering;

pub use cache::{resolve_history, CacheOutcome, CacheRecord, CacheStore, FileCacheStore, MemoryCacheStore};
pub use chain::{resolve_heads, ChainLink, DEFAULT_CHAIN};
pub use error::SortError;
pub use git::{open_repository, GitRepository, Repository, RevisionError};
pub use history::build_history;
pub use lines::{sort_lines, LineGroups, SortReport};
pub use ordering::{SortedEntry, UpstreamOrder};

// ─── Core types ─────────────────────────────────────────────────────

/// Full hexadecimal commit id.
pub type CommitId = String;

/// Name of the synthetic link used when the repository is not a clone of the chain.
pub const SYNTHETIC_HEAD: &str = "HEAD";

/// A chain link resolved to the commit its branch points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Head {
    pub link_name: String,
    pub commit: CommitId,
}

impl Head {
    pub fn new(link_name: impl Into<String>, commit: impl Into<CommitId>) -> Self {
        Head {
            link_name: link_name.into(),
            commit: commit.into(),
        }
    }
}

/// Resolved heads in catalog order. Link names are unique.
pub type HeadList = Vec<Head>;

/// Link name → commits only that link contributes, oldest first.
pub type HistoryMap = HashMap<String, Vec<CommitId>>;

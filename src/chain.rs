//! Chain catalog and head resolution.
//!
//! The catalog lists every link of the upstream chain together with the remote
//! URLs that identify it. Links that come first merge from links further down:
//! network commits usually travel `net-next` → `net` → `linux.git`. A commit
//! that is in none of these remotes is "not upstream" and cannot be sorted.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::git::Repository;
use crate::{Head, HeadList, SortError, SYNTHETIC_HEAD};

/// One named position in the upstream chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub name: &'static str,
    pub urls: &'static [&'static str],
}

/// The chain the tool sorts against, most integrated tree first.
pub const DEFAULT_CHAIN: &[ChainLink] = &[
    ChainLink {
        name: "linux.git",
        urls: &[
            "git://git.kernel.org/pub/scm/linux/kernel/git/torvalds/linux.git",
            "https://git.kernel.org/pub/scm/linux/kernel/git/torvalds/linux.git",
            "https://kernel.googlesource.com/pub/scm/linux/kernel/git/torvalds/linux.git",
        ],
    },
    ChainLink {
        name: "net",
        urls: &[
            "git://git.kernel.org/pub/scm/linux/kernel/git/davem/net.git",
            "https://git.kernel.org/pub/scm/linux/kernel/git/davem/net.git",
            "https://kernel.googlesource.com/pub/scm/linux/kernel/git/davem/net.git",
        ],
    },
    ChainLink {
        name: "net-next",
        urls: &[
            "git://git.kernel.org/pub/scm/linux/kernel/git/davem/net-next.git",
            "https://git.kernel.org/pub/scm/linux/kernel/git/davem/net-next.git",
            "https://kernel.googlesource.com/pub/scm/linux/kernel/git/davem/net-next.git",
        ],
    },
];

/// Branch of each matched remote that defines the link's head.
const PRIMARY_BRANCH: &str = "master";

/// Resolve the catalog against the remotes configured in `repo`.
///
/// Each link contributes at most one head: the first of its URLs that some
/// remote uses wins. A matched remote without a `master` branch is fatal.
/// When the first catalog link is not among the results, the repository is not
/// a clone of the top-level tree and a single synthetic `HEAD` link is returned.
pub fn resolve_heads<R: Repository + ?Sized>(
    repo: &R,
    catalog: &[ChainLink],
) -> Result<HeadList, SortError> {
    // First remote wins when several share a URL.
    let mut remotes: HashMap<String, String> = HashMap::new();
    for (name, url) in repo.list_remotes()? {
        remotes.entry(url).or_insert(name);
    }

    let mut heads = HeadList::new();
    for link in catalog {
        let Some(remote) = link.urls.iter().find_map(|url| remotes.get(*url)) else {
            continue;
        };
        let rev = format!("{}/{}", remote, PRIMARY_BRANCH);
        let commit = repo
            .resolve_revision(&rev)
            .map_err(|_| SortError::MissingBranch { rev: rev.clone() })?;
        debug!(link = link.name, rev = %rev, commit = %commit, "resolved chain link");
        heads.push(Head::new(link.name, commit));
    }

    let recognized = match (heads.first(), catalog.first()) {
        (Some(head), Some(top)) => head.link_name == top.name,
        _ => false,
    };
    if !recognized {
        let commit = repo
            .resolve_revision(SYNTHETIC_HEAD)
            .map_err(|e| SortError::Revision {
                rev: SYNTHETIC_HEAD.to_string(),
                message: e.to_string(),
            })?;
        info!(commit = %commit, "not a clone of the top-level tree, sorting by HEAD history");
        return Ok(vec![Head::new(SYNTHETIC_HEAD, commit)]);
    }

    Ok(heads)
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;

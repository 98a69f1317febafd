//! History builder — partitions the chain's reachable history by link.

use std::time::Instant;

use tracing::debug;

use crate::git::Repository;
use crate::{CommitId, HeadList, HistoryMap, SortError};

/// For each head in order, list the commits reachable from it but from no
/// earlier head, oldest first.
///
/// Every processed head becomes an exclusion for all later ones, so the
/// per-link lists are disjoint and together cover everything reachable from
/// any head.
pub fn build_history<R: Repository + ?Sized>(
    repo: &R,
    heads: &HeadList,
) -> Result<HistoryMap, SortError> {
    let start = Instant::now();
    let mut history = HistoryMap::with_capacity(heads.len());
    let mut processed: Vec<CommitId> = Vec::with_capacity(heads.len());

    for head in heads {
        if history.contains_key(&head.link_name) {
            return Err(SortError::DuplicateLink(head.link_name.clone()));
        }

        let link_start = Instant::now();
        let commits = repo.enumerate_reachable(std::slice::from_ref(&head.commit), &processed)?;
        debug!(
            link = %head.link_name,
            commits = commits.len(),
            elapsed_ms = link_start.elapsed().as_millis() as u64,
            "built link history"
        );

        history.insert(head.link_name.clone(), commits);
        processed.push(head.commit.clone());
    }

    debug!(
        links = heads.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "history rebuilt"
    );
    Ok(history)
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;

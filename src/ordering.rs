//! Ordering engine — claims pending commits in upstream order.
//!
//! Links are walked in head-list order and each link's history oldest first.
//! A pending commit is claimed (removed from the pending set and yielded) the
//! first time the walk reaches it, so nothing is emitted twice even if a commit
//! were listed under two links. Whatever is still pending when the walk ends
//! was never reached from any head.

use std::collections::HashMap;
use std::fmt;

use crate::{CommitId, Head, HistoryMap};

/// One claimed commit and the payload that was waiting for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortedEntry<'a, T> {
    pub link_name: &'a str,
    pub commit: CommitId,
    pub value: T,
}

impl<T: fmt::Debug> fmt::Display for SortedEntry<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}", self.link_name, self.value)
    }
}

/// Lazy, single-pass walk over the upstream order.
///
/// Owns the pending map; call [`UpstreamOrder::into_remaining`] after the walk
/// to get the commits nobody claimed.
pub struct UpstreamOrder<'a, T> {
    heads: &'a [Head],
    history: &'a HistoryMap,
    pending: HashMap<CommitId, T>,
    link: usize,
    position: usize,
}

impl<'a, T> UpstreamOrder<'a, T> {
    pub fn new(heads: &'a [Head], history: &'a HistoryMap, pending: HashMap<CommitId, T>) -> Self {
        UpstreamOrder {
            heads,
            history,
            pending,
            link: 0,
            position: 0,
        }
    }

    /// Number of commits still waiting to be claimed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Unclaimed commits. Only meaningful once the iterator is exhausted.
    pub fn into_remaining(self) -> HashMap<CommitId, T> {
        self.pending
    }
}

impl<'a, T> Iterator for UpstreamOrder<'a, T> {
    type Item = SortedEntry<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let heads: &'a [Head] = self.heads;
        let history: &'a HistoryMap = self.history;

        while let Some(head) = heads.get(self.link) {
            if self.pending.is_empty() {
                self.link = heads.len();
                return None;
            }
            // A link absent from the history map contributes nothing.
            let commits = history
                .get(&head.link_name)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            while let Some(commit) = commits.get(self.position) {
                self.position += 1;
                if let Some(value) = self.pending.remove(commit) {
                    return Some(SortedEntry {
                        link_name: head.link_name.as_str(),
                        commit: commit.clone(),
                        value,
                    });
                }
            }

            self.link += 1;
            self.position = 0;
        }
        None
    }
}

#[cfg(test)]
#[path = "ordering_tests.rs"]
mod tests;

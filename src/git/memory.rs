//! In-memory commit graph implementing [`Repository`] for tests.
//!
//! Commits must be added parents-first, so creation order is always a valid
//! ancestry order; enumeration simply filters it.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use super::{Repository, RevisionError};
use crate::{CommitId, SortError};

#[derive(Default)]
pub(crate) struct MemoryRepository {
    order: Vec<CommitId>,
    parents: HashMap<CommitId, Vec<CommitId>>,
    refs: HashMap<String, CommitId>,
    remotes: Vec<(String, String)>,
    enumerate_calls: Cell<usize>,
    fail_enumeration: Option<String>,
}

impl MemoryRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a commit; every parent must already exist.
    pub(crate) fn commit(&mut self, id: &str, parents: &[&str]) -> CommitId {
        for parent in parents {
            assert!(self.parents.contains_key(*parent), "unknown parent {}", parent);
        }
        assert!(!self.parents.contains_key(id), "duplicate commit {}", id);
        self.order.push(id.to_string());
        self.parents
            .insert(id.to_string(), parents.iter().map(|p| p.to_string()).collect());
        id.to_string()
    }

    pub(crate) fn set_ref(&mut self, name: &str, target: &str) {
        self.refs.insert(name.to_string(), target.to_string());
    }

    pub(crate) fn add_remote(&mut self, name: &str, url: &str) {
        self.remotes.push((name.to_string(), url.to_string()));
    }

    /// Make every subsequent enumeration fail with `diagnostic`.
    pub(crate) fn fail_enumeration(&mut self, diagnostic: &str) {
        self.fail_enumeration = Some(diagnostic.to_string());
    }

    /// Number of `enumerate_reachable` calls so far.
    pub(crate) fn enumerate_calls(&self) -> usize {
        self.enumerate_calls.get()
    }

    /// All ancestors of `roots`, inclusive.
    pub(crate) fn ancestors(&self, roots: &[CommitId]) -> HashSet<CommitId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&CommitId> = roots.iter().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(id) {
                stack.extend(parents.iter());
            }
        }
        seen
    }

    pub(crate) fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        self.ancestors(&[descendant.to_string()]).contains(ancestor)
    }
}

impl Repository for MemoryRepository {
    fn resolve_revision(&self, spec: &str) -> Result<CommitId, RevisionError> {
        if spec.is_empty()
            || spec.contains("..")
            || spec.chars().any(|c| c.is_whitespace() || c == '{' || c == '}')
        {
            return Err(RevisionError::Invalid(format!("invalid spec '{}'", spec)));
        }
        if let Some(target) = self.refs.get(spec) {
            return Ok(target.clone());
        }
        if self.parents.contains_key(spec) {
            return Ok(spec.to_string());
        }
        let matches: Vec<&CommitId> = if spec.len() >= 4 {
            self.order.iter().filter(|id| id.starts_with(spec)).collect()
        } else {
            Vec::new()
        };
        match matches.as_slice() {
            [only] => Ok((*only).clone()),
            [] => Err(RevisionError::NotFound(format!("revspec '{}' not found", spec))),
            _ => Err(RevisionError::NotFound(format!("short id '{}' is ambiguous", spec))),
        }
    }

    fn list_remotes(&self) -> Result<Vec<(String, String)>, SortError> {
        Ok(self.remotes.clone())
    }

    fn enumerate_reachable(
        &self,
        includes: &[CommitId],
        excludes: &[CommitId],
    ) -> Result<Vec<CommitId>, SortError> {
        self.enumerate_calls.set(self.enumerate_calls.get() + 1);
        if let Some(diagnostic) = &self.fail_enumeration {
            return Err(SortError::Backend(diagnostic.clone()));
        }
        for rev in includes.iter().chain(excludes) {
            if !self.parents.contains_key(rev) {
                return Err(SortError::Backend(format!("fatal: bad object {}", rev)));
            }
        }
        let reachable = self.ancestors(includes);
        let hidden = self.ancestors(excludes);
        Ok(self
            .order
            .iter()
            .filter(|id| reachable.contains(*id) && !hidden.contains(*id))
            .cloned()
            .collect())
    }
}

//! Line mapper — maps input lines onto commits and emits them in upstream order.
//!
//! Each input line starts with a revision (usually an abbreviated hash)
//! followed by whitespace and anything else, e.g. a patch file name or a
//! shortlog subject. Lines are written back byte for byte, terminators
//! included, so the output can be fed to whatever produced the input.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::cache::{resolve_history, CacheOutcome, CacheStore};
use crate::chain::{resolve_heads, ChainLink};
use crate::git::{Repository, RevisionError};
use crate::ordering::UpstreamOrder;
use crate::{CommitId, SortError};

/// Heading printed above lines whose commit is not upstream.
pub const UNRESOLVED_HEADING: &str = "Error: the following entries were not found upstream:";

// ─── Grouping ───────────────────────────────────────────────────────

/// Input lines grouped by canonical commit id.
///
/// Groups remember the order in which their commit first appeared; lines
/// within a group keep input order.
#[derive(Debug, Default)]
pub struct LineGroups {
    order: Vec<CommitId>,
    groups: HashMap<CommitId, Vec<Vec<u8>>>,
}

impl LineGroups {
    /// Read every line of `reader` and resolve its leading token.
    ///
    /// Only the token has to be UTF-8; the rest of the line is kept as raw bytes.
    ///
    /// The first line that fails to resolve aborts the whole read; a partially
    /// sorted list would be misleading.
    pub fn parse<B, R>(mut reader: B, repo: &R) -> Result<Self, SortError>
    where
        B: BufRead,
        R: Repository + ?Sized,
    {
        let mut groups = LineGroups::default();
        let mut line = Vec::new();
        let mut number = 0usize;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            number += 1;

            let content = String::from_utf8_lossy(line.trim_ascii()).into_owned();
            let Some(token) = leading_token(&line) else {
                return Err(SortError::InvalidToken { line: number, content });
            };
            let commit = match repo.resolve_revision(token) {
                Ok(commit) => commit,
                Err(RevisionError::Invalid(_)) => {
                    return Err(SortError::InvalidToken { line: number, content });
                }
                Err(RevisionError::NotFound(msg)) => {
                    debug!(line = number, token, reason = %msg, "token did not resolve");
                    return Err(SortError::UnknownCommit { line: number, content });
                }
            };
            groups.push(commit, line.clone());
        }

        debug!(lines = number, commits = groups.len(), "parsed input");
        Ok(groups)
    }

    /// Append `line` to the group for `commit`.
    pub fn push(&mut self, commit: CommitId, line: Vec<u8>) {
        match self.groups.get_mut(&commit) {
            Some(lines) => lines.push(line),
            None => {
                self.order.push(commit.clone());
                self.groups.insert(commit, vec![line]);
            }
        }
    }

    /// Number of distinct commits.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, commit: &str) -> Option<&[Vec<u8>]> {
        self.groups.get(commit).map(Vec::as_slice)
    }

    /// First-appearance order and the grouping itself.
    pub fn into_parts(self) -> (Vec<CommitId>, HashMap<CommitId, Vec<Vec<u8>>>) {
        (self.order, self.groups)
    }
}

/// First whitespace-delimited token of `line`, if it is valid UTF-8.
fn leading_token(line: &[u8]) -> Option<&str> {
    let token = line
        .split(u8::is_ascii_whitespace)
        .find(|t| !t.is_empty())?;
    std::str::from_utf8(token).ok()
}

// ─── Sorting ────────────────────────────────────────────────────────

/// Outcome of a [`sort_lines`] run that did not fail outright.
#[derive(Debug)]
pub struct SortReport {
    /// Lines written to the output.
    pub emitted: usize,
    /// Commits claimed per link, in head order.
    pub per_link: Vec<(String, usize)>,
    /// Lines whose commit no configured head reaches, in input grouping order.
    pub unresolved: Vec<Vec<u8>>,
    pub cache: CacheOutcome,
}

impl SortReport {
    /// True when every input commit was found upstream.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Write the "not found upstream" report. Writes nothing when complete.
    pub fn write_unresolved<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        writeln!(out, "{}", UNRESOLVED_HEADING)?;
        for line in &self.unresolved {
            out.write_all(line)?;
        }
        Ok(())
    }
}

/// Sort the lines of `input` into upstream order, writing them to `out`.
///
/// Input is read and resolved completely before anything is written. Lines
/// whose commit is never reached are returned in the report rather than failing
/// the run, so the caller decides how to flag them.
pub fn sort_lines<B, R, S, W>(
    input: B,
    repo: &R,
    store: &mut S,
    catalog: &[ChainLink],
    out: &mut W,
) -> Result<SortReport, SortError>
where
    B: BufRead,
    R: Repository + ?Sized,
    S: CacheStore + ?Sized,
    W: Write,
{
    let groups = LineGroups::parse(input, repo)?;
    let heads = resolve_heads(repo, catalog)?;
    let resolved = resolve_history(store, repo, &heads)?;

    let (first_seen, pending) = groups.into_parts();
    let mut per_link: Vec<(String, usize)> =
        heads.iter().map(|h| (h.link_name.clone(), 0)).collect();
    let mut emitted = 0usize;

    let mut walk = UpstreamOrder::new(&heads, &resolved.history, pending);
    for entry in walk.by_ref() {
        if let Some(slot) = per_link.iter_mut().find(|(name, _)| name == entry.link_name) {
            slot.1 += 1;
        }
        for line in &entry.value {
            out.write_all(line)?;
        }
        emitted += entry.value.len();
    }
    out.flush()?;

    let mut remaining = walk.into_remaining();
    let unresolved: Vec<Vec<u8>> = first_seen
        .iter()
        .filter_map(|commit| remaining.remove(commit))
        .flatten()
        .collect();
    if !unresolved.is_empty() {
        warn!(lines = unresolved.len(), "entries not found upstream");
    }

    Ok(SortReport {
        emitted,
        per_link,
        unresolved,
        cache: resolved.outcome,
    })
}

#[cfg(test)]
#[path = "lines_tests.rs"]
mod tests;

//! `--dump-heads`: show cached and current heads and whether history will be rebuilt.

use std::io::Write;

use git_sort::cache::{rebuild_reason, CacheStore};
use git_sort::{resolve_heads, ChainLink, HeadList, Repository, SortError};

/// Print the dump. Never fails on cache or repository problems, only on output errors.
pub(crate) fn dump_heads<W: Write>(
    store: &mut dyn CacheStore,
    repo: Result<&dyn Repository, &SortError>,
    catalog: &[ChainLink],
    out: &mut W,
) -> std::io::Result<()> {
    let cached = match store.load() {
        Ok(record) => record,
        Err(e) => {
            writeln!(out, "(cache unreadable: {})", e)?;
            None
        }
    };

    writeln!(out, "Cached heads:")?;
    match &cached {
        Some(record) => writeln!(out, "{}", render(&record.heads))?,
        None => writeln!(out, "None")?,
    }

    writeln!(out, "Current heads:")?;
    let current = repo.map_err(|e| e.to_string()).and_then(|repo| {
        resolve_heads(repo, catalog).map_err(|e| e.to_string())
    });
    match current {
        Ok(heads) => {
            writeln!(out, "{}", render(&heads))?;
            let action = match rebuild_reason(cached.as_ref(), &heads) {
                Some(_) => "Will",
                None => "Will not",
            };
            writeln!(out, "{} rebuild history", action)?;
        }
        Err(e) => {
            writeln!(out, "(unavailable: {})", e)?;
        }
    }
    Ok(())
}

fn render(heads: &HeadList) -> String {
    serde_json::to_string_pretty(heads).unwrap_or_else(|e| format!("(unprintable: {})", e))
}

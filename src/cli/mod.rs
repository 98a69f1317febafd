//! CLI layer: argument parsing, logging setup, and the two modes.

mod args;
mod dump;

pub(crate) use args::Cli;
pub(crate) use dump::dump_heads;

use std::io::{BufRead, Write};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use git_sort::cache::default_cache_path;
use git_sort::{
    open_repository, sort_lines, CacheStore, FileCacheStore, Repository, SortError, DEFAULT_CHAIN,
};

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cache_path = cli.cache.clone().unwrap_or_else(default_cache_path);
    debug!(cache = %cache_path.display(), "using history cache");
    let mut store = FileCacheStore::new(cache_path);

    if cli.dump_heads {
        let repo = open_repository();
        let repo_ref = repo.as_ref().map(|r| r as &dyn Repository);
        let stdout = std::io::stdout();
        if let Err(e) = dump_heads(&mut store, repo_ref, DEFAULT_CHAIN, &mut stdout.lock()) {
            eprintln!("Error: {}", e);
        }
        std::process::exit(0);
    }

    let result = open_repository().and_then(|repo| {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        cmd_sort(
            stdin.lock(),
            &repo,
            &mut store,
            &mut stdout.lock(),
            &mut stderr.lock(),
        )
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ─── Sort mode ──────────────────────────────────────────────────────

/// Sort `input` to `out`; report leftovers on `err`. Returns the exit code.
pub(crate) fn cmd_sort<B, W, E>(
    input: B,
    repo: &dyn Repository,
    store: &mut dyn CacheStore,
    out: &mut W,
    err: &mut E,
) -> Result<i32, SortError>
where
    B: BufRead,
    W: Write,
    E: Write,
{
    let report = sort_lines(input, repo, store, DEFAULT_CHAIN, out)?;
    debug!(
        emitted = report.emitted,
        unresolved = report.unresolved.len(),
        cache = ?report.cache,
        "sorted input"
    );
    if report.is_complete() {
        return Ok(0);
    }
    report.write_unresolved(err)?;
    Ok(1)
}

//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use git_sort::cache::CACHE_ENV;

/// Sort input lines according to the upstream order of the commits they name.
///
/// The first word of every line is taken to be a commit id. Sorted lines go to
/// stdout; lines whose commit is not in any configured upstream remote are
/// listed on stderr and make the exit status 1.
#[derive(Parser, Debug)]
#[command(name = "git-sort", version, about, long_about = None, after_help = "\
Environment: GIT_DIR selects the repository (default: discovered from the current directory).")]
pub(crate) struct Cli {
    /// Print the branch heads used for sorting (debugging)
    #[arg(short, long)]
    pub dump_heads: bool,

    /// History cache file (default: <cache dir>/git-sort/history.cache)
    #[arg(long, value_name = "PATH", env = CACHE_ENV)]
    pub cache: Option<PathBuf>,

    /// Log level for diagnostics on stderr (RUST_LOG overrides)
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,
}

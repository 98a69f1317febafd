//! git-sort — sort a commit or patch list into upstream integration order.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

mod cli;

fn main() {
    cli::run();
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

//! Unit tests for the ordering engine.

use proptest::prelude::*;

use super::*;

fn heads(names: &[(&str, &str)]) -> Vec<Head> {
    names.iter().map(|(name, commit)| Head::new(*name, *commit)).collect()
}

/// `(link, "c1 c2 ...")` pairs, commits oldest first.
fn history(links: &[(&str, &str)]) -> HistoryMap {
    links
        .iter()
        .map(|(name, commits)| {
            (name.to_string(), commits.split_whitespace().map(str::to_string).collect())
        })
        .collect()
}

/// Pending payloads for `"c1 c2 ..."`.
fn pending(commits: &str) -> HashMap<CommitId, String> {
    commits
        .split_whitespace()
        .map(|c| (c.to_string(), format!("line for {}", c)))
        .collect()
}

#[test]
fn test_walks_links_in_head_order_then_history_order() {
    let heads = heads(&[("top", "t2"), ("lower", "l2")]);
    let history = history(&[("top", "t1 t2"), ("lower", "l1 l2")]);

    let mut order = UpstreamOrder::new(&heads, &history, pending("l2 t2 l1 t1"));
    let claimed: Vec<(&str, CommitId)> = order.by_ref().map(|e| (e.link_name, e.commit)).collect();

    assert_eq!(
        claimed,
        vec![
            ("top", "t1".to_string()),
            ("top", "t2".to_string()),
            ("lower", "l1".to_string()),
            ("lower", "l2".to_string()),
        ]
    );
    assert!(order.into_remaining().is_empty());
}

#[test]
fn test_history_commits_not_pending_are_skipped() {
    let heads = heads(&[("HEAD", "c5")]);
    let history = history(&[("HEAD", "c1 c2 c3 c4 c5")]);

    let values: Vec<String> = UpstreamOrder::new(&heads, &history, pending("c4 c2"))
        .map(|e| e.value)
        .collect();
    assert_eq!(values, vec!["line for c2", "line for c4"]);
}

#[test]
fn test_unreached_commits_are_reported_as_remaining() {
    let heads = heads(&[("HEAD", "c2")]);
    let history = history(&[("HEAD", "c1 c2")]);

    let mut order = UpstreamOrder::new(&heads, &history, pending("c1 elsewhere"));
    assert_eq!(order.by_ref().count(), 1);

    let remaining = order.into_remaining();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining["elsewhere"], "line for elsewhere");
}

#[test]
fn test_commit_listed_under_two_links_is_emitted_once() {
    let heads = heads(&[("top", "x"), ("lower", "x")]);
    let history = history(&[("top", "a x"), ("lower", "x b")]);

    let claimed: Vec<(&str, CommitId)> = UpstreamOrder::new(&heads, &history, pending("x b"))
        .map(|e| (e.link_name, e.commit))
        .collect();
    assert_eq!(claimed, vec![("top", "x".to_string()), ("lower", "b".to_string())]);
}

#[test]
fn test_link_missing_from_history_contributes_nothing() {
    let heads = heads(&[("top", "t1"), ("ghost", "g1"), ("lower", "l1")]);
    let history = history(&[("top", "t1"), ("lower", "l1")]);

    let links: Vec<&str> = UpstreamOrder::new(&heads, &history, pending("l1 t1"))
        .map(|e| e.link_name)
        .collect();
    assert_eq!(links, vec!["top", "lower"]);
}

#[test]
fn test_empty_pending_yields_nothing() {
    let heads = heads(&[("HEAD", "c1")]);
    let history = history(&[("HEAD", "c1")]);

    let mut order = UpstreamOrder::new(&heads, &history, pending(""));
    assert!(order.next().is_none());
    assert!(order.next().is_none());
}

#[test]
fn test_iterator_is_fused_after_exhaustion() {
    let heads = heads(&[("HEAD", "c1")]);
    let history = history(&[("HEAD", "c1")]);

    let mut order = UpstreamOrder::new(&heads, &history, pending("c1 zz"));
    assert!(order.next().is_some());
    assert!(order.next().is_none());
    assert!(order.next().is_none());
    assert_eq!(order.pending(), 1);
}

#[test]
fn test_sorted_entry_display() {
    let entry = SortedEntry {
        link_name: "net",
        commit: "abc".to_string(),
        value: vec!["abc fix\n"],
    };
    assert_eq!(entry.to_string(), "net = [\"abc fix\\n\"]");
}

// ─── Property-based tests (proptest) ─────────────────────────────────

proptest! {
    /// Same inputs, same output sequence; every pending key is emitted at most once.
    #[test]
    fn ordering_is_deterministic_and_at_most_once(
        links in proptest::collection::vec(
            proptest::collection::vec(0u8..40, 0..20), 1..4),
        wanted in proptest::collection::hash_set(0u8..50, 0..30),
    ) {
        let heads: Vec<Head> = (0..links.len())
            .map(|i| Head::new(format!("link{}", i), "tip"))
            .collect();
        let history: HistoryMap = links
            .iter()
            .enumerate()
            .map(|(i, commits)| {
                (format!("link{}", i), commits.iter().map(|c| format!("c{}", c)).collect())
            })
            .collect();
        let make_pending = || -> HashMap<CommitId, u8> {
            wanted.iter().map(|w| (format!("c{}", w), *w)).collect()
        };

        let first: Vec<(String, CommitId)> = UpstreamOrder::new(&heads, &history, make_pending())
            .map(|e| (e.link_name.to_string(), e.commit))
            .collect();
        let second: Vec<(String, CommitId)> = UpstreamOrder::new(&heads, &history, make_pending())
            .map(|e| (e.link_name.to_string(), e.commit))
            .collect();
        prop_assert_eq!(&first, &second);

        let mut seen = std::collections::HashSet::new();
        for (_, commit) in &first {
            prop_assert!(seen.insert(commit.clone()), "{} emitted twice", commit);
        }

        let mut order = UpstreamOrder::new(&heads, &history, make_pending());
        let emitted = order.by_ref().count();
        prop_assert_eq!(emitted + order.into_remaining().len(), wanted.len());
    }
}

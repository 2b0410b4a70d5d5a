//! Multi-word prefix search over the history store
//!
//! Every query word must match some stored word as a prefix (AND semantics),
//! so "cli hist" matches "history clipboard" regardless of word order. This
//! trades arbitrary-substring matching for whole-word prefixes on purpose.

use std::collections::HashSet;

use tracing::error;

use crate::history::{index::tokenize, Entry, HistoryStore};

/// Search the store, returning one page of matches plus the total match
/// count (which the caller uses to decide whether a next page exists).
///
/// A query that tokenizes to nothing (empty, or whitespace only) matches
/// nothing, not everything. Results are id-descending and paginated with the
/// same offset/limit convention as [`HistoryStore::page`].
pub fn search(
    store: &HistoryStore,
    query: &str,
    page_index: u32,
    page_size: u32,
) -> (Vec<Entry>, u32) {
    let query_words = tokenize(query);
    if query_words.is_empty() {
        return (Vec::new(), 0);
    }

    let mut matched: Option<HashSet<u64>> = None;
    for word in &query_words {
        let candidates = store.index().prefix_match(word);
        matched = Some(match matched {
            // Single word: its full prefix-match set
            None => candidates,
            Some(acc) => acc.intersection(&candidates).copied().collect(),
        });

        if matched.as_ref().is_some_and(HashSet::is_empty) {
            return (Vec::new(), 0);
        }
    }

    let matched = matched.unwrap_or_default();
    let total = matched.len() as u32;

    let mut ids: Vec<u64> = matched
        .into_iter()
        .filter(|id| {
            let live = store.entry(*id).is_some();
            if !live {
                // Store and index disagree; keep serving, the invariant
                // violation is a bug to fix, not a reason to crash
                error!("index references dead entry {id}, skipping");
            }
            live
        })
        .collect();
    ids.sort_unstable_by(|a, b| b.cmp(a));

    let entries = ids
        .iter()
        .skip((page_index as usize) * (page_size as usize))
        .take(page_size as usize)
        .filter_map(|id| store.entry(*id).cloned())
        .collect();

    (entries, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(texts: &[&str]) -> HistoryStore {
        let mut store = HistoryStore::new();
        for text in texts {
            store.insert(text.to_string()).unwrap();
        }
        store
    }

    #[test]
    fn test_all_query_words_must_prefix_match() {
        let store = store_with(&["abstract cdrom", "cdabsolute", "abacus cdplayer"]);

        let (entries, total) = search(&store, "ab cd", 0, 9);
        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();

        // "cdabsolute" has a word starting with "cd" but none with "ab"
        assert_eq!(total, 2);
        assert_eq!(texts, vec!["abacus cdplayer", "abstract cdrom"]);
    }

    #[test]
    fn test_prefixes_match_whole_words_not_substrings() {
        let store = store_with(&["abstract code"]);

        // "code" contains "cd"-adjacent letters but does not start with "cd"
        assert_eq!(search(&store, "ab cd", 0, 9).1, 0);
        assert_eq!(search(&store, "ab co", 0, 9).1, 1);
    }

    #[test]
    fn test_word_order_does_not_matter() {
        let store = store_with(&["history clipboard"]);

        let (entries, total) = search(&store, "cli hist", 0, 9);
        assert_eq!(total, 1);
        assert_eq!(entries[0].text, "history clipboard");
    }

    #[test]
    fn test_single_word_query_is_plain_prefix_set() {
        let store = store_with(&["rust rocks", "rusty nail", "python"]);

        let (entries, total) = search(&store, "rus", 0, 9);
        assert_eq!(total, 2);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.text.starts_with("rust")));
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let store = store_with(&["anything"]);

        assert_eq!(search(&store, "", 0, 9), (Vec::new(), 0));
        assert_eq!(search(&store, "   \t", 0, 9), (Vec::new(), 0));
    }

    #[test]
    fn test_no_match_is_empty_and_zero() {
        let store = store_with(&["alpha beta"]);
        assert_eq!(search(&store, "alpha zz", 0, 9), (Vec::new(), 0));
    }

    #[test]
    fn test_results_are_id_descending_and_paginated() {
        let texts: Vec<String> = (0..12).map(|i| format!("note number{i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let store = store_with(&refs);

        let (first, total) = search(&store, "note", 0, 9);
        assert_eq!(total, 12);
        assert_eq!(first.len(), 9);
        assert_eq!(first[0].id, 12);
        assert!(first.windows(2).all(|w| w[0].id > w[1].id));

        let (second, _) = search(&store, "note", 1, 9);
        assert_eq!(second.len(), 3);
        assert_eq!(second[0].id, 3);

        let (past_end, total) = search(&store, "note", 2, 9);
        assert!(past_end.is_empty());
        assert_eq!(total, 12);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let store = store_with(&["Hello World"]);
        let (_, total) = search(&store, "HEL WOR", 0, 9);
        assert_eq!(total, 1);
    }
}

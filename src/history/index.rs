//! Word tokenizer and inverted index for prefix search
//!
//! The index maps each lowercase word to the set of entry ids whose text
//! contains that word. Keys live in a `BTreeMap` so a prefix lookup is a
//! range scan from the prefix, not a walk over every word.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;

/// Split text into a deduplicated set of lowercase words.
///
/// Words are whitespace-delimited; empty text yields an empty set.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Word -> entry-id mapping supporting case-insensitive prefix lookup
#[derive(Debug, Default)]
pub struct InvertedIndex {
    words: BTreeMap<String, HashSet<u64>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry id under each of its words
    pub fn insert(&mut self, id: u64, words: &HashSet<String>) {
        for word in words {
            self.words.entry(word.clone()).or_default().insert(id);
        }
    }

    /// Remove an entry id from each of its words, pruning empty buckets
    pub fn remove(&mut self, id: u64, words: &HashSet<String>) {
        for word in words {
            if let Some(bucket) = self.words.get_mut(word) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.words.remove(word);
                }
            }
        }
    }

    /// Union of id sets for every indexed word starting with `prefix`.
    ///
    /// The prefix is lowercased before matching. An unknown prefix yields an
    /// empty set.
    pub fn prefix_match(&self, prefix: &str) -> HashSet<u64> {
        let prefix = prefix.to_lowercase();
        let mut ids = HashSet::new();

        for (_, bucket) in self
            .words
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(word, _)| word.starts_with(&prefix))
        {
            ids.extend(bucket.iter().copied());
        }

        ids
    }

    /// Ids recorded under exactly `word`, if any
    pub fn ids_for_word(&self, word: &str) -> Option<&HashSet<u64>> {
        self.words.get(word)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }
}

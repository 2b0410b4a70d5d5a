//! Clipboard history store and its derived word index
//!
//! The store is the single owner of the entry collection, the id counter and
//! the inverted index. Every mutation updates the index in the same call, so
//! under the engine's lock a reader can never observe one without the other.

pub mod database;
pub mod index;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::index::{tokenize, InvertedIndex};

/// History store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert attempted for text that is already live. Callers promoting an
    /// existing entry must delete it first.
    #[error("entry with identical text already exists (id {0})")]
    DuplicateText(u64),

    /// Store and index disagree; indicates a logic bug, never user error
    #[error("index inconsistency: {0}")]
    IndexInconsistency(String),
}

/// One stored clipboard text item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Monotonic id, assigned on insert, never reused
    pub id: u64,
    /// The copied text, unique across live entries
    pub text: String,
    /// Lowercase whitespace-split words, always derived from `text`
    #[serde(skip, default)]
    pub words: HashSet<String>,
}

impl Entry {
    fn new(id: u64, text: String) -> Self {
        let words = tokenize(&text);
        Self { id, text, words }
    }
}

/// Ordered, deduplicated collection of clipboard entries.
///
/// Logical order is id-descending (most recent first). Ids keep increasing
/// across `clear()` so no external reference can alias a new entry.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: BTreeMap<u64, Entry>,
    by_text: HashMap<String, u64>,
    index: InvertedIndex,
    next_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            by_text: HashMap::new(),
            index: InvertedIndex::new(),
            next_id: 1,
        }
    }

    /// Rebuild a store (and its index) from persisted `{id, text}` rows
    pub fn from_rows(rows: Vec<(u64, String)>) -> Self {
        let mut store = Self::new();
        for (id, text) in rows {
            let entry = Entry::new(id, text);
            store.index.insert(id, &entry.words);
            store.by_text.insert(entry.text.clone(), id);
            store.next_id = store.next_id.max(id + 1);
            store.entries.insert(id, entry);
        }
        store
    }

    /// Insert new text at the top of the history.
    ///
    /// Fails with [`StoreError::DuplicateText`] if the text is already live;
    /// promote-to-top callers delete first, so the conflict never arises on
    /// the watcher path.
    pub fn insert(&mut self, text: String) -> Result<u64, StoreError> {
        if let Some(&existing) = self.by_text.get(&text) {
            return Err(StoreError::DuplicateText(existing));
        }

        let id = self.next_id;
        self.next_id += 1;

        let entry = Entry::new(id, text);
        self.index.insert(id, &entry.words);
        self.by_text.insert(entry.text.clone(), id);
        self.entries.insert(id, entry);

        Ok(id)
    }

    /// Remove the unique entry with this text, if present
    pub fn delete_by_text(&mut self, text: &str) -> Option<Entry> {
        let id = self.by_text.remove(text)?;
        let entry = self.entries.remove(&id)?;
        self.index.remove(id, &entry.words);
        Some(entry)
    }

    /// Bulk remove by id; returns how many entries were removed
    pub fn delete_by_ids(&mut self, ids: &HashSet<u64>) -> u32 {
        let mut removed = 0;
        for id in ids {
            if let Some(entry) = self.entries.remove(id) {
                self.by_text.remove(&entry.text);
                self.index.remove(*id, &entry.words);
                removed += 1;
            }
        }
        removed
    }

    /// Remove all entries. The id counter is preserved: a later insert gets
    /// a fresh, never-before-used id.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_text.clear();
        self.index.clear();
    }

    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn entry(&self, id: u64) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.by_text.contains_key(text)
    }

    /// Read-only view of the word index for search
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// One page of entries, id-descending.
    ///
    /// Skips `page_index * page_size` entries; an offset past the end yields
    /// an empty page, never an error.
    pub fn page(&self, page_index: u32, page_size: u32) -> Vec<Entry> {
        self.entries
            .values()
            .rev()
            .skip((page_index as usize) * (page_size as usize))
            .take(page_size as usize)
            .cloned()
            .collect()
    }

    /// Full ordered dump for the export boundary
    pub fn export_all(&self, ascending: bool) -> Vec<Entry> {
        if ascending {
            self.entries.values().cloned().collect()
        } else {
            self.entries.values().rev().cloned().collect()
        }
    }

    /// Verify the store/index invariant in both directions.
    ///
    /// Asserted in tests; production callers log a violation and continue.
    pub fn check_consistency(&self) -> Result<(), StoreError> {
        for entry in self.entries.values() {
            if entry.words != tokenize(&entry.text) {
                return Err(StoreError::IndexInconsistency(format!(
                    "entry {} word set is stale",
                    entry.id
                )));
            }
            for word in &entry.words {
                let indexed = self
                    .index
                    .ids_for_word(word)
                    .is_some_and(|ids| ids.contains(&entry.id));
                if !indexed {
                    return Err(StoreError::IndexInconsistency(format!(
                        "entry {} missing from index bucket {:?}",
                        entry.id, word
                    )));
                }
            }
        }

        for id in self.index.prefix_match("") {
            if !self.entries.contains_key(&id) {
                return Err(StoreError::IndexInconsistency(format!(
                    "index references dead entry {id}"
                )));
            }
        }

        Ok(())
    }
}

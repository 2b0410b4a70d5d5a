//! Navigation state and the view-state payload returned by every command
//!
//! The original reactive UI bindings are re-architected as an explicit
//! command/response protocol: the engine mutates [`NavState`] and hands the
//! shell a [`ViewState`] snapshot to render.

use serde::Serialize;

use crate::history::Entry;

/// Selection sentinel meaning "nothing selected"
pub const NO_SELECTION: i32 = -1;

/// Cursor state for paging and selection
#[derive(Debug, Clone)]
pub struct NavState {
    /// Current history page (query empty)
    pub current_page: u32,
    /// Current search page (query non-empty)
    pub current_search_page: u32,
    /// Index into the visible list, [`NO_SELECTION`] when none
    pub selection_index: i32,
    /// Active search query; empty means the history list is shown
    pub query: String,
    /// Total live entries in the store
    pub clipboard_item_count: u32,
    /// Total matches for the active query
    pub search_item_count: u32,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            current_page: 0,
            current_search_page: 0,
            selection_index: NO_SELECTION,
            query: String::new(),
            clipboard_item_count: 0,
            search_item_count: 0,
        }
    }
}

impl NavState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the search list is the active view
    pub fn searching(&self) -> bool {
        !self.query.is_empty()
    }

    /// Page index of the active view
    pub fn active_page(&self) -> u32 {
        if self.searching() {
            self.current_search_page
        } else {
            self.current_page
        }
    }

    /// Item count of the active view
    pub fn active_count(&self) -> u32 {
        if self.searching() {
            self.search_item_count
        } else {
            self.clipboard_item_count
        }
    }

    /// Drop query, selection and both page cursors
    pub fn reset(&mut self) {
        let count = self.clipboard_item_count;
        *self = Self::default();
        self.clipboard_item_count = count;
    }
}

/// Number of pages needed for `total` items
pub fn page_count(total: u32, page_size: u32) -> u32 {
    total.div_ceil(page_size)
}

/// Move the selection forward, wrapping past the end to 0.
///
/// No-op on an empty list; from the no-selection sentinel it lands on 0.
pub fn wrap_next(selection: i32, len: usize) -> i32 {
    if len == 0 {
        return selection;
    }
    if selection < 0 || selection as usize >= len - 1 {
        0
    } else {
        selection + 1
    }
}

/// Move the selection backward, wrapping before 0 to the last index.
///
/// No-op on an empty list; from the no-selection sentinel it lands on the
/// last index.
pub fn wrap_previous(selection: i32, len: usize) -> i32 {
    if len == 0 {
        return selection;
    }
    if selection <= 0 {
        len as i32 - 1
    } else {
        selection - 1
    }
}

/// Snapshot handed to the shell after every command
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    /// Entries on the visible page
    pub items: Vec<Entry>,
    /// Page index of the active view
    pub page: u32,
    /// Selection within `items`, [`NO_SELECTION`] when none
    pub selection: i32,
    /// Active query (empty = history view)
    pub query: String,
    /// Total live history entries
    pub total_items: u32,
    /// Total matches for the active query
    pub total_matches: u32,
}

impl ViewState {
    /// Item count of the view the shell is rendering
    pub fn active_total(&self) -> u32 {
        if self.query.is_empty() {
            self.total_items
        } else {
            self.total_matches
        }
    }
}

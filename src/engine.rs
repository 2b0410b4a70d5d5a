//! Command boundary over the history store, navigation state and clipboard
//!
//! All mutations run under one lock, so the store and its index are only
//! ever observed together. Every command returns the updated [`ViewState`]
//! for the shell to render; there is no observer wiring.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::history::database::HistoryDatabase;
use crate::history::{Entry, HistoryStore};
use crate::nav::{self, NavState, ViewState, NO_SELECTION};
use crate::{search, Result, PAGE_SIZE};

struct EngineState {
    store: HistoryStore,
    nav: NavState,
    /// Last text the watcher observed or we wrote ourselves; guards against
    /// re-indexing our own clipboard writes
    last_clipboard_item: Option<String>,
}

/// Clipboard history engine
pub struct Engine {
    state: Mutex<EngineState>,
    db: HistoryDatabase,
    clipboard: Arc<dyn Clipboard>,
}

impl Engine {
    /// Open the configured database and rebuild the store from it
    pub async fn open(config: &Config, clipboard: Arc<dyn Clipboard>) -> Result<Self> {
        let db = HistoryDatabase::open(&config.database_path).await?;
        Self::with_database(db, clipboard).await
    }

    /// Build an engine over an already-open database
    pub async fn with_database(db: HistoryDatabase, clipboard: Arc<dyn Clipboard>) -> Result<Self> {
        let rows = db.load_all().await?;
        let store = HistoryStore::from_rows(rows);

        let mut nav = NavState::new();
        nav.clipboard_item_count = store.count();
        info!("loaded {} history entries", nav.clipboard_item_count);

        // The most recent persisted entry is what the clipboard last held,
        // as far as we know; seed the change detector with it
        let last_clipboard_item = store.page(0, 1).into_iter().next().map(|e| e.text);

        Ok(Self {
            state: Mutex::new(EngineState {
                store,
                nav,
                last_clipboard_item,
            }),
            db,
            clipboard,
        })
    }

    /// Record newly observed clipboard text, promoting a known entry to the
    /// top. Returns whether anything was stored.
    pub async fn capture(&self, text: &str) -> Result<bool> {
        if text.is_empty() {
            return Ok(false);
        }

        let mut state = self.state.lock().await;

        if state.last_clipboard_item.as_deref() == Some(text) {
            return Ok(false);
        }

        // Promote: a re-copied item moves to the top instead of duplicating
        if let Some(old) = state.store.delete_by_text(text) {
            debug!("promoting entry {} to top", old.id);
            self.db.delete(old.id).await?;
        }

        let id = state.store.insert(text.to_string())?;
        self.db.insert(id, text).await?;

        state.last_clipboard_item = Some(text.to_string());
        state.nav.clipboard_item_count = state.store.count();
        debug!("captured entry {id}");

        Ok(true)
    }

    /// Current view without mutating anything
    pub async fn view_state(&self) -> ViewState {
        let mut state = self.state.lock().await;
        Self::refresh_view(&mut state)
    }

    /// Jump to history page `n`
    pub async fn open_page(&self, page: u32) -> ViewState {
        let mut state = self.state.lock().await;
        state.nav.current_page = page;
        Self::refresh_view(&mut state)
    }

    /// Advance the active view one page, bounded by its page count
    pub async fn next_page(&self) -> ViewState {
        let mut state = self.state.lock().await;
        let pages = nav::page_count(state.nav.active_count(), PAGE_SIZE);

        if state.nav.searching() {
            if state.nav.current_search_page + 1 < pages {
                state.nav.current_search_page += 1;
            }
        } else if state.nav.current_page + 1 < pages {
            state.nav.current_page += 1;
        }

        Self::clamp_selection(&mut state);
        Self::refresh_view(&mut state)
    }

    /// Step the active view back one page, saturating at page 0
    pub async fn prev_page(&self) -> ViewState {
        let mut state = self.state.lock().await;

        if state.nav.searching() {
            state.nav.current_search_page = state.nav.current_search_page.saturating_sub(1);
        } else {
            state.nav.current_page = state.nav.current_page.saturating_sub(1);
        }

        Self::refresh_view(&mut state)
    }

    /// Change the active query; empty returns to the history view
    pub async fn set_query(&self, query: &str) -> ViewState {
        let mut state = self.state.lock().await;
        state.nav.selection_index = NO_SELECTION;
        state.nav.current_search_page = 0;
        state.nav.query = query.to_string();
        if query.is_empty() {
            state.nav.search_item_count = 0;
        }
        Self::refresh_view(&mut state)
    }

    /// Move the selection down, wrapping past the end
    pub async fn select_next(&self) -> ViewState {
        let mut state = self.state.lock().await;
        let len = Self::visible(&state).len();
        state.nav.selection_index = nav::wrap_next(state.nav.selection_index, len);
        Self::refresh_view(&mut state)
    }

    /// Move the selection up, wrapping before the start
    pub async fn select_previous(&self) -> ViewState {
        let mut state = self.state.lock().await;
        let len = Self::visible(&state).len();
        state.nav.selection_index = nav::wrap_previous(state.nav.selection_index, len);
        Self::refresh_view(&mut state)
    }

    /// Delete the selected entry and reload the active view from page 0
    pub async fn delete_selected(&self) -> Result<ViewState> {
        let mut state = self.state.lock().await;

        if let Some(entry) = Self::selected_entry(&state) {
            let text = entry.text;
            if let Some(removed) = state.store.delete_by_text(&text) {
                self.db.delete(removed.id).await?;
                info!("deleted entry {}", removed.id);
            }

            state.nav.selection_index = NO_SELECTION;
            state.nav.current_page = 0;
            state.nav.current_search_page = 0;
            state.nav.clipboard_item_count = state.store.count();
        }

        Ok(Self::refresh_view(&mut state))
    }

    /// Copy the selected entry back to the system clipboard.
    ///
    /// The entry is removed from the store; the watcher re-observes the
    /// written text on its next tick and reinserts it at the top.
    pub async fn copy_selected(&self) -> Result<ViewState> {
        let mut state = self.state.lock().await;

        if let Some(entry) = Self::selected_entry(&state) {
            let text = entry.text;

            // Write before removing anything: if the clipboard rejects the
            // write the entry must stay in the history untouched
            self.clipboard.write_text(&text).await?;

            if let Some(removed) = state.store.delete_by_text(&text) {
                self.db.delete(removed.id).await?;
            }
            info!("copied entry back to clipboard");

            // Forget the last seen item so the next poll re-inserts this one
            state.last_clipboard_item = None;
            state.nav.reset();
            state.nav.clipboard_item_count = state.store.count();
        }

        Ok(Self::refresh_view(&mut state))
    }

    /// Delete every entry whose id is in `ids`
    pub async fn delete_by_ids(&self, ids: &HashSet<u64>) -> Result<u32> {
        let mut state = self.state.lock().await;
        let removed = state.store.delete_by_ids(ids);
        self.db.delete_many(ids).await?;
        state.nav.clipboard_item_count = state.store.count();
        Ok(removed)
    }

    /// Drop all history; ids stay monotonic for any held reference
    pub async fn clear_all(&self) -> Result<ViewState> {
        let mut state = self.state.lock().await;

        state.store.clear();
        self.db.clear().await?;
        state.last_clipboard_item = None;
        state.nav = NavState::new();
        info!("cleared clipboard history");

        Ok(Self::refresh_view(&mut state))
    }

    /// Run a one-off search, leaving navigation state untouched
    pub async fn search(&self, query: &str, page: u32) -> (Vec<Entry>, u32) {
        let state = self.state.lock().await;
        search::search(&state.store, query, page, PAGE_SIZE)
    }

    /// Ordered full dump for the export boundary
    pub async fn export_all(&self, ascending: bool) -> Vec<Entry> {
        let state = self.state.lock().await;
        state.store.export_all(ascending)
    }

    pub async fn count(&self) -> u32 {
        let state = self.state.lock().await;
        state.store.count()
    }

    fn visible(state: &EngineState) -> Vec<Entry> {
        if state.nav.searching() {
            let (items, _) = search::search(
                &state.store,
                &state.nav.query,
                state.nav.current_search_page,
                PAGE_SIZE,
            );
            items
        } else {
            state.store.page(state.nav.current_page, PAGE_SIZE)
        }
    }

    fn selected_entry(state: &EngineState) -> Option<Entry> {
        if state.nav.selection_index < 0 {
            return None;
        }
        Self::visible(state)
            .into_iter()
            .nth(state.nav.selection_index as usize)
    }

    fn clamp_selection(state: &mut EngineState) {
        if state.nav.selection_index < 0 {
            return;
        }
        let len = Self::visible(state).len();
        if len == 0 {
            state.nav.selection_index = NO_SELECTION;
        } else if state.nav.selection_index as usize >= len {
            state.nav.selection_index = len as i32 - 1;
        }
    }

    fn refresh_view(state: &mut EngineState) -> ViewState {
        state.nav.clipboard_item_count = state.store.count();

        let items = if state.nav.searching() {
            let (items, total) = search::search(
                &state.store,
                &state.nav.query,
                state.nav.current_search_page,
                PAGE_SIZE,
            );
            state.nav.search_item_count = total;
            items
        } else {
            state.store.page(state.nav.current_page, PAGE_SIZE)
        };

        ViewState {
            items,
            page: state.nav.active_page(),
            selection: state.nav.selection_index,
            query: state.nav.query.clone(),
            total_items: state.nav.clipboard_item_count,
            total_matches: state.nav.search_item_count,
        }
    }
}

//! Interactive terminal picker over the engine's view states
//!
//! Type to search (debounced so rapid keystrokes coalesce into one query),
//! arrows to move the selection and switch pages, Enter to copy the selected
//! entry back to the clipboard, Delete (or Ctrl-Backspace) to remove it.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::engine::Engine;
use crate::nav::ViewState;

const POLL_TICK: Duration = Duration::from_millis(50);

pub struct Picker {
    engine: Arc<Engine>,
    debounce: Duration,
    /// Query as typed; pushed to the engine once the debounce window closes
    pending_query: String,
    query_changed_at: Option<Instant>,
}

enum PickerAction {
    Continue,
    Redraw,
    Exit,
}

impl Picker {
    pub fn new(engine: Arc<Engine>, debounce: Duration) -> Self {
        Self {
            engine,
            debounce,
            pending_query: String::new(),
            query_changed_at: None,
        }
    }

    pub async fn show(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        let result = self.run().await;

        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;

        result
    }

    async fn run(&mut self) -> Result<()> {
        let mut view = self.engine.view_state().await;
        self.draw(&view)?;

        loop {
            if event::poll(POLL_TICK)? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key(key_event).await? {
                        PickerAction::Exit => break,
                        PickerAction::Redraw => {
                            view = self.engine.view_state().await;
                            self.draw(&view)?;
                        }
                        PickerAction::Continue => {}
                    }
                }
            }

            // Debounce window closed: run the coalesced query
            if let Some(changed_at) = self.query_changed_at {
                if changed_at.elapsed() >= self.debounce {
                    self.query_changed_at = None;
                    view = self.engine.set_query(&self.pending_query).await;
                    self.draw(&view)?;
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key_event: KeyEvent) -> Result<PickerAction> {
        match key_event.code {
            KeyCode::Esc => Ok(PickerAction::Exit),
            KeyCode::Enter => {
                self.engine.copy_selected().await?;
                Ok(PickerAction::Exit)
            }
            KeyCode::Down => {
                self.engine.select_next().await;
                Ok(PickerAction::Redraw)
            }
            KeyCode::Up => {
                self.engine.select_previous().await;
                Ok(PickerAction::Redraw)
            }
            KeyCode::Right => {
                self.engine.next_page().await;
                Ok(PickerAction::Redraw)
            }
            KeyCode::Left => {
                self.engine.prev_page().await;
                Ok(PickerAction::Redraw)
            }
            // Ctrl-Backspace is an alias for Delete; match it before the
            // plain Backspace arm below
            KeyCode::Delete => {
                self.engine.delete_selected().await?;
                Ok(PickerAction::Redraw)
            }
            KeyCode::Backspace if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.engine.delete_selected().await?;
                Ok(PickerAction::Redraw)
            }
            KeyCode::Char(c) => {
                self.pending_query.push(c);
                self.query_changed_at = Some(Instant::now());
                Ok(PickerAction::Continue)
            }
            KeyCode::Backspace => {
                self.pending_query.pop();
                self.query_changed_at = Some(Instant::now());
                Ok(PickerAction::Continue)
            }
            _ => Ok(PickerAction::Continue),
        }
    }

    fn draw(&self, view: &ViewState) -> Result<()> {
        print!("\x1B[2J\x1B[H"); // Clear screen and move cursor to top

        println!("Clipdex\r");
        println!("Use arrows to navigate, Enter to copy, Delete to remove, Esc to exit\r");

        if !self.pending_query.is_empty() {
            println!("Search: {}\r", self.pending_query);
        }

        let total = view.active_total();
        let pages = crate::nav::page_count(total, crate::PAGE_SIZE).max(1);
        println!(
            "Page {}/{} ({} item{})\r",
            view.page + 1,
            pages,
            total,
            if total == 1 { "" } else { "s" }
        );
        println!("\r");

        for (i, entry) in view.items.iter().enumerate() {
            let prefix = if i as i32 == view.selection {
                "> "
            } else {
                "  "
            };
            println!("{}{}\r", prefix, super::preview(&entry.text));
        }

        if view.items.is_empty() {
            println!("  (no entries)\r");
        }

        io::stdout().flush()?;
        Ok(())
    }
}

impl Drop for Picker {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

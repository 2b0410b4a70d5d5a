//! Clipboard polling loop
//!
//! No change notification exists on every target platform, so the watcher
//! polls on a fixed interval and hands genuine changes to the engine. The
//! loop never exits on its own: read failures are "nothing observed this
//! tick" and store errors are logged and skipped.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, warn};

use crate::clipboard::Clipboard;
use crate::engine::Engine;

/// Fixed-interval clipboard poller
pub struct ClipboardWatcher {
    engine: Arc<Engine>,
    clipboard: Arc<dyn Clipboard>,
    poll_interval: Duration,
}

impl ClipboardWatcher {
    pub fn new(engine: Arc<Engine>, clipboard: Arc<dyn Clipboard>, poll_interval: Duration) -> Self {
        Self {
            engine,
            clipboard,
            poll_interval,
        }
    }

    /// Poll until the task is dropped
    pub async fn run(&self) {
        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// One poll: read the clipboard and feed any new text to the engine
    pub async fn tick(&self) {
        let text = match self.clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("clipboard read failed, skipping tick: {e}");
                return;
            }
        };

        match self.engine.capture(&text).await {
            Ok(true) => debug!("stored new clipboard text ({} bytes)", text.len()),
            Ok(false) => {}
            Err(e) => warn!("failed to store clipboard text: {e}"),
        }
    }
}

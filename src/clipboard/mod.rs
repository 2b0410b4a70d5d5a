//! System clipboard abstraction
//!
//! The core only ever needs two operations: read the current text and write
//! text back. Both are bounded, fast, non-retrying calls; the watcher treats
//! any failure as "nothing observed this tick".

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Platform-specific error
    #[error("Platform error: {0}")]
    Platform(String),

    /// Clipboard backend could not be initialized
    #[error("Failed to initialize clipboard: {0}")]
    Init(String),
}

/// Text clipboard primitive
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Current clipboard text; empty string when the clipboard holds
    /// nothing, or holds non-text content
    async fn read_text(&self) -> Result<String, ClipboardError>;

    /// Replace the clipboard contents with `text`
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// arboard-backed system clipboard
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new().map_err(|e| ClipboardError::Init(e.to_string()))?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| ClipboardError::Platform("clipboard mutex poisoned".into()))?;

        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Non-text or empty clipboard is "no content", not an error
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Platform(e.to_string())),
        }
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| ClipboardError::Platform("clipboard mutex poisoned".into()))?;

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Platform(e.to_string()))
    }
}

/// In-process clipboard for tests and headless use
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Mutex<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored text from outside, as if another app copied
    pub fn set(&self, text: &str) {
        if let Ok(mut guard) = self.text.lock() {
            *guard = text.to_string();
        }
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn read_text(&self) -> Result<String, ClipboardError> {
        self.text
            .lock()
            .map(|t| t.clone())
            .map_err(|_| ClipboardError::Platform("clipboard mutex poisoned".into()))
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.set(text);
        Ok(())
    }
}

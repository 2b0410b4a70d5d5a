//! Command-line interface for Clipdex

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
use crate::config::Config;
use crate::engine::Engine;
use crate::watcher::ClipboardWatcher;

pub mod picker;

#[derive(Parser)]
#[command(name = "clipdex")]
#[command(about = "Deduplicating, searchable clipboard history manager")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Watch the clipboard and record history")]
    Watch,

    #[command(about = "Open the interactive history picker")]
    Pick,

    #[command(about = "Print a page of clipboard history")]
    List {
        #[arg(short, long, default_value = "0")]
        page: u32,
    },

    #[command(about = "Search history by word prefixes")]
    Search {
        query: String,

        #[arg(short, long, default_value = "0")]
        page: u32,
    },

    #[command(about = "Export the full history")]
    Export {
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    #[command(about = "Clear all clipboard history")]
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// JSON array of {id, text} objects
    Json,
    /// Newline-joined plain text
    Txt,
}

/// Dispatches parsed commands against an engine
pub struct CliHandler {
    config: Config,
}

impl CliHandler {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from_path(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => Config::load()?,
        };
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Watch => self.watch().await,
            Commands::Pick => self.pick().await,
            Commands::List { page } => self.list(page).await,
            Commands::Search { query, page } => self.search(&query, page).await,
            Commands::Export { format, output } => self.export(format, output).await,
            Commands::Clear => self.clear().await,
        }
    }

    /// Engine talking to the real system clipboard
    async fn system_engine(&self) -> Result<Arc<Engine>> {
        let clipboard: Arc<dyn Clipboard> = Arc::new(SystemClipboard::new()?);
        Ok(Arc::new(Engine::open(&self.config, clipboard).await?))
    }

    /// Engine without the system clipboard; list/search/export/clear don't
    /// write to it and must work without a display connection
    async fn local_engine(&self) -> Result<Arc<Engine>> {
        let clipboard: Arc<dyn Clipboard> = Arc::new(MemoryClipboard::new());
        Ok(Arc::new(Engine::open(&self.config, clipboard).await?))
    }

    async fn watch(&self) -> Result<()> {
        let clipboard: Arc<dyn Clipboard> = Arc::new(SystemClipboard::new()?);
        let engine = Arc::new(Engine::open(&self.config, clipboard.clone()).await?);

        let watcher = ClipboardWatcher::new(
            engine,
            clipboard,
            Duration::from_millis(self.config.poll_interval_ms),
        );

        info!(
            "watching clipboard every {} ms (ctrl-c to stop)",
            self.config.poll_interval_ms
        );

        tokio::select! {
            _ = watcher.run() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
            }
        }

        Ok(())
    }

    async fn pick(&self) -> Result<()> {
        let engine = self.system_engine().await?;
        let debounce = Duration::from_millis(self.config.search_debounce_ms);
        picker::Picker::new(engine, debounce).show().await
    }

    async fn list(&self, page: u32) -> Result<()> {
        let engine = self.local_engine().await?;
        let view = engine.open_page(page).await;

        if view.items.is_empty() {
            println!("No entries on page {page}");
            return Ok(());
        }

        println!(
            "Clipboard history, page {} ({} entries total)",
            page, view.total_items
        );
        for entry in &view.items {
            println!("{:>6}  {}", entry.id, preview(&entry.text));
        }

        Ok(())
    }

    async fn search(&self, query: &str, page: u32) -> Result<()> {
        let engine = self.local_engine().await?;
        let (entries, total) = engine.search(query, page).await;

        println!("{total} match(es) for {query:?}");
        for entry in &entries {
            println!("{:>6}  {}", entry.id, preview(&entry.text));
        }

        Ok(())
    }

    async fn export(&self, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
        let engine = self.local_engine().await?;
        let entries = engine.export_all(true).await;

        let serialized = match format {
            ExportFormat::Json => serde_json::to_string_pretty(&entries)?,
            ExportFormat::Txt => entries
                .iter()
                .map(|e| e.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        };

        match output {
            Some(path) => {
                std::fs::write(&path, serialized)
                    .with_context(|| format!("couldn't export history to {}", path.display()))?;
                println!("Exported {} entries to {}", entries.len(), path.display());
            }
            None => println!("{serialized}"),
        }

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let engine = self.local_engine().await?;
        engine.clear_all().await?;
        println!("Clipboard history cleared");
        Ok(())
    }
}

/// Single-line preview of stored text for terminal output
fn preview(text: &str) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() > 80 {
        let truncated: String = flat.chars().take(80).collect();
        format!("{truncated}...")
    } else {
        flat
    }
}

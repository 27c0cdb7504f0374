//! Source file watcher.
//!
//! Watches the directories holding a source's files and rebuilds the
//! shared registry when a YAML/JSON file in them changes. A reload that
//! fails leaves the previous registry in service.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use tokio::sync::mpsc;

use super::{ContentSource, SourceFormat};
use crate::registry::{RegistryStats, SharedRegistry};

/// Default quiet period before a burst of file events triggers a reload
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Outcome of one reload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    Reloaded { stats: RegistryStats },
    Failed { error: String },
}

/// Rebuilds a [`SharedRegistry`] whenever its source files change
#[derive(Debug, Clone)]
pub struct SourceWatcher {
    source: ContentSource,
    shared: SharedRegistry,
    debounce: Duration,
}

impl SourceWatcher {
    pub fn new(source: ContentSource, shared: SharedRegistry) -> Self {
        Self {
            source,
            shared,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Directories to watch: each pattern's directory, or the parent of each
    /// file it currently matches
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = BTreeSet::new();

        for pattern in self.source.patterns() {
            let path = Path::new(pattern);
            if path.is_dir() {
                dirs.insert(path.to_path_buf());
            }
        }

        if let Ok(files) = self.source.resolve() {
            for file in files {
                if let Some(parent) = file.parent() {
                    dirs.insert(parent.to_path_buf());
                }
            }
        }

        dirs.into_iter().collect()
    }

    /// Whether a changed path should trigger a reload
    pub fn is_relevant(path: &Path) -> bool {
        SourceFormat::from_path(path).is_some()
    }

    /// Rebuild once and report the outcome
    pub async fn reload_once(&self) -> ReloadEvent {
        match self.shared.reload(&self.source).await {
            Ok(registry) => ReloadEvent::Reloaded {
                stats: registry.stats(),
            },
            Err(e) => ReloadEvent::Failed {
                error: e.to_string(),
            },
        }
    }

    /// Start watching; reload outcomes arrive on the returned channel
    pub async fn watch(self) -> Result<(mpsc::Receiver<ReloadEvent>, WatchHandle)> {
        let dirs = self.watch_dirs();
        if dirs.is_empty() {
            anyhow::bail!(
                "Nothing to watch for sources: {}",
                self.source.patterns().join(", ")
            );
        }

        let (fs_tx, fs_rx) = mpsc::unbounded_channel::<DebounceEventResult>();
        let mut debouncer = new_debouncer(self.debounce, move |result: DebounceEventResult| {
            let _ = fs_tx.send(result);
        })
        .context("Failed to create file watcher")?;

        for dir in &dirs {
            debouncer
                .watcher()
                .watch(dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
            tracing::info!("Watching {} for content changes", dir.display());
        }

        let (event_tx, event_rx) = mpsc::channel::<ReloadEvent>(16);
        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            // Dropping the debouncer stops the notify thread
            let _debouncer = debouncer;
            run_watcher(self, fs_rx, event_tx, stop_rx).await;
        });

        Ok((event_rx, WatchHandle { stop_tx, task }))
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await?;
        Ok(())
    }
}

async fn run_watcher(
    watcher: SourceWatcher,
    mut fs_rx: mpsc::UnboundedReceiver<DebounceEventResult>,
    event_tx: mpsc::Sender<ReloadEvent>,
    mut stop_rx: mpsc::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = stop_rx.recv() => {
                tracing::info!("Watcher stopping...");
                break;
            }
            result = fs_rx.recv() => {
                let Some(result) = result else {
                    tracing::error!("Watcher channel disconnected");
                    break;
                };

                match result {
                    Ok(events) => {
                        let changed = events.iter().any(|e| SourceWatcher::is_relevant(&e.path));
                        if !changed {
                            continue;
                        }

                        let outcome = watcher.reload_once().await;
                        if event_tx.send(outcome).await.is_err() {
                            tracing::debug!("Reload receiver dropped");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Watcher error: {:?}", e);
                    }
                }
            }
        }
    }
}

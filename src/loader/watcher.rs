//! Options file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::loader::{load_with, LoadContext, LoadResult};

/// Reloads an options file whenever it changes.
pub struct OptionsWatcher {
    path: PathBuf,
    ctx: LoadContext,
    update_tx: mpsc::UnboundedSender<LoadResult>,
}

impl OptionsWatcher {
    /// Create a new OptionsWatcher.
    ///
    /// Returns the watcher and a receiver for reloaded configurations.
    pub fn new(path: &Path, ctx: LoadContext) -> (Self, mpsc::UnboundedReceiver<LoadResult>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                ctx,
                update_tx,
            },
            update_rx,
        )
    }

    /// Load once now, then on every change.
    ///
    /// The initial result is sent too, so subscribers start from a known
    /// configuration. Failed reloads are logged and the last good one stands.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        match load_with(&self.path, &self.ctx) {
            Ok(initial) => {
                let _ = self.update_tx.send(initial);
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Initial options load failed");
            }
        }

        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let ctx = self.ctx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Options file change detected, reloading...");
                        match load_with(&path, &ctx) {
                            Ok(reloaded) => {
                                let _ = tx.send(reloaded);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload options: {}. Keeping current options.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Options watcher started");
        Ok(watcher)
    }
}

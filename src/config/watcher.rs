//! Configuration file watcher.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::capability::Capabilities;
use crate::config::loader::load_config;
use crate::config::tree::ConfigurationTree;

/// Monitors a configuration file and re-validates it on every change.
///
/// Only configurations that pass validation are delivered; failures are
/// logged and the receiver keeps the last good tree.
pub struct ConfigWatcher {
    path: PathBuf,
    capabilities: Capabilities,
    update_tx: mpsc::Sender<ConfigurationTree>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configurations.
    pub fn new(path: &Path, capabilities: Capabilities) -> (Self, mpsc::Receiver<ConfigurationTree>) {
        let (update_tx, update_rx) = mpsc::channel();

        (
            Self {
                path: path.to_path_buf(),
                capabilities,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, capabilities, update_tx } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                match res {
                    Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                        revalidate(&watched, &capabilities, &update_tx);
                    }
                    Ok(_) => {}
                    Err(error) => tracing::warn!(%error, "Watch backend reported an error"),
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Watching configuration");
        Ok(watcher)
    }
}

/// Reload `path` and forward the tree if it validates. Returns whether a
/// tree reached the receiver.
fn revalidate(path: &Path, capabilities: &Capabilities, tx: &mpsc::Sender<ConfigurationTree>) -> bool {
    let tree = match load_config(path, capabilities) {
        Ok(tree) => tree,
        Err(error) => {
            tracing::error!(path = %path.display(), %error, "Configuration rejected, keeping last good tree");
            return false;
        }
    };
    if tx.send(tree).is_err() {
        tracing::warn!(path = %path.display(), "Configuration receiver dropped, update discarded");
        return false;
    }
    tracing::info!(path = %path.display(), "Configuration reloaded");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const VALID: &str = r#"
        [adapter]
        type = "jsonapiorg"

        [persisters]

        [search_clients]
    "#;

    #[test]
    fn test_revalidate_delivers_valid_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modlr.toml");
        fs::write(&path, VALID).unwrap();

        let (tx, rx) = mpsc::channel();
        assert!(revalidate(&path, &Capabilities::all(), &tx));
        assert_eq!(rx.try_recv().unwrap().rest.root_endpoint, "modlr/api");
    }

    #[test]
    fn test_revalidate_keeps_last_tree_on_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modlr.toml");
        fs::write(&path, "[adapter]\n").unwrap();

        let (tx, rx) = mpsc::channel();
        assert!(!revalidate(&path, &Capabilities::all(), &tx));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_revalidate_survives_dropped_receiver() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modlr.toml");
        fs::write(&path, VALID).unwrap();

        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(!revalidate(&path, &Capabilities::all(), &tx));
    }
}

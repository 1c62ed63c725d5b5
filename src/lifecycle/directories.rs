//! Directory creation pass.
//!
//! Loaders only record the directories they derive. This pass runs once
//! after assembly and creates whatever is missing.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::registry::ServiceRegistry;

#[derive(Debug, Error)]
#[error("failed to create directory {path} ({key}): {source}")]
pub struct DirectoryError {
    pub key: String,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Create every recorded directory that does not exist yet, parents
/// included. Existing directories are skipped. Returns how many were created.
pub fn create_directories(registry: &ServiceRegistry) -> Result<usize, DirectoryError> {
    let mut created = 0;
    for (key, path) in registry.directories() {
        if path.is_dir() {
            tracing::debug!(key, path = %path.display(), "Directory exists");
            continue;
        }
        fs::create_dir_all(path).map_err(|source| DirectoryError {
            key: key.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(key, path = %path.display(), "Directory created");
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_and_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let mut registry = ServiceRegistry::new();
        registry.add_directory("metadata_cache_dir", root.path().join("cache/modlr"));
        registry.add_directory("models", root.path().join("models"));

        assert_eq!(create_directories(&registry).unwrap(), 2);
        assert!(root.path().join("cache/modlr").is_dir());
        assert_eq!(create_directories(&registry).unwrap(), 0);
    }

    #[test]
    fn test_file_in_the_way_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        fs::write(&blocker, b"").unwrap();

        let mut registry = ServiceRegistry::new();
        registry.add_directory("models", blocker.join("models"));

        let err = create_directories(&registry).unwrap_err();
        assert_eq!(err.key, "models");
    }
}

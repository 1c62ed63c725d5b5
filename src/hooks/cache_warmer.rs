//! Cache-warming hook.

use std::path::Path;

/// The library's metadata cache warmer, as seen by this crate.
pub trait CacheWarmer {
    type Error;

    /// Load every model definition into the metadata cache.
    fn warm(&self) -> Result<(), Self::Error>;
}

/// Adapter the host's cache-warming driver calls during cache warm-up.
///
/// Registered as `modlr.bundle.cache.warmer` with the `kernel.cache_warmer` tag.
#[derive(Debug, Clone)]
pub struct MetadataWarmer<W> {
    warmer: W,
}

impl<W: CacheWarmer> MetadataWarmer<W> {
    pub fn new(warmer: W) -> Self {
        Self { warmer }
    }

    /// The metadata cache lives wherever its own configuration says, so the
    /// host cache directory is ignored.
    pub fn warm_up(&self, cache_dir: &Path) -> Result<(), W::Error> {
        tracing::debug!(cache_dir = %cache_dir.display(), "Warming metadata cache");
        self.warmer.warm()
    }

    /// Never optional: models must be loadable before the first request.
    pub fn is_optional(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingWarmer {
        calls: Cell<usize>,
    }

    impl CacheWarmer for CountingWarmer {
        type Error = String;

        fn warm(&self) -> Result<(), String> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    struct FailingWarmer;

    impl CacheWarmer for FailingWarmer {
        type Error = String;

        fn warm(&self) -> Result<(), String> {
            Err("model definitions unreadable".to_string())
        }
    }

    #[test]
    fn test_warm_up_delegates() {
        let hook = MetadataWarmer::new(CountingWarmer::default());
        hook.warm_up(Path::new("/var/cache")).unwrap();
        hook.warm_up(Path::new("/var/cache")).unwrap();
        assert_eq!(hook.warmer.calls.get(), 2);
        assert!(!hook.is_optional());
    }

    #[test]
    fn test_warm_up_propagates_errors() {
        let hook = MetadataWarmer::new(FailingWarmer);
        assert_eq!(
            hook.warm_up(Path::new("/var/cache")).unwrap_err(),
            "model definitions unreadable"
        );
    }
}

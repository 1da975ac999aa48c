use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{LruStorageCache, StorageCache, DEFAULT_CACHE_CAPACITY};
use crate::error::{ConfigError, UploadError};
use crate::policy::UploadPolicy;
use crate::staging;
use crate::Uploader;

/// Staging directory used when none is configured.
pub const DEFAULT_STAGING_DIR: &str = "./tmp";

/// Fluent builder for [`Uploader`].
#[derive(Debug, Default)]
pub struct UploaderBuilder {
    staging_dir: Option<PathBuf>,
    policy: Option<UploadPolicy>,
    cache: Option<Arc<dyn StorageCache>>,
    cache_capacity: Option<usize>,
}

impl UploaderBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the staging directory (default [`DEFAULT_STAGING_DIR`]).
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Sets the acceptance policy (default: every upload is rejected).
    pub fn policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Substitutes a caller-supplied storage cache for the built-in LRU one.
    pub fn cache(mut self, cache: Arc<dyn StorageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Overrides the built-in cache's entry capacity (default
    /// [`DEFAULT_CACHE_CAPACITY`]). Must be non-zero; only applies when no
    /// custom cache is supplied.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Validates the configuration and builds the uploader.
    ///
    /// The configured staging directory is emptied eagerly; files left there
    /// by a previous process are discarded.
    pub fn build(self) -> Result<Uploader, UploadError> {
        let capacity = self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
        let capacity = NonZeroUsize::new(capacity).ok_or(ConfigError::InvalidCacheCapacity)?;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(LruStorageCache::new(capacity)));

        let staging_dir = self
            .staging_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR));
        staging::empty_dir_sync(&staging_dir)?;

        Ok(Uploader::from_parts(
            staging_dir,
            self.policy.unwrap_or_default(),
            cache,
        ))
    }
}

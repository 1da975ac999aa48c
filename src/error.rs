use thiserror::Error;

/// Error type used by `filestage` staging and lookup operations.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload declared a content type with no configured policy entry.
    #[error("unsupported media type {content_type:?}; allowed extensions: {allowed:?}")]
    UnsupportedMediaType {
        /// Declared content type of the rejected upload.
        content_type: String,
        /// Extensions accepted by the active policy, sorted.
        allowed: Vec<String>,
    },
    /// The declared request size exceeds the configured per-type maximum.
    #[error("request size exceeds the {max_size_str} ({max_size} bytes) limit")]
    EntityTooLarge {
        /// Configured maximum in bytes.
        max_size: u64,
        /// Configured maximum as originally written, e.g. `"5mb"`.
        max_size_str: String,
    },
    /// A cache entry exists but its backing file is unreachable on the
    /// filesystem. The entry has already been evicted when this is raised.
    #[error("file {filename:?} exists in the storage cache but is unreachable on the filesystem")]
    Integrity {
        /// The filename the caller asked for.
        filename: String,
    },
    /// Filesystem failure while staging, reading, moving, or deleting.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Invalid configuration rejected at build time.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration error raised eagerly at construction, never at request time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A policy maximum-size string could not be parsed.
    #[error("invalid max size {value:?} for extension {extension:?}")]
    InvalidMaxSize {
        /// Extension key the malformed value was configured under.
        extension: String,
        /// The value as supplied.
        value: String,
    },
    /// The storage cache capacity must be at least one entry.
    #[error("storage cache capacity must be non-zero")]
    InvalidCacheCapacity,
}

#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Upload staging middleware with an LRU-indexed storage cache.
//!
//! `filestage` takes incoming files already parsed out of an HTTP request by
//! the surrounding framework, validates them against a per-type size policy,
//! persists them to a staging directory under a generated filename, and
//! indexes them in a bounded least-recently-used cache so later code —
//! possibly handling a different request — can look them up, read them, move
//! them, or delete them by name.
//!
//! Lookups reconcile cache state against the filesystem: a cached entry whose
//! backing file has gone missing is evicted and reported as an
//! [`UploadError::Integrity`] error instead of being handed out as a dangling
//! record. LRU eviction, by contrast, only drops the cache entry and leaves
//! the staged file on disk.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Fluent builder API.
pub mod builder;
/// Human-readable byte-size parsing and formatting.
pub mod bytesize;
/// Storage cache contract and default LRU implementation.
pub mod cache;
/// Error types exposed by this crate.
pub mod error;
/// Upload acceptance policy.
pub mod policy;
/// Staged file record model.
pub mod record;
/// Capability object over a staged record.
pub mod staged;
mod staging;

#[cfg(feature = "axum")]
pub mod axum;

pub use builder::{UploaderBuilder, DEFAULT_STAGING_DIR};
pub use cache::{LruStorageCache, StorageCache, DEFAULT_CACHE_CAPACITY};
pub use error::{ConfigError, UploadError};
pub use policy::UploadPolicy;
pub use record::FileRecord;
pub use staged::{MoveOptions, StagedFile};

/// An incoming file handed over by the surrounding HTTP framework.
///
/// Multipart parsing happens upstream; this descriptor carries only what the
/// pipeline needs plus the raw byte stream.
#[derive(Debug)]
pub struct IncomingFile<S> {
    /// Client-supplied filename, informational only.
    pub original_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Chunked file contents.
    pub stream: S,
}

/// Main `filestage` entry point: stages uploads and resolves later lookups.
///
/// A single instance is shared for the lifetime of the process. All methods
/// take `&self` and are safe under concurrent in-flight requests; concurrent
/// stages never collide because every upload gets a distinct generated name.
#[derive(Debug)]
pub struct Uploader {
    staging_dir: RwLock<PathBuf>,
    policy: UploadPolicy,
    cache: Arc<dyn StorageCache>,
}

impl Uploader {
    /// Creates a fluent builder with default configuration.
    pub fn builder() -> UploaderBuilder {
        UploaderBuilder::new()
    }

    pub(crate) fn from_parts(
        staging_dir: PathBuf,
        policy: UploadPolicy,
        cache: Arc<dyn StorageCache>,
    ) -> Self {
        Self {
            staging_dir: RwLock::new(staging_dir),
            policy,
            cache,
        }
    }

    /// Returns the active acceptance policy.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Returns a shared handle to the storage cache.
    pub fn cache(&self) -> Arc<dyn StorageCache> {
        Arc::clone(&self.cache)
    }

    /// Returns the current staging directory.
    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switches the process-wide staging directory, emptying the new one
    /// before it takes effect.
    ///
    /// Cache entries pointing into the previous directory are not reconciled;
    /// when the directories overlap, files backing cached entries are
    /// discarded and later lookups for them fail with integrity errors.
    /// Stages already in flight keep writing to the directory they started
    /// with.
    pub async fn set_staging_dir(&self, dir: impl Into<PathBuf>) -> Result<(), UploadError> {
        let dir = dir.into();
        staging::empty_dir(&dir).await?;
        debug!(dir = %dir.display(), "staging directory changed");
        *self
            .staging_dir
            .write()
            .unwrap_or_else(PoisonError::into_inner) = dir;
        Ok(())
    }

    /// Validates, persists, and indexes one incoming upload, returning the
    /// capability object for it.
    ///
    /// `declared_request_size` is the request Content-Length value, zero when
    /// the header is absent. On policy rejection or staging I/O failure the
    /// error surfaces and no cache entry is created.
    pub async fn stage<S>(
        &self,
        declared_request_size: u64,
        file: IncomingFile<S>,
    ) -> Result<StagedFile, UploadError>
    where
        S: Stream<Item = Result<Bytes, UploadError>> + Unpin,
    {
        let extension = self.policy.check(&file.content_type, declared_request_size)?;
        let generated_name =
            staging::generate_filename(&file.original_name, &file.content_type, &extension);

        let dir = self.staging_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(&generated_name);

        let size = match write_stream(&path, file.stream).await {
            Ok(size) => size,
            Err(err) => {
                let _ = tokio::fs::remove_file(&path).await;
                return Err(err);
            }
        };

        let record = FileRecord {
            generated_name: generated_name.clone(),
            original_name: file.original_name,
            content_type: file.content_type,
            extension,
            size,
            size_str: bytesize::format_size(size),
            path,
        };
        self.cache.set(&generated_name, record.clone());
        debug!(name = %generated_name, size, "upload staged");

        Ok(StagedFile::new(record, Arc::clone(&self.cache)))
    }

    /// Buffered convenience over [`stage`](Self::stage); the buffer length
    /// doubles as the declared request size.
    pub async fn stage_bytes(
        &self,
        original_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Bytes,
    ) -> Result<StagedFile, UploadError> {
        let declared_size = bytes.len() as u64;
        self.stage(
            declared_size,
            IncomingFile {
                original_name: original_name.into(),
                content_type: content_type.into(),
                stream: stream::iter([Ok(bytes)]),
            },
        )
        .await
    }

    /// Looks up a previously staged file by its generated filename or by any
    /// path ending in it.
    ///
    /// A cache miss is a plain `Ok(None)`. A hit whose backing file is gone
    /// or unreachable evicts the entry and fails with
    /// [`UploadError::Integrity`]; the next lookup for the same name reports
    /// `Ok(None)`.
    pub async fn lookup(&self, filename: &str) -> Result<Option<StagedFile>, UploadError> {
        let key = staging::base_name(filename);
        let Some(record) = self.cache.get(key) else {
            return Ok(None);
        };

        // An existence probe that errors (permissions, a parent replaced by a
        // file) counts as unreachable, same as a missing file.
        let reachable = tokio::fs::try_exists(&record.path).await.unwrap_or(false);
        if !reachable {
            self.cache.del(&record.generated_name);
            warn!(
                name = %record.generated_name,
                "cached file unreachable on the filesystem; entry evicted"
            );
            return Err(UploadError::Integrity {
                filename: filename.to_owned(),
            });
        }

        Ok(Some(StagedFile::new(record, Arc::clone(&self.cache))))
    }
}

async fn write_stream<S>(path: &Path, mut stream: S) -> Result<u64, UploadError>
where
    S: Stream<Item = Result<Bytes, UploadError>> + Unpin,
{
    let mut file = tokio::fs::File::create(path).await?;
    let mut size = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(size)
}

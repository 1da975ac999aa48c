use std::io;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::cache::StorageCache;
use crate::error::UploadError;
use crate::record::FileRecord;

/// Overwrite behavior for [`StagedFile::move_to`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Replace an existing file at the destination instead of failing.
    pub overwrite: bool,
}

/// Capability object over one cached [`FileRecord`].
///
/// Exposes the record's fields (via [`Deref`]) plus read, move, and delete
/// operations that keep the storage cache consistent. The wrapper owns no
/// state beyond the record snapshot taken at wrap time; `delete` and
/// `move_to` drop the cache entry before touching the filesystem, so a
/// record mid-delete or mid-move is never visible to a concurrent lookup.
#[derive(Debug, Clone)]
pub struct StagedFile {
    record: FileRecord,
    cache: Arc<dyn StorageCache>,
}

impl StagedFile {
    pub(crate) fn new(record: FileRecord, cache: Arc<dyn StorageCache>) -> Self {
        Self { record, cache }
    }

    /// Returns the underlying record.
    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    /// Removes the cache entry for this record, then deletes the backing
    /// file. The entry is gone even if the filesystem delete fails.
    pub async fn delete(self) -> Result<(), UploadError> {
        self.cache.del(&self.record.generated_name);
        tokio::fs::remove_file(&self.record.path).await?;
        Ok(())
    }

    /// Removes the cache entry for this record, then relocates the backing
    /// file to `dest`.
    ///
    /// After this call the record is no longer retrievable by its generated
    /// filename. Without [`MoveOptions::overwrite`], an existing destination
    /// fails with [`io::ErrorKind::AlreadyExists`].
    pub async fn move_to(
        self,
        dest: impl AsRef<Path>,
        options: MoveOptions,
    ) -> Result<(), UploadError> {
        let dest = dest.as_ref();
        self.cache.del(&self.record.generated_name);

        if !options.overwrite && tokio::fs::try_exists(dest).await? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination {} already exists", dest.display()),
            )
            .into());
        }

        if let Err(rename_err) = tokio::fs::rename(&self.record.path, dest).await {
            // Rename does not cross filesystems; retry as copy + remove. When
            // the copy fails too, the rename error is the one that names the
            // real cause.
            if tokio::fs::copy(&self.record.path, dest).await.is_err() {
                return Err(rename_err.into());
            }
            tokio::fs::remove_file(&self.record.path).await?;
        }
        Ok(())
    }

    /// Reads the full contents of the backing file.
    ///
    /// Fails with the underlying filesystem error when the file is missing or
    /// unreadable; the cache is not consulted again.
    pub async fn buffer(&self) -> Result<Bytes, UploadError> {
        Ok(Bytes::from(tokio::fs::read(&self.record.path).await?))
    }

    /// Blocking variant of [`buffer`](Self::buffer).
    pub fn buffer_sync(&self) -> Result<Bytes, UploadError> {
        Ok(Bytes::from(std::fs::read(&self.record.path)?))
    }
}

impl Deref for StagedFile {
    type Target = FileRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

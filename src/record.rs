use std::path::PathBuf;

/// Metadata describing one staged upload.
///
/// A record is created once per successfully staged file and is only ever
/// replaced wholesale in the storage cache, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileRecord {
    /// Generated filename; the cache key and the on-disk name inside the
    /// staging directory.
    pub generated_name: String,
    /// Client-supplied filename, informational only.
    pub original_name: String,
    /// Declared MIME type of the uploaded file.
    pub content_type: String,
    /// Canonical extension resolved from the content type.
    pub extension: String,
    /// Persisted file size in bytes.
    pub size: u64,
    /// Human-readable rendering of `size`, e.g. `"1.5MB"`.
    pub size_str: String,
    /// Path of the persisted bytes inside the staging directory.
    pub path: PathBuf,
}

//! Staging-directory helpers: generated filenames, extension resolution,
//! directory emptying.

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hex length of the hash prefix in generated filenames.
const GENERATED_NAME_LEN: usize = 32;

/// Resolves a MIME type string to its canonical extension key.
///
/// Only subtypes that round-trip through the extension table resolve here
/// (`image/png` to `png`). Aliased types such as `text/plain` have no single
/// canonical extension and return `None`; the policy matches those against
/// its configured extensions instead.
pub(crate) fn extension_for_mime(content_type: &str) -> Option<String> {
    let mime: mime::Mime = content_type.parse().ok()?;
    let subtype = mime.subtype().as_str().to_ascii_lowercase();
    extension_matches_mime(&subtype, mime.essence_str()).then_some(subtype)
}

/// Returns whether the extension table maps `extension` to the MIME essence.
pub(crate) fn extension_matches_mime(extension: &str, essence: &str) -> bool {
    mime_guess::from_ext(extension)
        .iter()
        .any(|candidate| candidate.essence_str() == essence)
}

/// Generates a staging filename for one upload.
///
/// Hashes the original name, content type, creation instant, and a random
/// component, so identical uploads within the same instant still diverge.
pub(crate) fn generate_filename(
    original_name: &str,
    content_type: &str,
    extension: &str,
) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(original_name.as_bytes());
    hasher.update(content_type.as_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{}.{extension}", &digest[..GENERATED_NAME_LEN])
}

/// Recreates `dir` as an empty directory, discarding any previous contents.
pub(crate) async fn empty_dir(dir: &Path) -> io::Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    tokio::fs::create_dir_all(dir).await
}

/// Blocking variant of [`empty_dir`], used while the uploader is built.
pub(crate) fn empty_dir_sync(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    std::fs::create_dir_all(dir)
}

/// Strips directory components, so a full path and a bare filename are
/// equivalent cache keys.
pub(crate) fn base_name(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(filename)
}

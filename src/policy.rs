use std::collections::HashMap;

use crate::bytesize;
use crate::error::{ConfigError, UploadError};
use crate::staging;

/// Per-upload acceptance policy: allowed extensions and per-type size limits.
///
/// Constructed once per uploader. The default policy allows nothing, matching
/// an empty configuration map.
#[derive(Debug, Clone, Default)]
pub struct UploadPolicy {
    allowed: HashMap<String, MaxSize>,
}

#[derive(Debug, Clone)]
struct MaxSize {
    bytes: u64,
    raw: String,
}

impl UploadPolicy {
    /// Builds a policy from `(extension, max-size-string)` pairs, e.g.
    /// `[("png", "5mb"), ("pdf", "10mb")]`.
    ///
    /// Every size string is parsed here; a malformed value fails the build
    /// instead of the first request.
    pub fn new<I, K, V>(allowed: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (extension, value) in allowed {
            let extension = extension.into().to_ascii_lowercase();
            let raw = value.into();
            let bytes =
                bytesize::parse_size(&raw).ok_or_else(|| ConfigError::InvalidMaxSize {
                    extension: extension.clone(),
                    value: raw.clone(),
                })?;
            map.insert(extension, MaxSize { bytes, raw });
        }
        Ok(Self { allowed: map })
    }

    /// Returns the configured extensions, sorted.
    pub fn allowed_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.allowed.keys().cloned().collect();
        extensions.sort();
        extensions
    }

    /// Checks one incoming upload against the policy and returns its
    /// canonical extension on approval.
    ///
    /// `declared_size` is the request Content-Length value (zero when the
    /// header is absent), so this is a coarse early-exit guard over the whole
    /// request, not exact per-file enforcement.
    pub fn check(&self, content_type: &str, declared_size: u64) -> Result<String, UploadError> {
        let Some((extension, max)) = self.resolve(content_type) else {
            return Err(UploadError::UnsupportedMediaType {
                content_type: content_type.to_owned(),
                allowed: self.allowed_extensions(),
            });
        };
        if declared_size > max.bytes {
            return Err(UploadError::EntityTooLarge {
                max_size: max.bytes,
                max_size_str: max.raw.clone(),
            });
        }
        Ok(extension)
    }

    /// Resolves a content type to its configured extension key.
    ///
    /// The canonical extension wins when it is configured. Aliased types
    /// without one (`text/plain`, `image/svg+xml`) match the first configured
    /// extension, in sorted order, that the extension table maps back to the
    /// declared type, so a policy keyed `txt` accepts `text/plain`.
    fn resolve(&self, content_type: &str) -> Option<(String, &MaxSize)> {
        if let Some(extension) = staging::extension_for_mime(content_type) {
            if let Some(max) = self.allowed.get(&extension) {
                return Some((extension, max));
            }
        }

        let mime: mime::Mime = content_type.parse().ok()?;
        for extension in self.allowed_extensions() {
            if staging::extension_matches_mime(&extension, mime.essence_str()) {
                let max = self.allowed.get(&extension)?;
                return Some((extension, max));
            }
        }
        None
    }
}

//! Axum integration helpers.

use axum::{
    body::Bytes,
    http::{header, HeaderMap},
};
use futures::{Stream, StreamExt};

use crate::UploadError;

/// Axum body stream mapped into `filestage` chunk errors.
pub type AxumBodyStream<S> =
    futures::stream::Map<S, fn(Result<Bytes, axum::Error>) -> Result<Bytes, UploadError>>;

/// Reads the declared request size from Axum request headers.
///
/// A missing or unparsable `Content-Length` header counts as zero, which the
/// policy treats as an unconstrained declared size.
pub fn declared_size_from_headers(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Maps an Axum body stream into the stream shape expected by
/// [`Uploader::stage`](crate::Uploader::stage).
pub fn map_body_stream<S>(stream: S) -> AxumBodyStream<S>
where
    S: Stream<Item = Result<Bytes, axum::Error>>,
{
    stream.map(axum_item_to_upload)
}

fn axum_item_to_upload(item: Result<Bytes, axum::Error>) -> Result<Bytes, UploadError> {
    item.map_err(|err| UploadError::Io(std::io::Error::other(err)))
}

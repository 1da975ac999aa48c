#![allow(missing_docs)]

use std::path::PathBuf;

use bytes::Bytes;
use filestage::{ConfigError, UploadError, UploadPolicy, Uploader};
use uuid::Uuid;

#[test]
fn malformed_size_string_fails_at_construction() {
    let err = UploadPolicy::new([("png", "five megabytes")]).expect_err("policy should reject");
    assert!(matches!(
        err,
        ConfigError::InvalidMaxSize { extension, value }
        if extension == "png" && value == "five megabytes"
    ));
}

#[test]
fn zero_cache_capacity_fails_at_build() {
    let root = temp_root();
    let err = Uploader::builder()
        .staging_dir(&root)
        .cache_capacity(0)
        .build()
        .expect_err("build should reject zero capacity");
    assert!(matches!(
        err,
        UploadError::Config(ConfigError::InvalidCacheCapacity)
    ));
    std::fs::remove_dir_all(root).ok();
}

#[tokio::test]
async fn unsupported_media_type_is_rejected_without_staging() {
    let root = temp_root();
    let uploader = uploader(&root);

    let err = uploader
        .stage_bytes("notes.txt", "text/plain", Bytes::from_static(b"hello"))
        .await
        .expect_err("text/plain is not configured");
    assert!(matches!(
        err,
        UploadError::UnsupportedMediaType { content_type, allowed }
        if content_type == "text/plain" && allowed == ["pdf", "png"]
    ));

    assert!(staged_file_count(&root).await == 0);
    assert!(uploader.cache().keys().is_empty());

    cleanup(root).await;
}

#[tokio::test]
async fn oversized_request_is_rejected_before_staging() {
    let root = temp_root();
    let uploader = uploader(&root);

    let payload = Bytes::from(vec![0u8; 2 * 1024]);
    let err = uploader
        .stage_bytes("shot.png", "image/png", payload)
        .await
        .expect_err("payload exceeds the 1kb png limit");
    assert!(matches!(
        err,
        UploadError::EntityTooLarge { max_size: 1024, max_size_str }
        if max_size_str == "1kb"
    ));

    assert!(staged_file_count(&root).await == 0);
    assert!(uploader.cache().keys().is_empty());

    cleanup(root).await;
}

#[tokio::test]
async fn aliased_content_type_matches_its_configured_extension() {
    let root = temp_root();
    let uploader = Uploader::builder()
        .staging_dir(&root)
        .policy(UploadPolicy::new([("txt", "1mb"), ("png", "1kb")]).expect("valid policy"))
        .build()
        .expect("builder should succeed");

    // text/plain has no round-tripping subtype; the configured "txt" key
    // must still accept it.
    let staged = uploader
        .stage_bytes("notes.txt", "text/plain", Bytes::from_static(b"plain text"))
        .await
        .expect("a txt policy accepts text/plain");
    assert_eq!(staged.extension, "txt");
    assert!(staged.generated_name.ends_with(".txt"));
    assert!(uploader.cache().has(&staged.generated_name));

    cleanup(root).await;
}

#[tokio::test]
async fn upload_within_limit_is_approved() {
    let root = temp_root();
    let uploader = uploader(&root);

    let staged = uploader
        .stage_bytes("shot.png", "image/png", Bytes::from_static(b"png bytes"))
        .await
        .expect("upload should pass the policy");
    assert_eq!(staged.extension, "png");
    assert_eq!(staged.size, 9);
    assert!(staged.generated_name.ends_with(".png"));
    assert!(uploader.cache().has(&staged.generated_name));

    cleanup(root).await;
}

#[tokio::test]
async fn missing_content_length_counts_as_zero() {
    let root = temp_root();
    let uploader = uploader(&root);

    // Declared size zero never exceeds a configured limit.
    let staged = uploader
        .stage(
            0,
            filestage::IncomingFile {
                original_name: "shot.png".to_owned(),
                content_type: "image/png".to_owned(),
                stream: futures::stream::iter([Ok(Bytes::from_static(b"data"))]),
            },
        )
        .await
        .expect("zero declared size should pass");
    assert_eq!(staged.size, 4);

    cleanup(root).await;
}

fn uploader(root: &PathBuf) -> Uploader {
    Uploader::builder()
        .staging_dir(root)
        .policy(UploadPolicy::new([("png", "1kb"), ("pdf", "10mb")]).expect("valid policy"))
        .build()
        .expect("builder should succeed")
}

fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("filestage-test-{}", Uuid::new_v4()))
}

async fn staged_file_count(root: &PathBuf) -> usize {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(_) => return 0,
    };
    let mut count = 0;
    while let Ok(Some(_)) = entries.next_entry().await {
        count += 1;
    }
    count
}

async fn cleanup(path: PathBuf) {
    let _ = tokio::fs::remove_dir_all(path).await;
}

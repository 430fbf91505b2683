use std::future::Future;

use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

const FALLBACK_FILE_NAME: &str = "upload";

/// Object key for an original upload: `resumes/{user_id}/{unix_millis}-{name}`.
pub fn storage_key(user_id: Uuid, file_name: &str, uploaded_at: DateTime<Utc>) -> String {
    format!(
        "resumes/{user_id}/{}-{}",
        uploaded_at.timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// Drops any client-side directory and keeps `[A-Za-z0-9._-]`, replacing
/// everything else with `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Copies the original upload to the bucket.
pub async fn upload_original(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    bytes: Bytes,
    content_type: &str,
) -> Result<()> {
    let size = bytes.len();
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(content_type)
        .send()
        .await
        .with_context(|| format!("S3 upload of {key} failed"))?;

    info!("Uploaded original résumé ({size} bytes) to s3://{bucket}/{key}");
    Ok(())
}

/// Removes an uploaded original, e.g. when its database row could not be written.
pub async fn delete_original(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) -> Result<()> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .with_context(|| format!("S3 delete of {key} failed"))?;

    info!("Deleted s3://{bucket}/{key}");
    Ok(())
}

/// Runs `cleanup` only when `result` is an error, then returns `result`.
/// A failing cleanup is logged and never replaces the original error.
pub async fn discard_on_error<T, E, F>(
    result: std::result::Result<T, E>,
    cleanup: F,
) -> std::result::Result<T, E>
where
    F: Future<Output = Result<()>>,
{
    if result.is_err() {
        if let Err(e) = cleanup.await {
            warn!("Cleanup after failed write did not complete: {e:#}");
        }
    }
    result
}

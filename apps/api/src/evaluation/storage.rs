//! Chunk storage. Raw video lands in S3 under a per-interview prefix; the
//! database keeps only the keys.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Builds the storage key for an uploaded chunk. The millisecond timestamp
/// plus the chunk's position keep keys unique and sortable when listing the
/// bucket by hand.
pub fn chunk_key(interview_id: Uuid, at: DateTime<Utc>, seq: usize) -> String {
    format!(
        "interview/{}/chunk_{}_{:04}.webm",
        interview_id,
        at.timestamp_millis(),
        seq
    )
}

pub async fn put_chunk(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    data: bytes::Bytes,
) -> Result<(), AppError> {
    let size = data.len();
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type("video/webm")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Stored {size} byte chunk at s3://{bucket}/{key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chunk_key_scheme() {
        let id = Uuid::parse_str("6f2c0b6e-93a1-4d38-a2a6-0a5b1b8f1c11").unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();

        let key = chunk_key(id, at, 7);
        assert_eq!(
            key,
            format!(
                "interview/{}/chunk_{}_0007.webm",
                id,
                at.timestamp_millis()
            )
        );
    }

    #[test]
    fn test_chunk_keys_share_interview_prefix() {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let first = chunk_key(id, now, 0);
        let second = chunk_key(id, now, 1);

        let prefix = format!("interview/{id}/");
        assert!(first.starts_with(&prefix));
        assert!(second.starts_with(&prefix));
        assert_ne!(first, second);
    }
}

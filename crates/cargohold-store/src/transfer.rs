//! S3 object transfer
//!
//! Uploads archives with plain `PutObject` below the multipart threshold and
//! with multipart upload above it. A failed multipart upload is aborted so no
//! orphan parts are left billing in the bucket.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_smithy_types::byte_stream::Length;
use cargohold_core::{ArchiveStream, ObjectKey, ObjectTransfer, Result, TransferError};

use crate::config::StoreConfig;

/// Payloads above this size go through multipart upload.
const MULTIPART_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Part size for multipart uploads. The S3 minimum is 5 MiB.
const PART_SIZE: u64 = 16 * 1024 * 1024;

/// S3-backed implementation of the object transfer contract.
pub struct S3Transfer {
    client: Client,
}

impl S3Transfer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Resolve configuration and build the transfer in one step.
    pub async fn connect() -> Result<Self> {
        let config = StoreConfig::resolve().await?;
        Ok(Self::new(config.client()))
    }

    async fn put_multipart(
        &self,
        bucket: &str,
        key: &ObjectKey,
        archive: &ArchiveStream,
    ) -> Result<()> {
        let create = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify_sdk_error(e, bucket, key.as_str()))?;
        let upload_id = create
            .upload_id()
            .ok_or_else(|| {
                TransferError::StorageTransfer("multipart upload id missing".to_string())
            })?
            .to_string();

        match self.upload_parts(bucket, key, &upload_id, archive).await {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(key.as_str())
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await
                    .map_err(|e| classify_sdk_error(e, bucket, key.as_str()))?;
                Ok(())
            }
            Err(err) => {
                // Abort before surfacing the original error; the abort result
                // itself is irrelevant at this point.
                let _ = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key.as_str())
                    .upload_id(&upload_id)
                    .send()
                    .await;
                Err(err)
            }
        }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &ObjectKey,
        upload_id: &str,
        archive: &ArchiveStream,
    ) -> Result<Vec<CompletedPart>> {
        let total = archive.len();
        let mut parts = Vec::new();
        for (index, (offset, length)) in split_parts(total, PART_SIZE).into_iter().enumerate() {
            let part_number = index as i32 + 1;
            let body = ByteStream::read_from()
                .path(archive.path())
                .offset(offset)
                .length(Length::Exact(length))
                .build()
                .await
                .map_err(|e| TransferError::StorageTransfer(e.to_string()))?;

            let uploaded = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key.as_str())
                .upload_id(upload_id)
                .part_number(part_number)
                .body(body)
                .send()
                .await
                .map_err(|e| classify_sdk_error(e, bucket, key.as_str()))?;

            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .build(),
            );
            tracing::debug!(part_number, sent = offset + length, total, "uploaded part");
        }
        Ok(parts)
    }
}

#[async_trait]
impl ObjectTransfer for S3Transfer {
    async fn put(&self, bucket: &str, key: &ObjectKey, archive: &ArchiveStream) -> Result<String> {
        if archive.len() > MULTIPART_THRESHOLD {
            self.put_multipart(bucket, key, archive).await?;
        } else {
            let body = ByteStream::from_path(archive.path())
                .await
                .map_err(|e| TransferError::StorageTransfer(e.to_string()))?;
            self.client
                .put_object()
                .bucket(bucket)
                .key(key.as_str())
                .body(body)
                .send()
                .await
                .map_err(|e| classify_sdk_error(e, bucket, key.as_str()))?;
        }
        Ok(format!("s3://{}/{}", bucket, key.as_str()))
    }

    async fn get(&self, bucket: &str, key: &ObjectKey) -> Result<ArchiveStream> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key.as_str())
            .send()
            .await
            .map_err(|e| classify_sdk_error(e, bucket, key.as_str()))?;

        let mut archive = ArchiveStream::create()?;
        let mut body = response.body;
        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| TransferError::StorageTransfer(e.to_string()))?
        {
            archive.write_chunk(&chunk)?;
        }
        archive.flush()?;
        Ok(archive)
    }
}

/// Split a payload into (offset, length) part ranges.
fn split_parts(total: u64, part_size: u64) -> Vec<(u64, u64)> {
    let mut parts = Vec::new();
    let mut offset = 0;
    while offset < total {
        let length = part_size.min(total - offset);
        parts.push((offset, length));
        offset += length;
    }
    parts
}

/// Map an SDK error onto the transfer error taxonomy.
fn classify_sdk_error<E>(err: SdkError<E>, bucket: &str, key: &str) -> TransferError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some("NoSuchBucket") => TransferError::BucketNotFound {
            bucket: bucket.to_string(),
        },
        Some("NoSuchKey") => TransferError::ObjectNotFound {
            key: key.to_string(),
        },
        Some(
            "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken"
            | "TokenRefreshRequired",
        ) => TransferError::StorageAuth(detail),
        _ => TransferError::StorageTransfer(detail),
    }
}

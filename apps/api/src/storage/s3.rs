use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::{debug, info};

use crate::config::Config;
use crate::storage::{BlobStore, StorageError, StoredBlob};

/// Blob store backed by an S3-compatible bucket (MinIO locally, AWS in production).
#[derive(Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(config: &Config) -> S3Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resumex-static",
    );

    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("upload of {key} failed: {e}")))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(StoredBlob {
            path: key.to_string(),
        })
    }

    async fn get(&self, path: &str) -> Result<Option<Bytes>, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false)
                {
                    debug!("No blob at s3://{}/{}", self.bucket, path);
                    return Ok(None);
                }
                return Err(StorageError::S3(format!("read of {path} failed: {err}")));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("read of {path} failed: {e}")))?;

        Ok(Some(data.into_bytes()))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("delete of {path} failed: {e}")))?;

        info!("Deleted s3://{}/{}", self.bucket, path);
        Ok(true)
    }
}

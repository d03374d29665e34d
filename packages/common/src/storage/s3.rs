use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::BlobStore;
use crate::config::S3Config;

/// S3-compatible blob store (AWS, MinIO, R2, ...).
///
/// Object paths are the validated key itself, so the bucket layout matches
/// the public paste identifiers one to one.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    max_size: u64,
}

fn backend(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

impl S3BlobStore {
    pub fn new(config: &S3Config, max_size: u64) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Backend(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(backend)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket, max_size })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let key = ObjectKey::parse(key)?;
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object(key.as_str(), data)
            .await
            .map_err(backend)?;
        if !is_success(response.status_code()) {
            return Err(StorageError::Backend(format!(
                "put {key} returned status {}",
                response.status_code()
            )));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let key = ObjectKey::parse(key)?;
        match self.bucket.get_object(key.as_str()).await {
            Ok(response) if response.status_code() == 404 => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Ok(response) if !is_success(response.status_code()) => Err(StorageError::Backend(
                format!("get {key} returned status {}", response.status_code()),
            )),
            Ok(response) => Ok(response.bytes().to_vec()),
            Err(S3Error::HttpFailWithBody(404, _)) => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(backend(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let key = ObjectKey::parse(key)?;
        match self.bucket.head_object(key.as_str()).await {
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) if is_success(status) => Ok(true),
            Ok((_, status)) => Err(StorageError::Backend(format!(
                "head {key} returned status {status}"
            ))),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(backend(e)),
        }
    }

    /// S3 does not report whether the key existed, so a successful request
    /// always yields `true`.
    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let key = ObjectKey::parse(key)?;
        let response = self
            .bucket
            .delete_object(key.as_str())
            .await
            .map_err(backend)?;
        if !is_success(response.status_code()) {
            return Err(StorageError::Backend(format!(
                "delete {key} returned status {}",
                response.status_code()
            )));
        }
        Ok(true)
    }
}

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Which blob store backend holds paste content.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// S3-compatible object storage settings.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    /// Bucket name. Default: "textvault".
    #[serde(default = "default_s3_bucket")]
    pub bucket: String,
    /// Region name. Default: "us-east-1".
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint (MinIO, R2, ...). When unset, `region` is resolved as an AWS region.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style addressing (`endpoint/bucket/key`). Required by MinIO.
    #[serde(default)]
    pub path_style: bool,
}

fn default_s3_bucket() -> String {
    "textvault".into()
}
fn default_s3_region() -> String {
    "us-east-1".into()
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: default_s3_bucket(),
            region: default_s3_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            path_style: false,
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Default: filesystem.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend. Default: "./data/blobs".
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Largest accepted paste body in bytes. Default: 10 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
    #[serde(default)]
    pub s3: S3Config,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/blobs")
}
fn default_max_blob_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            max_blob_size: default_max_blob_size(),
            s3: S3Config::default(),
        }
    }
}

/// Which backend serves the read-through result cache.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
    Disabled,
}

/// Result cache configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Default: redis.
    #[serde(default)]
    pub backend: CacheBackend,
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_cache_url")]
    pub url: String,
    /// Entry lifetime in seconds. Default: 43200 (12 hours).
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// Upper bound for a single cache round trip in milliseconds. Default: 1000.
    #[serde(default = "default_cache_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum number of entries held by the in-process backend. Default: 10000.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_url() -> String {
    "redis://localhost:6379".into()
}
fn default_cache_ttl_secs() -> u64 {
    12 * 60 * 60
}
fn default_cache_timeout_ms() -> u64 {
    1000
}
fn default_cache_capacity() -> usize {
    10_000
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            url: default_cache_url(),
            ttl_secs: default_cache_ttl_secs(),
            timeout_ms: default_cache_timeout_ms(),
            capacity: default_cache_capacity(),
        }
    }
}

//! services/api/src/adapters/storage.rs
//!
//! This module contains the object storage adapters used to publish finished
//! episodes. They implement the `ObjectStorageService` port from the `core` crate.

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl, Client as S3Client};
use podcast_core::ports::{ObjectStorageService, PortError, PortResult};
use std::path::{Component, Path, PathBuf};
use tracing::info;

//=========================================================================================
// S3
//=========================================================================================

/// Publishes objects to an S3 bucket with a public-read ACL.
#[derive(Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// The virtual-hosted URL an object in `bucket` is served from.
    pub fn public_url(bucket: &str, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", bucket, key)
    }
}

#[async_trait]
impl ObjectStorageService for S3Storage {
    async fn upload_public(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> PortResult<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("S3 upload failed: {}", e)))?;

        // Enforce the public-read ACL explicitly.
        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("S3 ACL update failed: {}", e)))?;

        let url = Self::public_url(&self.bucket, key);
        info!("Uploaded {} to {}", key, url);
        Ok(url)
    }
}

//=========================================================================================
// Local Filesystem
//=========================================================================================

/// Writes objects below a directory served at `public_base_url`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, key: &str) -> PortResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(PortError::Unexpected(format!("Invalid object key: {}", key)));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl ObjectStorageService for LocalStorage {
    async fn upload_public(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> PortResult<String> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

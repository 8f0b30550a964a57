//! S3 storage backend built on the object_store crate
//!
//! Works against AWS S3 and S3-compatible endpoints (MinIO and friends).
//! The same client signs direct-upload URLs.

use anyhow::{Context, Result};
use object_store::aws::AmazonS3Builder;
use std::sync::Arc;

use super::ObjectStorePhotoStore;

/// Configuration for S3 storage backend
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    /// Permit plain HTTP endpoints (local MinIO)
    pub allow_http: bool,
    /// Overrides the URL photos are served from
    pub public_base_url: Option<String>,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            access_key: None,
            secret_key: None,
            endpoint: None,
            allow_http: false,
            public_base_url: None,
        }
    }

    /// Base URL objects are publicly reachable at
    pub fn public_base_url(&self) -> String {
        if let Some(url) = &self.public_base_url {
            return url.trim_end_matches('/').to_string();
        }

        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// Create an S3-backed photo store from configuration
pub fn create_s3_photo_store(config: &S3Config) -> Result<ObjectStorePhotoStore> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_virtual_hosted_style_request(false);
    }

    let s3 = Arc::new(builder.build().context("Failed to build S3 store")?);

    Ok(ObjectStorePhotoStore::new(s3.clone(), config.public_base_url()).with_signer(s3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::value_objects::PhotoKey, ports::storage::PhotoStore};
    use std::time::Duration;

    fn config() -> S3Config {
        S3Config {
            access_key: Some("AKIDEXAMPLE".to_string()),
            secret_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
            ..S3Config::new("photos", "eu-west-1")
        }
    }

    #[test]
    fn test_public_base_url() {
        assert_eq!(
            config().public_base_url(),
            "https://photos.s3.eu-west-1.amazonaws.com"
        );

        let minio = S3Config {
            endpoint: Some("http://localhost:9000/".to_string()),
            ..config()
        };
        assert_eq!(minio.public_base_url(), "http://localhost:9000/photos");

        let cdn = S3Config {
            public_base_url: Some("https://cdn.example.com/".to_string()),
            ..config()
        };
        assert_eq!(cdn.public_base_url(), "https://cdn.example.com");
    }

    #[tokio::test]
    async fn test_signed_upload_url() {
        let store = create_s3_photo_store(&config()).unwrap();
        let key = PhotoKey::new("1700000000000-a.png".to_string()).unwrap();

        let url = store
            .sign_upload_url(&key, "image/png", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.contains("1700000000000-a.png"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=60"));
        // only the host is signed, the declared content type is not
        assert!(url.contains("X-Amz-SignedHeaders=host"));
        assert!(!url.to_ascii_lowercase().contains("content-type"));
        assert_eq!(
            store.public_url(&key),
            "https://photos.s3.eu-west-1.amazonaws.com/1700000000000-a.png"
        );
    }
}

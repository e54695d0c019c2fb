//! S3-compatible object storage for event images.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use eventboard_core::upload::{ImageStore, UploadError};

pub const DEFAULT_BUCKET: &str = "event-images";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for the image bucket.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// Custom endpoint for S3-compatible services. `None` uses AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    /// Base of public object URLs; objects live at `{base}/{bucket}/{key}`.
    pub public_base_url: String,
    /// Static credentials. `None` falls back to the default AWS chain.
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Uploads images into a pre-existing bucket.
pub struct S3ImageStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ImageStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from settings. Path-style addressing is forced so
    /// that self-hosted S3-compatible endpoints work.
    pub async fn from_settings(settings: &StorageSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        if let (Some(id), Some(secret)) = (&settings.access_key_id, &settings.secret_access_key) {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                "eventboard-static",
            ));
        }

        let shared = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(true)
            .build();

        tracing::info!(bucket = %settings.bucket, endpoint = ?settings.endpoint, "Image storage configured");

        Self::new(
            aws_sdk_s3::Client::from_conf(config),
            settings.bucket.clone(),
            settings.public_base_url.clone(),
        )
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, key)
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| UploadError::Storage(DisplayErrorContext(&e).to_string()))?;

        Ok(self.public_url(key))
    }
}

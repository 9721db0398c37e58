use std::time::Duration;

use aws_config::{BehaviorVersion, SdkConfig, meta::region::RegionProviderChain};
use aws_sdk_s3::{
    Client,
    config::{Builder, retry::RetryConfig, timeout::TimeoutConfig},
    error::DisplayErrorContext,
};
use tracing::debug;

use crate::{Dataset, error::DatasetError};

/// Used when neither the environment nor the profile names a region.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Bucket and key of the dataset object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

/// S3 client for the dataset object.
///
/// Requests are SigV4-signed with whatever credentials the [`SdkConfig`] carries.
/// A custom endpoint switches to path-style addressing for S3-compatible stores.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
}

impl ObjectStore {
    /// Resolves region and credentials from the standard AWS chain
    /// (environment, profile files, container and instance metadata).
    pub async fn from_env(endpoint: Option<&str>, timeout: Duration) -> Result<Self, DatasetError> {
        let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        Self::new(&sdk_config, endpoint, timeout)
    }

    pub fn new(
        sdk_config: &SdkConfig,
        endpoint: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, DatasetError> {
        // no retries, a failed fetch surfaces on the request that made it
        let mut builder = Builder::from(sdk_config)
            .retry_config(RetryConfig::disabled())
            .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());

        if let Some(endpoint) = endpoint.map(str::trim).filter(|e| !e.is_empty()) {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(DatasetError::Endpoint(endpoint.to_string()));
            }

            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
        })
    }

    pub async fn get_object(&self, location: &ObjectLocation) -> Result<Vec<u8>, DatasetError> {
        debug!("Fetching s3://{}/{}", location.bucket, location.key);

        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| DatasetError::Request {
                bucket: location.bucket.clone(),
                key: location.key.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let bytes = output.body.collect().await?.into_bytes();
        debug!("Fetched {} bytes", bytes.len());

        Ok(bytes.to_vec())
    }
}

/// Fetches and parses the dataset. Nothing is cached between calls.
pub async fn load_remote(
    store: &ObjectStore,
    location: &ObjectLocation,
) -> Result<Dataset, DatasetError> {
    let bytes = store.get_object(location).await?;

    Dataset::from_bytes(&bytes)
}

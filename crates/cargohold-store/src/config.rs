//! Store configuration resolution
//!
//! Region and credentials come from the standard AWS provider chain
//! (environment, shared config, instance metadata). A custom endpoint can be
//! supplied via `AWS_S3_ENDPOINT`; when set, path-style addressing is forced
//! so MinIO-style stores resolve buckets correctly.
//!
//! Resolution happens once per invocation and fails before any transfer is
//! attempted when the region or the credentials are missing.

use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use cargohold_core::{Result, TransferError};

/// Environment variable for the custom endpoint override.
pub const ENDPOINT_ENV: &str = "AWS_S3_ENDPOINT";

/// Resolved endpoint configuration for one invocation.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    region: String,
    endpoint: Option<String>,
    sdk_config: aws_config::SdkConfig,
}

impl StoreConfig {
    /// Resolve region, credentials and the optional endpoint override.
    pub async fn resolve() -> Result<Self> {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        let region = sdk_config
            .region()
            .map(|region| region.to_string())
            .ok_or_else(|| {
                TransferError::Validation(
                    "AWS region is not configured (set AWS_REGION)".to_string(),
                )
            })?;

        // Verify the credential chain up front so a misconfigured environment
        // fails here instead of halfway through a transfer.
        let provider = sdk_config.credentials_provider().ok_or_else(|| {
            TransferError::StorageAuth("no credentials provider configured".to_string())
        })?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| TransferError::StorageAuth(e.to_string()))?;

        let endpoint = std::env::var(ENDPOINT_ENV).ok().filter(|v| !v.is_empty());
        if let Some(endpoint) = &endpoint {
            tracing::debug!(%endpoint, "using custom S3 endpoint");
        }

        Ok(Self {
            region,
            endpoint,
            sdk_config,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Build the S3 client for this configuration.
    pub fn client(&self) -> aws_sdk_s3::Client {
        let mut builder = aws_sdk_s3::config::Builder::from(&self.sdk_config);
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        aws_sdk_s3::Client::from_conf(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_blocking() -> Result<StoreConfig> {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(StoreConfig::resolve())
    }

    #[test]
    fn test_resolve_picks_up_endpoint_override() {
        temp_env::with_vars(
            [
                ("AWS_ACCESS_KEY_ID", Some("test-key")),
                ("AWS_SECRET_ACCESS_KEY", Some("test-secret")),
                ("AWS_REGION", Some("ap-northeast-1")),
                ("AWS_S3_ENDPOINT", Some("http://localhost:9000")),
                ("AWS_EC2_METADATA_DISABLED", Some("true")),
                ("AWS_CONFIG_FILE", Some("/dev/null")),
                ("AWS_SHARED_CREDENTIALS_FILE", Some("/dev/null")),
            ],
            || {
                let config = resolve_blocking().unwrap();
                assert_eq!(config.region(), "ap-northeast-1");
                assert_eq!(config.endpoint(), Some("http://localhost:9000"));
            },
        );
    }

    #[test]
    fn test_resolve_without_endpoint() {
        temp_env::with_vars(
            [
                ("AWS_ACCESS_KEY_ID", Some("test-key")),
                ("AWS_SECRET_ACCESS_KEY", Some("test-secret")),
                ("AWS_REGION", Some("us-east-1")),
                ("AWS_S3_ENDPOINT", None),
                ("AWS_EC2_METADATA_DISABLED", Some("true")),
                ("AWS_CONFIG_FILE", Some("/dev/null")),
                ("AWS_SHARED_CREDENTIALS_FILE", Some("/dev/null")),
            ],
            || {
                let config = resolve_blocking().unwrap();
                assert_eq!(config.endpoint(), None);
            },
        );
    }

    #[test]
    fn test_resolve_fails_without_region() {
        temp_env::with_vars(
            [
                ("AWS_ACCESS_KEY_ID", Some("test-key")),
                ("AWS_SECRET_ACCESS_KEY", Some("test-secret")),
                ("AWS_REGION", None),
                ("AWS_DEFAULT_REGION", None),
                ("AWS_EC2_METADATA_DISABLED", Some("true")),
                ("AWS_CONFIG_FILE", Some("/dev/null")),
                ("AWS_SHARED_CREDENTIALS_FILE", Some("/dev/null")),
            ],
            || {
                let err = resolve_blocking().unwrap_err();
                assert!(matches!(err, TransferError::Validation(_)));
            },
        );
    }

    #[test]
    fn test_resolve_treats_empty_endpoint_as_unset() {
        temp_env::with_vars(
            [
                ("AWS_ACCESS_KEY_ID", Some("test-key")),
                ("AWS_SECRET_ACCESS_KEY", Some("test-secret")),
                ("AWS_REGION", Some("us-east-1")),
                ("AWS_S3_ENDPOINT", Some("")),
                ("AWS_EC2_METADATA_DISABLED", Some("true")),
                ("AWS_CONFIG_FILE", Some("/dev/null")),
                ("AWS_SHARED_CREDENTIALS_FILE", Some("/dev/null")),
            ],
            || {
                let config = resolve_blocking().unwrap();
                assert_eq!(config.endpoint(), None);
            },
        );
    }
}

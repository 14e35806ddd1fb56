use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_secretsmanager as secretsmanager;
use tracing::info;
use crate::error::CredentialError;

/// Source of the GitHub access token.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get(&self, secret_id: &str, region: &str) -> Result<String, CredentialError>;
}

/// Reads the token from AWS Secrets Manager, or from `endpoint` when given.
#[derive(Debug, Clone, Default)]
pub struct SecretsManagerProvider {
    endpoint: Option<String>,
}

impl SecretsManagerProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl CredentialProvider for SecretsManagerProvider {
    async fn get(&self, secret_id: &str, region: &str) -> Result<String, CredentialError> {
        let region_provider = RegionProviderChain::first_try(secretsmanager::Region::new(region.to_owned()))
            .or_else("us-east-1");
        let config = aws_config::from_env().region(region_provider).load().await;
        let sm_config = match &self.endpoint {
            Some(endpoint) => secretsmanager::config::Builder::from(&config).endpoint_url(endpoint).build(),
            None => secretsmanager::config::Builder::from(&config).build()
        };
        let client = secretsmanager::Client::from_conf(sm_config);

        info!("getting GitHub access token");
        let result = client.get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| CredentialError::internal(secretsmanager::Error::from(e).to_string()))?;
        match result.secret_string() {
            Some(token) => Ok(token.to_string()),
            None => Err(CredentialError::internal(format!("secret {} has no string value", secret_id))),
        }
    }
}

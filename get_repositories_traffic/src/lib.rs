pub mod aggregator;
pub mod config;
pub mod error;
pub mod github;
pub mod record;
pub mod secrets;
pub mod store;

use aws_lambda_events::event::cloudwatch_events::CloudWatchEvent;
use lambda_runtime::{Error, LambdaEvent};
use tracing::debug;

pub use aggregator::{HandlerResponse, RepositoryOutcome, TrafficAggregator};
pub use config::{Config, RepositoryRef};
pub use error::{ConfigError, CredentialError, RepositoryError, StoreError, TrafficFetchError};
pub use github::{GitHubTrafficClient, TrafficSource};
pub use record::{DailyTraffic, Feed, TrafficMerger, TrafficRecord};
pub use secrets::{CredentialProvider, SecretsManagerProvider};
pub use store::{DynamoDbStore, TrafficStore};

/// Entry point for the scheduled rule. The event payload carries nothing we need.
pub async fn function_handler(event: LambdaEvent<CloudWatchEvent>) -> Result<HandlerResponse, Error> {
    debug!("invoked by {:?}", event.payload.id);
    let config = Config::from_env()?;
    let store = DynamoDbStore::from_env(config.dynamodb_endpoint.as_deref()).await;
    let aggregator = TrafficAggregator::new(
        SecretsManagerProvider::new(config.secrets_manager_endpoint.to_owned()),
        GitHubTrafficClient::new(config.github_api_url.to_owned()),
        store,
    );
    Ok(aggregator.run(&config).await)
}

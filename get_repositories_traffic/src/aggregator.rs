use serde::{Deserialize, Serialize};
use tracing::{error, info};
use crate::config::{Config, RepositoryRef};
use crate::error::{CredentialError, RepositoryError, TrafficFetchError};
use crate::github::TrafficSource;
use crate::record::{Feed, TrafficMerger, TrafficRecord};
use crate::secrets::CredentialProvider;
use crate::store::TrafficStore;

/// What the function hands back to the Lambda runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl HandlerResponse {
    pub fn ok() -> Self {
        Self { status_code: 200, body: None }
    }
}

impl From<CredentialError> for HandlerResponse {
    fn from(e: CredentialError) -> Self {
        Self { status_code: e.status, body: Some(e.detail) }
    }
}

/// Result of one repository's fetch and persist cycle; `Ok` holds the number
/// of records written.
#[derive(Debug)]
pub struct RepositoryOutcome {
    pub repo: RepositoryRef,
    pub result: Result<usize, RepositoryError>,
}

pub struct TrafficAggregator<C, S, T> {
    credentials: C,
    source: S,
    store: T,
}

impl<C, S, T> TrafficAggregator<C, S, T>
where
    C: CredentialProvider,
    S: TrafficSource,
    T: TrafficStore,
{
    pub fn new(credentials: C, source: S, store: T) -> Self {
        Self { credentials, source, store }
    }

    pub async fn resolve_credential(&self, secret_id: &str, region: &str) -> Result<String, CredentialError> {
        self.credentials.get(secret_id, region).await
    }

    /// Fetches views then clones for `repo` and merges them into one record per day.
    pub async fn fetch_repository_traffic(&self, token: &str, repo: &RepositoryRef) -> Result<Vec<TrafficRecord>, TrafficFetchError> {
        info!("getting traffic for repo {}", repo);
        let mut merger = TrafficMerger::new(repo.name.to_owned());
        for feed in Feed::ALL {
            let days = self.source.fetch(token, repo, feed).await?;
            merger.add(feed, &days);
        }
        Ok(merger.into_records())
    }

    pub async fn persist(&self, table_name: &str, records: &[TrafficRecord]) -> Result<(), RepositoryError> {
        if records.is_empty() {
            return Ok(());
        }
        self.store.put_batch(table_name, records).await?;
        Ok(())
    }

    async fn capture_repository(&self, token: &str, table_name: &str, repo: &RepositoryRef) -> Result<usize, RepositoryError> {
        let records = self.fetch_repository_traffic(token, repo).await?;
        self.persist(table_name, &records).await?;
        Ok(records.len())
    }

    /// Captures every configured repository in order. A failure is logged and
    /// recorded in its outcome; it never stops the remaining repositories.
    pub async fn capture_all(&self, token: &str, config: &Config) -> Vec<RepositoryOutcome> {
        let mut outcomes = Vec::with_capacity(config.repositories.len());
        for repo in &config.repositories {
            let result = self.capture_repository(token, &config.table_name, repo).await;
            match &result {
                Ok(written) => info!("stored {} days of traffic for {}", written, repo),
                Err(e) => error!("failed to capture traffic for {}: {}", repo, e),
            }
            outcomes.push(RepositoryOutcome { repo: repo.to_owned(), result });
        }
        outcomes
    }

    /// One scheduled run. Only a credential failure changes the returned status;
    /// repository failures are logged and the run still reports 200.
    pub async fn run(&self, config: &Config) -> HandlerResponse {
        let token = match self.resolve_credential(&config.secret_id, &config.region).await {
            Ok(token) => token,
            Err(e) => {
                error!("{}", e.detail);
                return e.into();
            }
        };

        let outcomes = self.capture_all(&token, config).await;
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!("captured {} of {} repositories", outcomes.len() - failed, outcomes.len());
        HandlerResponse::ok()
    }
}

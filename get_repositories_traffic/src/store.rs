use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::model::{PutRequest, WriteRequest};
use tracing::{debug, warn};
use crate::error::StoreError;
use crate::record::TrafficRecord;

/// DynamoDB accepts at most this many put requests per `BatchWriteItem`.
pub const MAX_BATCH_SIZE: usize = 25;

/// Rounds spent resubmitting unprocessed items of one chunk before giving up.
const MAX_SUBMISSIONS: usize = 5;

/// Destination of the daily records.
#[async_trait]
pub trait TrafficStore: Send + Sync {
    /// Upserts every record, keyed by repository name and timestamp.
    async fn put_batch(&self, table_name: &str, records: &[TrafficRecord]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: ddb::Client,
}

impl DynamoDbStore {
    pub fn new(client: ddb::Client) -> Self {
        Self { client }
    }

    /// Builds a client for the ambient region, pointed at `endpoint` when given.
    pub async fn from_env(endpoint: Option<&str>) -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
        let config = aws_config::from_env().region(region_provider).load().await;
        let ddb_config = match endpoint {
            Some(endpoint) => ddb::config::Builder::from(&config).endpoint_url(endpoint).build(),
            None => ddb::config::Builder::from(&config).build()
        };
        Self::new(ddb::Client::from_conf(ddb_config))
    }

    async fn write_chunk(&self, table_name: &str, mut requests: Vec<WriteRequest>) -> Result<(), StoreError> {
        for _ in 0..MAX_SUBMISSIONS {
            let result = self.client.batch_write_item()
                .request_items(table_name, requests)
                .send()
                .await
                .map_err(|e| StoreError::Request(ddb::Error::from(e).to_string()))?;
            requests = match result.unprocessed_items() {
                Some(unprocessed) => unprocessed.get(table_name).cloned().unwrap_or_default(),
                None => Vec::new(),
            };
            if requests.is_empty() {
                return Ok(());
            }
            warn!("{} items unprocessed by {}, resubmitting", requests.len(), table_name);
        }
        Err(StoreError::Unprocessed { remaining: requests.len() })
    }
}

fn put_request(record: &TrafficRecord) -> WriteRequest {
    WriteRequest::builder()
        .put_request(PutRequest::builder().set_item(Some(record.to_item())).build())
        .build()
}

#[async_trait]
impl TrafficStore for DynamoDbStore {
    async fn put_batch(&self, table_name: &str, records: &[TrafficRecord]) -> Result<(), StoreError> {
        for chunk in records.chunks(MAX_BATCH_SIZE) {
            debug!("writing {} records to {}", chunk.len(), table_name);
            self.write_chunk(table_name, chunk.iter().map(put_request).collect()).await?;
        }
        Ok(())
    }
}

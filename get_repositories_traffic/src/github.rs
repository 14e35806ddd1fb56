use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use crate::config::RepositoryRef;
use crate::error::TrafficFetchError;
use crate::record::{DailyTraffic, Feed};

const AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Per-day traffic history of a repository.
#[async_trait]
pub trait TrafficSource: Send + Sync {
    async fn fetch(&self, token: &str, repo: &RepositoryRef, feed: Feed) -> Result<Vec<DailyTraffic>, TrafficFetchError>;
}

#[derive(Debug, Clone)]
pub struct GitHubTrafficClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubTrafficClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, repo: &RepositoryRef, feed: Feed) -> String {
        format!("{}/repos/{}/{}/traffic/{}", self.base_url, repo.owner, repo.name, feed.endpoint())
    }
}

#[async_trait]
impl TrafficSource for GitHubTrafficClient {
    async fn fetch(&self, token: &str, repo: &RepositoryRef, feed: Feed) -> Result<Vec<DailyTraffic>, TrafficFetchError> {
        let url = self.url(repo, feed);
        debug!("GET {}", url);
        let response = self.http.get(&url)
            .query(&[("per", "day")])
            .header(AUTHORIZATION, format!("token {}", token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, AGENT)
            .send()
            .await
            .map_err(|e| TrafficFetchError::internal(e.to_string()))?;

        let status = response.status();
        let body = response.text()
            .await
            .map_err(|e| TrafficFetchError::internal(e.to_string()))?;
        if status != StatusCode::OK {
            return Err(TrafficFetchError { status: status.as_u16(), detail: body });
        }
        parse_feed(&body, feed)
    }
}

/// Extracts the `<endpoint>` array from a traffic response body.
pub fn parse_feed(body: &str, feed: Feed) -> Result<Vec<DailyTraffic>, TrafficFetchError> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|e| TrafficFetchError::internal(format!("invalid {} response: {}", feed.endpoint(), e)))?;
    match value.get_mut(feed.endpoint()).map(Value::take) {
        Some(days) => serde_json::from_value(days)
            .map_err(|e| TrafficFetchError::internal(format!("invalid {} entries: {}", feed.endpoint(), e))),
        None => Err(TrafficFetchError::internal(format!("missing '{}' in response", feed.endpoint()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_views() {
        let body = r#"{"count":14,"uniques":5,"views":[
            {"timestamp":"2024-01-01T00:00:00Z","count":10,"uniques":4},
            {"timestamp":"2024-01-02T00:00:00Z","count":4,"uniques":1}]}"#;
        let days = parse_feed(body, Feed::Views).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(days[1].count, 4);
    }

    #[test]
    fn test_parse_wrong_key() {
        let body = r#"{"count":0,"uniques":0,"views":[]}"#;
        let err = parse_feed(body, Feed::Clones).unwrap_err();
        assert_eq!(err.status, 500);
        assert!(err.detail.contains("clones"));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_feed("<html>", Feed::Views).unwrap_err().status, 500);
    }

    #[test]
    fn test_url() {
        let client = GitHubTrafficClient::new("https://api.github.com/");
        assert_eq!(
            client.url(&RepositoryRef::new("octo", "hello"), Feed::Clones),
            "https://api.github.com/repos/octo/hello/traffic/clones"
        );
    }
}

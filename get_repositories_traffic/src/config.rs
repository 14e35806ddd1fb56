use std::env;
use std::fmt::{Display, Formatter};
use crate::error::ConfigError;

pub const SECRET_ARN: &str = "SECRET_ARN";
pub const TABLE_NAME: &str = "TABLE_NAME";
pub const AWS_REGION: &str = "AWS_REGION";
pub const TRACKED_REPOSITORIES: &str = "TRACKED_REPOSITORIES";
pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
pub const DYNAMODB_ENDPOINT: &str = "DYNAMODB_ENDPOINT";
pub const SECRETS_MANAGER_ENDPOINT: &str = "SECRETS_MANAGER_ENDPOINT";

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// A repository whose traffic is tracked. The token must have push access to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into() }
    }

    /// Parses an `owner/name` pair.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ConfigError::InvalidRepository(s.trim().to_string())),
        }
    }
}

impl Display for RepositoryRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything the deployment hands to an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub secret_id: String,
    pub table_name: String,
    pub region: String,
    pub repositories: Vec<RepositoryRef>,
    pub github_api_url: String,
    pub dynamodb_endpoint: Option<String>,
    pub secrets_manager_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let secret_id = required(SECRET_ARN)?;
        let table_name = required(TABLE_NAME)?;
        let region = required(AWS_REGION)?;
        let repositories = parse_repositories(&required(TRACKED_REPOSITORIES)?)?;

        Ok(Self {
            secret_id,
            table_name,
            region,
            repositories,
            github_api_url: lookup(GITHUB_API_URL)
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            dynamodb_endpoint: lookup(DYNAMODB_ENDPOINT),
            secrets_manager_endpoint: lookup(SECRETS_MANAGER_ENDPOINT),
        })
    }
}

fn parse_repositories(list: &str) -> Result<Vec<RepositoryRef>, ConfigError> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(RepositoryRef::parse)
        .collect()
}

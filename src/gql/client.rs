//! GraphQL HTTP client.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::queries::{self, GqlQuery};
use super::{Network, NetworkCapabilities, Validator};
use crate::error::GqlError;

#[derive(Debug, Deserialize)]
struct GqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GqlErrorEntry {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    url: String,
}

impl GraphqlClient {
    pub fn new(url: impl Into<String>) -> Result<Self, GqlError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GqlError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, url: url.into() })
    }

    /// Post `query` and return its `data`. GraphQL errors win over partial data.
    pub async fn execute(&self, query: &GqlQuery) -> Result<Value, GqlError> {
        let response = self
            .http
            .post(&self.url)
            .json(query)
            .send()
            .await
            .map_err(|e| GqlError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GqlError::Request(format!("HTTP {status}")));
        }
        let body: GqlResponse = response.json().await.map_err(|e| GqlError::Decode(e.to_string()))?;
        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(GqlError::Query(messages.join("; ")));
        }
        body.data.ok_or_else(|| GqlError::MissingResult("data".into()))
    }

    pub async fn all_validators(&self, network: &str) -> Result<Vec<Validator>, GqlError> {
        let data = self.execute(&queries::all_validators(network)?).await?;
        queries::all_validators_result(network, &data)
    }

    pub async fn validator(&self, network: &str, address: &str) -> Result<Option<Validator>, GqlError> {
        let data = self.execute(&queries::validator_profile(network, address)?).await?;
        queries::validator_result(network, &data)
    }

    pub async fn some_validators(&self, network: &str, addresses: &[String]) -> Result<Vec<Validator>, GqlError> {
        let data = self.execute(&queries::some_validators(network, addresses)?).await?;
        queries::all_validators_result(network, &data)
    }

    pub async fn networks(&self) -> Result<Vec<Network>, GqlError> {
        let data = self.execute(&queries::networks()).await?;
        queries::networks_result(&data)
    }

    pub async fn network_capabilities(&self, network_id: &str) -> Result<Option<NetworkCapabilities>, GqlError> {
        let data = self.execute(&queries::network_capabilities(network_id)).await?;
        queries::network_capabilities_result(&data)
    }

    pub async fn network_capability(&self, network_id: &str, capability: &str) -> Result<bool, GqlError> {
        let data = self.execute(&queries::network_capability(network_id, capability)?).await?;
        queries::network_capability_result(&data)
    }
}

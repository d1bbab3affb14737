//! LCD REST client - reqwest implementation of [`NodeFacade`]

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::{
    Delegation, DistributionParameters, MintingParameters, NodeFacade, Redelegation,
    UnbondingDelegation,
};
use crate::core::amount::Coin;
use crate::error::NodeError;

#[derive(Clone)]
pub struct LcdClient {
    http: reqwest::Client,
    base_url: String,
}

impl LcdClient {
    /// `base_url` without trailing slash, e.g. `https://lcd.nylira.net`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, NodeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NodeError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_value(&self, path: &str) -> Result<Value, NodeError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "lcd request");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| NodeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // The LCD puts the reason in the body; prefer it over the bare status.
            let body = response.text().await.unwrap_or_default();
            return Err(match error_message(&body) {
                Some(message) => NodeError::Other(message),
                None => NodeError::Status(status.as_u16()),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| NodeError::Decode(e.to_string()))?;
        Ok(unwrap_envelope(json))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, NodeError> {
        let value = self.get_value(path).await?;
        serde_json::from_value(value).map_err(|e| NodeError::Decode(format!("{path}: {e}")))
    }

    /// Lists come back as `null` when empty on older nodes.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, NodeError> {
        match self.get_value(path).await? {
            Value::Null => Ok(Vec::new()),
            value => serde_json::from_value(value)
                .map_err(|e| NodeError::Decode(format!("{path}: {e}"))),
        }
    }
}

/// Newer LCDs wrap every body as `{height, result}`.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("height") && map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("error")
        .and_then(|e| e.as_str())
        .or_else(|| json.get("message").and_then(|m| m.as_str()))
        .map(String::from)
}

fn parse_height(value: &Value) -> Option<u64> {
    let header = value
        .pointer("/block_meta/header")
        .or_else(|| value.pointer("/block/header"))?;
    match &header["height"] {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Total rewards are either a bare coin list or `{rewards, total}`.
fn total_rewards(value: Value) -> Result<Vec<Coin>, NodeError> {
    let coins = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(mut map) => map.remove("total").unwrap_or(Value::Null),
        other => other,
    };
    if coins.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(coins).map_err(|e| NodeError::Decode(format!("rewards: {e}")))
}

fn decimal_string(value: Value) -> Result<String, NodeError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(NodeError::Decode(format!("expected decimal, got {other}"))),
    }
}

#[async_trait]
impl NodeFacade for LcdClient {
    async fn latest_height(&self) -> Result<u64, NodeError> {
        let value = self.get_value("/blocks/latest").await?;
        parse_height(&value).ok_or_else(|| NodeError::Decode("block header without height".into()))
    }

    async fn delegations(&self, address: &str) -> Result<Vec<Delegation>, NodeError> {
        self.get_list(&format!("/staking/delegators/{address}/delegations")).await
    }

    async fn undelegations(&self, address: &str) -> Result<Vec<UnbondingDelegation>, NodeError> {
        self.get_list(&format!("/staking/delegators/{address}/unbonding_delegations")).await
    }

    async fn redelegations(&self, address: &str) -> Result<Vec<Redelegation>, NodeError> {
        self.get_list(&format!("/staking/redelegations?delegator={address}")).await
    }

    async fn delegator_rewards(&self, address: &str) -> Result<Vec<Coin>, NodeError> {
        let value = self.get_value(&format!("/distribution/delegators/{address}/rewards")).await?;
        total_rewards(value)
    }

    async fn delegator_rewards_from_validator(
        &self,
        address: &str,
        validator: &str,
    ) -> Result<Vec<Coin>, NodeError> {
        self.get_list(&format!("/distribution/delegators/{address}/rewards/{validator}")).await
    }

    async fn distribution_parameters(&self) -> Result<DistributionParameters, NodeError> {
        self.get("/distribution/parameters").await
    }

    async fn distribution_outstanding_rewards(&self) -> Result<Vec<Coin>, NodeError> {
        self.get_list("/distribution/outstanding_rewards").await
    }

    async fn minting_parameters(&self) -> Result<MintingParameters, NodeError> {
        self.get("/minting/parameters").await
    }

    async fn minting_inflation(&self) -> Result<String, NodeError> {
        decimal_string(self.get_value("/minting/inflation").await?)
    }

    async fn minting_annual_provisions(&self) -> Result<String, NodeError> {
        decimal_string(self.get_value("/minting/annual-provisions").await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_height_envelope() {
        let wrapped = json!({"height": "12", "result": [{"denom": "stake", "amount": "1"}]});
        assert_eq!(unwrap_envelope(wrapped), json!([{"denom": "stake", "amount": "1"}]));

        let bare = json!({"result": "kept"});
        assert_eq!(unwrap_envelope(bare.clone()), bare);
    }

    #[test]
    fn reads_height_from_either_header() {
        assert_eq!(parse_height(&json!({"block_meta": {"header": {"height": "42"}}})), Some(42));
        assert_eq!(parse_height(&json!({"block": {"header": {"height": 7}}})), Some(7));
        assert_eq!(parse_height(&json!({"block": {}})), None);
    }

    #[test]
    fn total_rewards_accepts_both_shapes() {
        let listed = total_rewards(json!([{"denom": "stake", "amount": "3"}])).unwrap();
        assert_eq!(listed, vec![Coin::new("stake", "3")]);

        let grouped = total_rewards(json!({"rewards": [], "total": [{"denom": "stake", "amount": "4"}]})).unwrap();
        assert_eq!(grouped, vec![Coin::new("stake", "4")]);

        assert!(total_rewards(json!({"rewards": null, "total": null})).unwrap().is_empty());
    }

    #[test]
    fn error_body_is_preferred() {
        assert_eq!(error_message(r#"{"error":"invalid address"}"#).as_deref(), Some("invalid address"));
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn trims_trailing_slash() {
        let client = LcdClient::new("http://localhost:1317/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1317");
    }
}

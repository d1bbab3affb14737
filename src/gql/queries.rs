//! Query builders and result extractors.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::{schema_prefix, Network, NetworkCapabilities, Validator};
use crate::error::GqlError;

const VALIDATOR_FRAGMENT: &str = "
    avatarUrl
    consensus_pubkey
    customized
    delegator_shares
    details
    id
    identity
    jailed
    keybaseId
    lastUpdated
    max_change_rate
    max_rate
    min_self_delegation
    moniker
    operator_address
    profileUrl
    rate
    status
    tokens
    unbonding_height
    unbonding_time
    update_time
    uptime_percentage
    userName
    voting_power
    website
";

const CAPABILITY_FIELDS: &str = "
    action_delegate
    action_proposal
    action_deposit
    action_vote
    action_redelegate
    action_send
    action_undelegate
    action_withdraw
";

/// A query document plus its variables, ready to post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GqlQuery {
    pub query: String,
    pub variables: Value,
}

impl GqlQuery {
    fn new(query: String, variables: Value) -> Self {
        Self { query, variables }
    }
}

fn validators_key(network: &str) -> Result<String, GqlError> {
    Ok(format!("{}allValidators", schema_prefix(network)?))
}

pub fn all_validators(network: &str) -> Result<GqlQuery, GqlError> {
    let key = validators_key(network)?;
    Ok(GqlQuery::new(
        format!("query AllValidators {{\n  {key} {{{VALIDATOR_FRAGMENT}  }}\n}}"),
        json!({}),
    ))
}

pub fn validator_profile(network: &str, address: &str) -> Result<GqlQuery, GqlError> {
    let key = validators_key(network)?;
    Ok(GqlQuery::new(
        format!(
            "query ValidatorInfo($address: String) {{\n  {key}(where: {{ operator_address: {{ _eq: $address }} }}) {{{VALIDATOR_FRAGMENT}  }}\n}}"
        ),
        json!({ "address": address }),
    ))
}

pub fn some_validators(network: &str, addresses: &[String]) -> Result<GqlQuery, GqlError> {
    let key = validators_key(network)?;
    Ok(GqlQuery::new(
        format!(
            "query ValidatorInfo($addressList: [String!]) {{\n  {key}(where: {{ operator_address: {{ _in: $addressList }} }}) {{{VALIDATOR_FRAGMENT}  }}\n}}"
        ),
        json!({ "addressList": addresses }),
    ))
}

pub fn networks() -> GqlQuery {
    GqlQuery::new(
        "query Networks {\n  networks {\n    id\n    chain_id\n    logo_url\n    testnet\n    title\n    rpc_url\n  }\n}".into(),
        json!({}),
    )
}

pub fn network_capabilities(network_id: &str) -> GqlQuery {
    GqlQuery::new(
        format!("query Networks($id: String) {{\n  networks(where: {{id: {{_eq: $id}}}}) {{{CAPABILITY_FIELDS}  }}\n}}"),
        json!({ "id": network_id }),
    )
}

/// `capability` is a column name such as `action_send` or `feature_portfolio`.
/// It lands in the document itself, so only `[a-z0-9_]` is accepted.
pub fn network_capability(network_id: &str, capability: &str) -> Result<GqlQuery, GqlError> {
    let valid = !capability.is_empty()
        && capability.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if !valid {
        return Err(GqlError::Query(format!("invalid capability name '{capability}'")));
    }
    Ok(GqlQuery::new(
        format!(
            "query Networks($id: String) {{\n  networks(where: {{id: {{_eq: $id}}, {capability}: {{_eq: true}}}}) {{\n    id\n  }}\n}}"
        ),
        json!({ "id": network_id }),
    ))
}

fn rows<T: DeserializeOwned>(data: &Value, key: &str) -> Result<Vec<T>, GqlError> {
    let rows = data.get(key).ok_or_else(|| GqlError::MissingResult(key.to_string()))?;
    serde_json::from_value(rows.clone()).map_err(|e| GqlError::Decode(format!("{key}: {e}")))
}

pub fn all_validators_result(network: &str, data: &Value) -> Result<Vec<Validator>, GqlError> {
    rows(data, &validators_key(network)?)
}

pub fn validator_result(network: &str, data: &Value) -> Result<Option<Validator>, GqlError> {
    Ok(all_validators_result(network, data)?.into_iter().next())
}

pub fn networks_result(data: &Value) -> Result<Vec<Network>, GqlError> {
    rows(data, "networks")
}

pub fn network_capabilities_result(data: &Value) -> Result<Option<NetworkCapabilities>, GqlError> {
    Ok(rows::<NetworkCapabilities>(data, "networks")?.into_iter().next())
}

/// The filtered query returns exactly one row when the capability is on.
pub fn network_capability_result(data: &Value) -> Result<bool, GqlError> {
    let rows = data
        .get("networks")
        .and_then(Value::as_array)
        .ok_or_else(|| GqlError::MissingResult("networks".into()))?;
    Ok(rows.len() == 1)
}

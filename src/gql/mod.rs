//! GraphQL query surface - validators and network metadata
//!
//! Networks share one GraphQL endpoint but each chain's tables carry a
//! schema prefix. Every query and result lookup resolves the top-level key
//! through [`schema_prefix`].
//!
//! | Network | Prefix | Validators key |
//! |---------|--------|----------------|
//! | `cosmoshub` | (none) | `allValidators` |
//! | `gaia-testnet` | `gaia_testnet_` | `gaia_testnet_allValidators` |

#[cfg(feature = "http")]
mod client;
pub mod queries;

#[cfg(feature = "http")]
pub use client::GraphqlClient;
pub use queries::GqlQuery;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::GqlError;

const SCHEMA_MAP: &[(&str, &str)] = &[("cosmoshub", ""), ("gaia-testnet", "gaia_testnet_")];

pub fn schema_prefix(network: &str) -> Result<&'static str, GqlError> {
    SCHEMA_MAP
        .iter()
        .find(|(id, _)| *id == network)
        .map(|(_, prefix)| *prefix)
        .ok_or_else(|| GqlError::UnknownNetwork(network.to_string()))
}

pub fn known_networks() -> impl Iterator<Item = &'static str> {
    SCHEMA_MAP.iter().map(|(id, _)| *id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub testnet: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rpc_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkCapabilities {
    pub action_delegate: bool,
    pub action_proposal: bool,
    pub action_deposit: bool,
    pub action_vote: bool,
    pub action_redelegate: bool,
    pub action_send: bool,
    pub action_undelegate: bool,
    pub action_withdraw: bool,
}

/// Validator row. Numeric columns arrive as strings or numbers depending on
/// the indexer, so they stay raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    #[serde(default)]
    pub moniker: Option<String>,
    #[serde(default)]
    pub consensus_pubkey: Option<String>,
    #[serde(default)]
    pub jailed: Option<bool>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub tokens: Option<Value>,
    #[serde(default)]
    pub voting_power: Option<Value>,
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub uptime_percentage: Option<Value>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, rename = "keybaseId")]
    pub keybase_id: Option<String>,
    #[serde(default, rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    /// Remaining fragment columns.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table() {
        assert_eq!(schema_prefix("cosmoshub").unwrap(), "");
        assert_eq!(schema_prefix("gaia-testnet").unwrap(), "gaia_testnet_");
        assert!(schema_prefix("kava").is_err());
        assert_eq!(known_networks().count(), 2);
    }

    #[test]
    fn capabilities_default_to_off() {
        let caps: NetworkCapabilities =
            serde_json::from_value(serde_json::json!({"action_send": true})).unwrap();
        assert!(caps.action_send);
        assert!(!caps.action_vote);
    }
}

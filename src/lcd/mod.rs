//! Node facade - the chain reads every sync module depends on
//!
//! ```text
//! Synchronizer ──► NodeFacade (trait)
//!                      │
//!                      ├── LcdClient      (REST, feature "http")
//!                      └── test doubles   (tests/common)
//! ```
//!
//! All records mirror the LCD JSON shapes. Fields the client never reads
//! default when absent so older and newer node versions both decode.

#[cfg(feature = "http")]
mod client;

#[cfg(feature = "http")]
pub use client::LcdClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::amount::Coin;
use crate::error::NodeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    #[serde(default)]
    pub delegator_address: String,
    pub validator_address: String,
    pub shares: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnbondingEntry {
    #[serde(default)]
    pub creation_height: String,
    #[serde(default)]
    pub completion_time: String,
    #[serde(default)]
    pub initial_balance: String,
    #[serde(default)]
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbondingDelegation {
    #[serde(default)]
    pub delegator_address: String,
    pub validator_address: String,
    #[serde(default)]
    pub entries: Vec<UnbondingEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RedelegationEntry {
    #[serde(default)]
    pub creation_height: String,
    #[serde(default)]
    pub completion_time: String,
    #[serde(default)]
    pub initial_balance: String,
    #[serde(default)]
    pub shares_dst: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redelegation {
    #[serde(default)]
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
    #[serde(default)]
    pub entries: Vec<RedelegationEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DistributionParameters {
    #[serde(default)]
    pub community_tax: String,
    #[serde(default)]
    pub base_proposer_reward: String,
    #[serde(default)]
    pub bonus_proposer_reward: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdraw_addr_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MintingParameters {
    #[serde(default)]
    pub mint_denom: String,
    #[serde(default)]
    pub inflation_rate_change: String,
    #[serde(default)]
    pub inflation_max: String,
    #[serde(default)]
    pub inflation_min: String,
    #[serde(default)]
    pub goal_bonded: String,
    /// String on some node versions, number on others.
    #[serde(default)]
    pub blocks_per_year: serde_json::Value,
}

/// Read access to the chain. Failures carry the node's error message.
#[async_trait]
pub trait NodeFacade: Send + Sync {
    async fn latest_height(&self) -> Result<u64, NodeError>;

    async fn delegations(&self, address: &str) -> Result<Vec<Delegation>, NodeError>;
    async fn undelegations(&self, address: &str) -> Result<Vec<UnbondingDelegation>, NodeError>;
    async fn redelegations(&self, address: &str) -> Result<Vec<Redelegation>, NodeError>;

    async fn delegator_rewards(&self, address: &str) -> Result<Vec<Coin>, NodeError>;
    async fn delegator_rewards_from_validator(
        &self,
        address: &str,
        validator: &str,
    ) -> Result<Vec<Coin>, NodeError>;
    async fn distribution_parameters(&self) -> Result<DistributionParameters, NodeError>;
    async fn distribution_outstanding_rewards(&self) -> Result<Vec<Coin>, NodeError>;

    async fn minting_parameters(&self) -> Result<MintingParameters, NodeError>;
    async fn minting_inflation(&self) -> Result<String, NodeError>;
    async fn minting_annual_provisions(&self) -> Result<String, NodeError>;
}

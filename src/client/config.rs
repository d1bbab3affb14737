//! Client Configuration - built by the embedding application or from env

use std::time::Duration;

use crate::bridge::BridgeConfig;
use crate::core::kinds::threshold;
use crate::error::ClientError;
use crate::sync::{DelegationModule, DistributionModule, MintingModule, ModuleSet};

pub const DEFAULT_NETWORK: &str = "cosmoshub";
pub const DEFAULT_LCD_URL: &str = "http://localhost:1317";
pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:8080/v1/graphql";
pub const DEFAULT_DENOM: &str = "uatom";

/// Block intervals between refreshes, per module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub delegation: u64,
    pub distribution: u64,
    pub minting: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            delegation: threshold::DELEGATION,
            distribution: threshold::VALIDATOR_REWARDS,
            minting: threshold::MINTING,
        }
    }
}

impl Thresholds {
    pub fn modules(&self) -> ModuleSet {
        ModuleSet {
            delegation: DelegationModule::new(self.delegation),
            distribution: DistributionModule::new(self.distribution),
            minting: MintingModule::new(self.minting),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub network: String,
    pub lcd_url: String,
    /// No GraphQL endpoint means no validator or network metadata.
    pub graphql_url: Option<String>,
    pub denom: String,
    pub thresholds: Thresholds,
    pub bridge: BridgeConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.into(),
            lcd_url: DEFAULT_LCD_URL.into(),
            graphql_url: Some(DEFAULT_GRAPHQL_URL.into()),
            denom: DEFAULT_DENOM.into(),
            thresholds: Thresholds::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(network: impl Into<String>) -> Self {
        Self { network: network.into(), ..Default::default() }
    }
    pub fn with_lcd_url(mut self, url: impl Into<String>) -> Self { self.lcd_url = url.into(); self }
    pub fn with_graphql_url(mut self, url: Option<String>) -> Self { self.graphql_url = url; self }
    pub fn with_denom(mut self, denom: impl Into<String>) -> Self { self.denom = denom.into(); self }
    pub fn with_thresholds(mut self, t: Thresholds) -> Self { self.thresholds = t; self }
    pub fn with_bridge_timeout(mut self, t: Option<Duration>) -> Self { self.bridge = self.bridge.with_timeout(t); self }

    /// Defaults overridden by `LUNIE_*` variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `from_env` with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = Self::new(get("LUNIE_NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.into()));
        if let Some(url) = get("LUNIE_LCD_URL") {
            config = config.with_lcd_url(url);
        }
        if let Some(url) = get("LUNIE_GRAPHQL_URL") {
            // "none" switches the GraphQL surface off
            config = config.with_graphql_url((url != "none").then_some(url));
        }
        if let Some(denom) = get("LUNIE_DENOM") {
            config = config.with_denom(denom);
        }
        if let Some(secs) = get("LUNIE_BRIDGE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ClientError::Config(format!("LUNIE_BRIDGE_TIMEOUT_SECS: '{secs}' is not a number")))?;
            // 0 waits forever
            let timeout = (secs > 0).then(|| Duration::from_secs(secs));
            config = config.with_bridge_timeout(timeout);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DEFAULT_REQUEST_TIMEOUT;
    use crate::sync::SyncModule;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.network, "cosmoshub");
        assert_eq!(config.denom, "uatom");
        assert_eq!(config.bridge.request_timeout, Some(DEFAULT_REQUEST_TIMEOUT));
        assert_eq!(config.thresholds, Thresholds { delegation: 5, distribution: 20, minting: 20 });
    }

    #[test]
    fn env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("LUNIE_NETWORK", "gaia-testnet"),
            ("LUNIE_LCD_URL", "http://lcd:1317"),
            ("LUNIE_GRAPHQL_URL", "none"),
            ("LUNIE_DENOM", "stake"),
            ("LUNIE_BRIDGE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.network, "gaia-testnet");
        assert_eq!(config.lcd_url, "http://lcd:1317");
        assert_eq!(config.graphql_url, None);
        assert_eq!(config.denom, "stake");
        assert_eq!(config.bridge.request_timeout, None);
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[("LUNIE_BRIDGE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn thresholds_build_modules() {
        let modules = Thresholds { delegation: 1, distribution: 2, minting: 3 }.modules();
        assert_eq!(modules.delegation.throttle().threshold(), 1);
        assert_eq!(modules.distribution.throttle().threshold(), 2);
        assert_eq!(modules.minting.throttle().threshold(), 3);
    }
}

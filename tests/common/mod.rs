//! Shared test doubles: a scripted node and a scripted extension.

#![allow(dead_code)]

use async_trait::async_trait;
use lunie_client::bridge::{parse_bus_message, BusMessage, ExtensionMessage, MessageBus, PageRequest};
use lunie_client::core::amount::Coin;
use lunie_client::lcd::{
    Delegation, DistributionParameters, MintingParameters, NodeFacade, Redelegation,
    UnbondingDelegation, UnbondingEntry,
};
use lunie_client::NodeError;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub const DELEGATOR: &str = "cosmos1delegator";

pub fn delegation(validator: &str, shares: &str) -> Delegation {
    Delegation {
        delegator_address: DELEGATOR.into(),
        validator_address: validator.into(),
        shares: shares.into(),
    }
}

pub fn unbonding(validator: &str, balances: &[&str]) -> UnbondingDelegation {
    UnbondingDelegation {
        delegator_address: DELEGATOR.into(),
        validator_address: validator.into(),
        entries: balances
            .iter()
            .map(|b| UnbondingEntry { balance: b.to_string(), ..Default::default() })
            .collect(),
    }
}

#[derive(Default)]
struct Script {
    height: u64,
    delegations: Vec<Delegation>,
    unbonding: Vec<UnbondingDelegation>,
    redelegations: Vec<Redelegation>,
    total_rewards: Vec<Coin>,
    validator_rewards: HashMap<String, Vec<Coin>>,
    inflation: String,
    annual_provisions: String,
    failure: Option<NodeError>,
    offline: bool,
    /// Per method: each call pops one gate and waits on it.
    gates: HashMap<&'static str, VecDeque<Arc<Notify>>>,
    calls: HashMap<&'static str, usize>,
}

/// Node facade answering from a mutable script and counting calls.
#[derive(Clone, Default)]
pub struct MockNode {
    script: Arc<Mutex<Script>>,
}

impl MockNode {
    pub fn new() -> Self {
        let node = Self::default();
        node.with(|s| {
            s.inflation = "0.07".into();
            s.annual_provisions = "1000.5".into();
        });
        node
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        f(&mut self.script.lock().unwrap_or_else(|p| p.into_inner()))
    }

    fn record(&self, method: &'static str) -> Result<(), NodeError> {
        self.with(|s| {
            *s.calls.entry(method).or_default() += 1;
            match &s.failure {
                Some(error) if method != "latest_height" => Err(error.clone()),
                _ => Ok(()),
            }
        })
    }

    pub fn set_height(&self, height: u64) {
        self.with(|s| s.height = height);
    }

    pub fn set_delegations(&self, delegations: Vec<Delegation>) {
        self.with(|s| s.delegations = delegations);
    }

    pub fn set_unbonding(&self, unbonding: Vec<UnbondingDelegation>) {
        self.with(|s| s.unbonding = unbonding);
    }

    pub fn set_total_rewards(&self, coins: Vec<Coin>) {
        self.with(|s| s.total_rewards = coins);
    }

    pub fn set_validator_rewards(&self, validator: &str, coins: Vec<Coin>) {
        self.with(|s| s.validator_rewards.insert(validator.to_string(), coins));
    }

    pub fn fail_with(&self, error: Option<NodeError>) {
        self.with(|s| s.failure = error);
    }

    pub fn set_offline(&self, offline: bool) {
        self.with(|s| s.offline = offline);
    }

    pub fn set_inflation(&self, inflation: &str) {
        self.with(|s| s.inflation = inflation.to_string());
    }

    /// The next `method` call blocks until the returned handle is notified.
    /// Its answer is fixed when the call is made.
    pub fn hold_next(&self, method: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.with(|s| s.gates.entry(method).or_default().push_back(gate.clone()));
        gate
    }

    async fn pass_gate(&self, method: &'static str) {
        let gate = self.with(|s| s.gates.get_mut(method).and_then(VecDeque::pop_front));
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    pub fn calls(&self, method: &str) -> usize {
        self.with(|s| s.calls.get(method).copied().unwrap_or(0))
    }

    pub fn total_calls(&self) -> usize {
        self.with(|s| s.calls.iter().filter(|(m, _)| **m != "latest_height").map(|(_, n)| n).sum())
    }

    pub fn reset_calls(&self) {
        self.with(|s| s.calls.clear());
    }
}

#[async_trait]
impl NodeFacade for MockNode {
    async fn latest_height(&self) -> Result<u64, NodeError> {
        self.record("latest_height")?;
        self.with(|s| {
            if s.offline {
                Err(NodeError::Request("connection refused".into()))
            } else {
                Ok(s.height)
            }
        })
    }

    async fn delegations(&self, _address: &str) -> Result<Vec<Delegation>, NodeError> {
        self.record("delegations")?;
        let answer = self.with(|s| s.delegations.clone());
        self.pass_gate("delegations").await;
        Ok(answer)
    }

    async fn undelegations(&self, _address: &str) -> Result<Vec<UnbondingDelegation>, NodeError> {
        self.record("undelegations")?;
        Ok(self.with(|s| s.unbonding.clone()))
    }

    async fn redelegations(&self, _address: &str) -> Result<Vec<Redelegation>, NodeError> {
        self.record("redelegations")?;
        Ok(self.with(|s| s.redelegations.clone()))
    }

    async fn delegator_rewards(&self, _address: &str) -> Result<Vec<Coin>, NodeError> {
        self.record("delegator_rewards")?;
        Ok(self.with(|s| s.total_rewards.clone()))
    }

    async fn delegator_rewards_from_validator(
        &self,
        _address: &str,
        validator: &str,
    ) -> Result<Vec<Coin>, NodeError> {
        self.record("delegator_rewards_from_validator")?;
        Ok(self.with(|s| s.validator_rewards.get(validator).cloned().unwrap_or_default()))
    }

    async fn distribution_parameters(&self) -> Result<DistributionParameters, NodeError> {
        self.record("distribution_parameters")?;
        Ok(DistributionParameters { community_tax: "0.02".into(), ..Default::default() })
    }

    async fn distribution_outstanding_rewards(&self) -> Result<Vec<Coin>, NodeError> {
        self.record("distribution_outstanding_rewards")?;
        Ok(vec![Coin::new("stake", "100")])
    }

    async fn minting_parameters(&self) -> Result<MintingParameters, NodeError> {
        self.record("minting_parameters")?;
        Ok(MintingParameters { mint_denom: "stake".into(), ..Default::default() })
    }

    async fn minting_inflation(&self) -> Result<String, NodeError> {
        self.record("minting_inflation")?;
        let answer = self.with(|s| s.inflation.clone());
        self.pass_gate("minting_inflation").await;
        Ok(answer)
    }

    async fn minting_annual_provisions(&self) -> Result<String, NodeError> {
        self.record("minting_annual_provisions")?;
        Ok(self.with(|s| s.annual_provisions.clone()))
    }
}

/// Fake extension attached to `bus`. Every page request is handed to
/// `respond`; whatever it returns is posted back as the extension's answer.
/// Subscribes before returning, so no request can be missed.
pub fn spawn_extension<F>(bus: &MessageBus, mut respond: F) -> JoinHandle<usize>
where
    F: FnMut(PageRequest) -> Option<ExtensionMessage> + Send + 'static,
{
    let mut receiver = bus.subscribe();
    let bus = bus.clone();
    tokio::spawn(async move {
        let mut seen = 0;
        while let Ok(value) = receiver.recv().await {
            let Some(BusMessage::FromPage { payload, .. }) = parse_bus_message(&value) else {
                continue;
            };
            seen += 1;
            if let Some(answer) = respond(payload) {
                bus.post(BusMessage::from_extension(answer).to_value());
            }
        }
        seen
    })
}

/// Yield to spawned tasks until `done` holds.
pub async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

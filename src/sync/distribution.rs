//! Distribution module - rewards owed to the delegator, per validator and in total.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::BTreeMap;

use super::module::SyncModule;
use super::throttle::HeightThrottle;
use crate::core::amount::coins_to_map;
use crate::core::kinds::{module, threshold};
use crate::error::NodeError;
use crate::lcd::{DistributionParameters, NodeFacade};
use crate::store::{AppState, DenomAmounts, SyncStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct RewardsSnapshot {
    pub total_rewards: DenomAmounts,
    pub rewards: BTreeMap<String, DenomAmounts>,
    pub parameters: DistributionParameters,
    pub outstanding_rewards: DenomAmounts,
}

#[derive(Debug, Clone, Copy)]
pub struct DistributionModule {
    throttle: HeightThrottle,
}

impl Default for DistributionModule {
    fn default() -> Self {
        Self::new(threshold::VALIDATOR_REWARDS)
    }
}

impl DistributionModule {
    pub fn new(threshold: u64) -> Self {
        Self { throttle: HeightThrottle::new(threshold) }
    }
}

#[async_trait]
impl SyncModule for DistributionModule {
    /// Validators the session currently has committed delegations with.
    type Input = Vec<String>;
    type Snapshot = RewardsSnapshot;

    fn name(&self) -> &'static str {
        module::DISTRIBUTION
    }

    fn throttle(&self) -> HeightThrottle {
        self.throttle
    }

    fn error_title(&self) -> &'static str {
        "Error fetching rewards"
    }

    fn status<'a>(&self, state: &'a mut AppState) -> &'a mut SyncStatus {
        &mut state.distribution.status
    }

    fn input(&self, state: &AppState) -> Vec<String> {
        state.delegation.committed_delegates.keys().cloned().collect()
    }

    async fn fetch(
        &self,
        node: &dyn NodeFacade,
        address: Option<&str>,
        validators: Vec<String>,
    ) -> Result<RewardsSnapshot, NodeError> {
        let address = address.ok_or_else(|| NodeError::Other("no address".into()))?;
        let per_validator = try_join_all(validators.iter().map(|validator| async move {
            let coins = node.delegator_rewards_from_validator(address, validator).await?;
            Ok::<_, NodeError>((validator.clone(), coins_to_map(&coins)?))
        }));
        let (total, rewards, parameters, outstanding) = tokio::try_join!(
            node.delegator_rewards(address),
            per_validator,
            node.distribution_parameters(),
            node.distribution_outstanding_rewards(),
        )?;
        Ok(RewardsSnapshot {
            total_rewards: coins_to_map(&total)?,
            rewards: rewards.into_iter().collect(),
            parameters,
            outstanding_rewards: coins_to_map(&outstanding)?,
        })
    }

    fn apply(&self, state: &mut AppState, snapshot: RewardsSnapshot) {
        let distribution = &mut state.distribution;
        distribution.set_total_rewards(snapshot.total_rewards);
        distribution.rewards.clear();
        for (validator, rewards) in snapshot.rewards {
            distribution.set_delegation_rewards(&validator, rewards);
        }
        distribution.set_distribution_parameters(snapshot.parameters);
        distribution.set_outstanding_rewards(snapshot.outstanding_rewards);
    }
}

//! Delegation module - committed delegations, unbondings and redelegations.

use async_trait::async_trait;

use super::module::SyncModule;
use super::reconcile::reconcile_commitments;
use super::throttle::HeightThrottle;
use crate::core::amount::parse_amount;
use crate::core::kinds::{module, threshold};
use crate::error::NodeError;
use crate::lcd::{NodeFacade, Redelegation, UnbondingDelegation};
use crate::store::{AppState, SyncStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct DelegatorSnapshot {
    /// validator → shares, as reported by the node.
    pub delegations: Vec<(String, f64)>,
    pub unbonding: Vec<UnbondingDelegation>,
    pub redelegations: Vec<Redelegation>,
}

#[derive(Debug, Clone, Copy)]
pub struct DelegationModule {
    throttle: HeightThrottle,
}

impl Default for DelegationModule {
    fn default() -> Self {
        Self::new(threshold::DELEGATION)
    }
}

impl DelegationModule {
    pub fn new(threshold: u64) -> Self {
        Self { throttle: HeightThrottle::new(threshold) }
    }
}

#[async_trait]
impl SyncModule for DelegationModule {
    type Input = ();
    type Snapshot = DelegatorSnapshot;

    fn name(&self) -> &'static str {
        module::DELEGATION
    }

    fn throttle(&self) -> HeightThrottle {
        self.throttle
    }

    fn error_title(&self) -> &'static str {
        "Error fetching delegations"
    }

    fn status<'a>(&self, state: &'a mut AppState) -> &'a mut SyncStatus {
        &mut state.delegation.status
    }

    fn input(&self, _state: &AppState) -> Self::Input {}

    async fn fetch(
        &self,
        node: &dyn NodeFacade,
        address: Option<&str>,
        _input: (),
    ) -> Result<DelegatorSnapshot, NodeError> {
        let address = address.ok_or_else(|| NodeError::Other("no address".into()))?;
        let (delegations, unbonding, redelegations) = tokio::try_join!(
            node.delegations(address),
            node.undelegations(address),
            node.redelegations(address),
        )?;
        let delegations = delegations
            .into_iter()
            .map(|d| Ok((d.validator_address, parse_amount(&d.shares)?)))
            .collect::<Result<Vec<_>, NodeError>>()?;
        Ok(DelegatorSnapshot { delegations, unbonding, redelegations })
    }

    fn apply(&self, state: &mut AppState, snapshot: DelegatorSnapshot) {
        let delegation = &mut state.delegation;
        reconcile_commitments(&mut delegation.committed_delegates, &snapshot.delegations);
        delegation.set_unbonding_delegations(Some(snapshot.unbonding));
        delegation.redelegations = snapshot.redelegations;
    }
}

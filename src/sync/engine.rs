//! Synchronizer - runs module cycles against one node facade and one store.

use std::sync::Arc;

use super::delegation::DelegationModule;
use super::distribution::DistributionModule;
use super::minting::MintingModule;
use super::module::{SyncModule, SyncOutcome};
use crate::error::NodeError;
use crate::lcd::NodeFacade;
use crate::store::Store;

/// The module instances a synchronizer drives, with their thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleSet {
    pub delegation: DelegationModule,
    pub distribution: DistributionModule,
    pub minting: MintingModule,
}

/// Outcome per module of one sweep, in run order.
pub type SweepReport = Vec<(&'static str, SyncOutcome)>;

#[derive(Clone)]
pub struct Synchronizer {
    store: Store,
    node: Arc<dyn NodeFacade>,
    modules: ModuleSet,
}

impl Synchronizer {
    pub fn new(store: Store, node: Arc<dyn NodeFacade>) -> Self {
        Self { store, node, modules: ModuleSet::default() }
    }

    pub fn with_modules(mut self, modules: ModuleSet) -> Self {
        self.modules = modules;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn node(&self) -> &Arc<dyn NodeFacade> {
        &self.node
    }

    pub fn modules(&self) -> &ModuleSet {
        &self.modules
    }

    /// Run one cycle of `module`: throttle, fetch, re-validate, apply.
    pub async fn run<M: SyncModule>(&self, module: &M, force: bool) -> SyncOutcome {
        let (seq, network_epoch, identity, input) = {
            let mut state = self.store.write().await;
            let network_epoch = state.network.epoch;
            let identity = state.session.identity();
            if module.requires_session() && identity.is_none() {
                return SyncOutcome::NoSession;
            }
            let height = state.connection.last_header_height;
            let connected = state.connection.connected;
            let status = module.status(&mut state);
            if !module.throttle().admit(&mut status.last_update_height, height, force) {
                tracing::trace!(module = module.name(), height, "throttled");
                return SyncOutcome::Throttled;
            }
            let seq = status.begin_cycle();
            if !connected {
                tracing::debug!(module = module.name(), "node offline, deferring");
                return SyncOutcome::Deferred;
            }
            (seq, network_epoch, identity, module.input(&state))
        };

        let address = identity.as_ref().map(|id| id.address.as_str());
        let result = module.fetch(self.node.as_ref(), address, input).await;

        let mut state = self.store.write().await;
        if state.network.epoch != network_epoch {
            tracing::debug!(module = module.name(), "network switched, dropping response");
            return SyncOutcome::Discarded;
        }
        if let Some(identity) = &identity {
            if !state.session.is_current(identity) {
                tracing::debug!(module = module.name(), address = %identity.address, "session changed, dropping response");
                return SyncOutcome::Discarded;
            }
        }
        if !module.status(&mut state).accept(seq) {
            tracing::debug!(module = module.name(), seq, "newer cycle already applied, dropping response");
            return SyncOutcome::Discarded;
        }

        match result {
            Ok(snapshot) => {
                module.apply(&mut state, snapshot);
                module.status(&mut state).succeed();
                tracing::debug!(module = module.name(), seq, "applied");
                SyncOutcome::Applied
            }
            Err(error) => {
                tracing::error!(module = module.name(), %error, "sync failed");
                module.status(&mut state).fail(error.to_string());
                state.notify_error(module.error_title(), error.to_string());
                SyncOutcome::Failed(error)
            }
        }
    }

    /// Re-run `module` if a previous cycle was left pending and someone is signed in.
    pub async fn resume<M: SyncModule>(&self, module: &M) -> Option<SyncOutcome> {
        let pending = {
            let mut state = self.store.write().await;
            let signed_in = state.session.signed_in;
            signed_in && module.status(&mut state).loading
        };
        if pending {
            Some(self.run(module, true).await)
        } else {
            None
        }
    }

    /// Every module once. Delegations go first: rewards are fetched for the
    /// validators they report.
    pub async fn update_all(&self, force: bool) -> SweepReport {
        let modules = self.modules;
        let delegation = self.run(&modules.delegation, force).await;
        let (distribution, minting) = tokio::join!(
            self.run(&modules.distribution, force),
            self.run(&modules.minting, force),
        );
        vec![
            (modules.delegation.name(), delegation),
            (modules.distribution.name(), distribution),
            (modules.minting.name(), minting),
        ]
    }

    /// Session start: everything, ignoring throttles.
    pub async fn initialize_wallet(&self) -> SweepReport {
        self.update_all(true).await
    }

    /// Connection is back: finish whatever was left loading.
    pub async fn reconnected(&self) -> SweepReport {
        self.store.update(|state| state.set_connected(true)).await;
        let modules = self.modules;
        let mut report = Vec::new();
        if let Some(outcome) = self.resume(&modules.delegation).await {
            report.push((modules.delegation.name(), outcome));
        }
        if let Some(outcome) = self.resume(&modules.distribution).await {
            report.push((modules.distribution.name(), outcome));
        }
        if let Some(outcome) = self.resume(&modules.minting).await {
            report.push((modules.minting.name(), outcome));
        }
        report
    }

    /// A new header arrived: record it and let the throttles decide.
    pub async fn new_height(&self, height: u64) -> SweepReport {
        self.store
            .update(|state| {
                state.set_connected(true);
                state.set_last_header_height(height);
            })
            .await;
        self.update_all(false).await
    }

    /// Ask the node for its head and sweep. A failed height query marks the
    /// connection down so later cycles defer until `reconnected`.
    pub async fn poll(&self) -> Result<(u64, SweepReport), NodeError> {
        match self.node.latest_height().await {
            Ok(height) => {
                let was_connected = self.store.read().await.connection.connected;
                let mut report = Vec::new();
                if !was_connected {
                    // Resumed cycles run at the fresh height so the sweep below is throttled.
                    self.store.update(|state| state.set_last_header_height(height)).await;
                    report.extend(self.reconnected().await);
                }
                report.extend(self.new_height(height).await);
                Ok((height, report))
            }
            Err(error) => {
                tracing::warn!(%error, "node unreachable");
                self.store.update(|state| state.set_connected(false)).await;
                Err(error)
            }
        }
    }
}

//! Application state: one slice per module, mutations as methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gql::Network;
use crate::lcd::{
    DistributionParameters, MintingParameters, Redelegation, UnbondingDelegation, UnbondingEntry,
};
use crate::sync::reconcile;

/// Notifications kept for display; older ones are dropped first.
const MAX_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningMethod {
    #[default]
    Extension,
    Ledger,
    Local,
}

impl SigningMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningMethod::Extension => "extension",
            SigningMethod::Ledger => "ledger",
            SigningMethod::Local => "local",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "extension" => Some(SigningMethod::Extension),
            "ledger" => Some(SigningMethod::Ledger),
            "local" | "keystore" => Some(SigningMethod::Local),
            _ => None,
        }
    }
}

/// Who the in-flight requests were issued for. The epoch changes on every
/// sign-in/out, so signing back in with the same address still invalidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub address: String,
    pub epoch: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub signed_in: bool,
    pub address: Option<String>,
    pub signing_method: SigningMethod,
    #[serde(skip)]
    pub epoch: u64,
}

impl SessionState {
    pub fn identity(&self) -> Option<SessionIdentity> {
        match (&self.address, self.signed_in) {
            (Some(address), true) => Some(SessionIdentity { address: address.clone(), epoch: self.epoch }),
            _ => None,
        }
    }

    pub fn is_current(&self, identity: &SessionIdentity) -> bool {
        self.identity().as_ref() == Some(identity)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionState {
    pub connected: bool,
    pub last_header_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionWallet {
    #[serde(default)]
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtensionState {
    pub enabled: bool,
    pub wallets: Vec<ExtensionWallet>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkState {
    pub current: Option<String>,
    pub networks: Vec<Network>,
    /// Bumped on every switch; responses issued under an older epoch are dropped.
    #[serde(skip)]
    pub epoch: u64,
}

/// Request-cycle bookkeeping shared by every sync module.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    pub loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
    pub last_update_height: u64,
    #[serde(skip)]
    issued: u64,
    #[serde(skip)]
    applied: u64,
}

impl SyncStatus {
    /// Marks the module loading and returns the cycle's sequence number.
    pub fn begin_cycle(&mut self) -> u64 {
        self.loading = true;
        self.issued += 1;
        self.issued
    }

    /// False when a later-issued cycle already landed.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq < self.applied {
            return false;
        }
        self.applied = seq;
        true
    }

    pub fn succeed(&mut self) {
        self.loading = false;
        self.loaded = true;
        self.error = None;
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.loading = false;
        self.error = Some(error.into());
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DelegationState {
    pub status: SyncStatus,
    /// validator → committed shares; never holds a zero.
    pub committed_delegates: BTreeMap<String, f64>,
    /// validator → pending unbonding entries; never holds an empty list.
    pub unbonding_delegations: BTreeMap<String, Vec<UnbondingEntry>>,
    pub redelegations: Vec<Redelegation>,
}

impl DelegationState {
    pub fn set_committed_delegation(&mut self, validator: &str, value: f64) {
        reconcile::set_committed(&mut self.committed_delegates, validator, value);
    }

    pub fn set_unbonding_delegations(&mut self, unbonding: Option<Vec<UnbondingDelegation>>) {
        self.unbonding_delegations = reconcile::unbonding_map(unbonding.unwrap_or_default());
    }
}

pub type DenomAmounts = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionState {
    pub status: SyncStatus,
    pub total_rewards: DenomAmounts,
    /// validator → rewards owed by that validator.
    pub rewards: BTreeMap<String, DenomAmounts>,
    pub parameters: Option<DistributionParameters>,
    pub outstanding_rewards: DenomAmounts,
}

impl DistributionState {
    pub fn set_total_rewards(&mut self, rewards: DenomAmounts) {
        self.total_rewards = rewards;
    }

    pub fn set_delegation_rewards(&mut self, validator: &str, rewards: DenomAmounts) {
        self.rewards.insert(validator.to_string(), rewards);
    }

    pub fn set_distribution_parameters(&mut self, parameters: DistributionParameters) {
        self.parameters = Some(parameters);
    }

    pub fn set_outstanding_rewards(&mut self, rewards: DenomAmounts) {
        self.outstanding_rewards = rewards;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MintingState {
    pub status: SyncStatus,
    pub parameters: Option<MintingParameters>,
    pub inflation: Option<f64>,
    pub annual_provisions: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub session: SessionState,
    pub connection: ConnectionState,
    pub extension: ExtensionState,
    pub network: NetworkState,
    pub delegation: DelegationState,
    pub distribution: DistributionState,
    pub minting: MintingState,
    pub notifications: Vec<Notification>,
}

impl AppState {
    pub fn sign_in(&mut self, address: impl Into<String>, method: SigningMethod) {
        self.reset_session_data();
        self.session.epoch += 1;
        self.session.signed_in = true;
        self.session.address = Some(address.into());
        self.session.signing_method = method;
    }

    pub fn sign_out(&mut self) {
        self.reset_session_data();
        self.session.epoch += 1;
        self.session.signed_in = false;
        self.session.address = None;
    }

    /// Back to the empty baseline for every per-session slice.
    pub fn reset_session_data(&mut self) {
        self.delegation = DelegationState::default();
        self.distribution = DistributionState::default();
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connection.connected = connected;
    }

    pub fn set_last_header_height(&mut self, height: u64) {
        self.connection.last_header_height = height;
    }

    pub fn set_extension_available(&mut self) {
        self.extension.enabled = true;
    }

    pub fn set_extension_wallets(&mut self, wallets: Vec<ExtensionWallet>) {
        self.extension.wallets = wallets;
    }

    pub fn set_networks(&mut self, networks: Vec<Network>) {
        self.network.networks = networks;
    }

    /// Switching chains invalidates everything fetched for the old one.
    pub fn switch_network(&mut self, network_id: impl Into<String>) {
        self.network.current = Some(network_id.into());
        self.reset_session_data();
        self.minting = MintingState::default();
        self.connection.last_header_height = 0;
        self.network.epoch += 1;
        self.session.epoch += 1;
    }

    pub fn notify_error(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.notifications.push(Notification { title: title.into(), body: body.into(), at: Utc::now() });
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }
}

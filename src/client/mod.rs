//! Client - the entry point tying store, bridge and sync together
//!
//! ```text
//! Client
//!   ├── Store            (AppState behind one RwLock)
//!   ├── ExtensionBridge  (MessageBus ⇄ browser extension)
//!   ├── Synchronizer     (sync modules ⇄ NodeFacade)
//!   └── GraphqlClient    (validators, networks; feature "http")
//! ```

mod config;

pub use config::{
    ClientConfig, Thresholds, DEFAULT_DENOM, DEFAULT_GRAPHQL_URL, DEFAULT_LCD_URL, DEFAULT_NETWORK,
};

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::bridge::{ExtensionBridge, MessageBus, SignedMessage};
use crate::error::{ClientError, ClientResult};
use crate::gql::schema_prefix;
use crate::lcd::NodeFacade;
use crate::session::{self, TxRequest, WithdrawOptions};
use crate::store::{AppState, SigningMethod, Store};
use crate::sync::{SweepReport, Synchronizer};

#[cfg(feature = "http")]
use crate::gql::{GraphqlClient, Network, Validator};
#[cfg(feature = "http")]
use crate::lcd::LcdClient;

#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    store: Store,
    bridge: ExtensionBridge,
    sync: Synchronizer,
    #[cfg(feature = "http")]
    graphql: Option<GraphqlClient>,
}

impl Client {
    /// Wire a client around any node facade and bus.
    pub fn new(config: ClientConfig, node: Arc<dyn NodeFacade>, bus: MessageBus) -> Self {
        let mut state = AppState::default();
        state.network.current = Some(config.network.clone());
        let store = Store::with_state(state);
        let sync = Synchronizer::new(store.clone(), node).with_modules(config.thresholds.modules());
        let bridge = ExtensionBridge::with_config(bus, config.bridge);
        Self {
            config,
            store,
            bridge,
            sync,
            #[cfg(feature = "http")]
            graphql: None,
        }
    }

    /// LCD and GraphQL over HTTP, fresh bus.
    #[cfg(feature = "http")]
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let node = Arc::new(LcdClient::new(config.lcd_url.clone())?);
        let graphql = config.graphql_url.clone().map(GraphqlClient::new).transpose()?;
        tracing::info!(network = %config.network, lcd = %config.lcd_url, "client configured");
        let mut client = Self::new(config, node, MessageBus::new());
        client.graphql = graphql;
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn bridge(&self) -> &ExtensionBridge {
        &self.bridge
    }

    pub fn bus(&self) -> &MessageBus {
        self.bridge.bus()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Start a session and load everything for it.
    pub async fn sign_in(&self, address: impl Into<String>, method: SigningMethod) -> SweepReport {
        let address = address.into();
        tracing::info!(%address, method = method.as_str(), "signing in");
        self.store.update(|state| state.sign_in(address, method)).await;
        self.sync.initialize_wallet().await
    }

    pub async fn sign_out(&self) {
        tracing::info!("signing out");
        self.store.update(|state| state.sign_out()).await;
    }

    /// Sign `message` with the session's signing method.
    pub async fn sign(&self, message: &str) -> ClientResult<SignedMessage> {
        let (address, method) = {
            let state = self.store.read().await;
            let identity = state.session.identity().ok_or(ClientError::NotSignedIn)?;
            (identity.address, state.session.signing_method)
        };
        match method {
            SigningMethod::Extension => Ok(self.bridge.sign(message, &address).await?),
            other => Err(ClientError::UnsupportedSigningMethod(other.as_str())),
        }
    }

    /// Transaction request withdrawing the session's staking rewards.
    pub async fn withdraw_rewards_request(&self, options: &WithdrawOptions) -> ClientResult<TxRequest> {
        let state = self.store.read().await;
        let identity = state.session.identity().ok_or(ClientError::NotSignedIn)?;
        Ok(session::withdraw_rewards_request(
            &identity.address,
            &state.delegation.committed_delegates,
            &self.config.denom,
            options,
        ))
    }

    // -------------------------------------------------------------------------
    // Network
    // -------------------------------------------------------------------------

    pub async fn current_network(&self) -> String {
        let state = self.store.read().await;
        state.network.current.clone().unwrap_or_else(|| self.config.network.clone())
    }

    /// Select another chain. Data fetched for the old one is dropped and
    /// in-flight responses for it are discarded.
    pub async fn switch_network(&self, network_id: &str) -> ClientResult<()> {
        schema_prefix(network_id)?;
        tracing::info!(network = network_id, "switching network");
        self.store.update(|state| state.switch_network(network_id)).await;
        Ok(())
    }

    #[cfg(feature = "http")]
    fn graphql(&self) -> ClientResult<&GraphqlClient> {
        self.graphql
            .as_ref()
            .ok_or_else(|| ClientError::Config("no GraphQL endpoint configured".into()))
    }

    #[cfg(feature = "http")]
    pub async fn load_networks(&self) -> ClientResult<Vec<Network>> {
        let networks = self.graphql()?.networks().await?;
        self.store.update(|state| state.set_networks(networks.clone())).await;
        Ok(networks)
    }

    #[cfg(feature = "http")]
    pub async fn validators(&self) -> ClientResult<Vec<Validator>> {
        let network = self.current_network().await;
        Ok(self.graphql()?.all_validators(&network).await?)
    }

    #[cfg(feature = "http")]
    pub async fn validator(&self, address: &str) -> ClientResult<Option<Validator>> {
        let network = self.current_network().await;
        Ok(self.graphql()?.validator(&network, address).await?)
    }

    /// Validator rows for every validator the session delegates to.
    #[cfg(feature = "http")]
    pub async fn delegated_validators(&self) -> ClientResult<Vec<Validator>> {
        let addresses: Vec<String> =
            self.store.read().await.delegation.committed_delegates.keys().cloned().collect();
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let network = self.current_network().await;
        Ok(self.graphql()?.some_validators(&network, &addresses).await?)
    }

    // -------------------------------------------------------------------------
    // Extension
    // -------------------------------------------------------------------------

    /// Start watching the bus for the extension announcing itself.
    pub fn listen_extension(&self) -> JoinHandle<()> {
        self.bridge.listen(self.store.clone())
    }
}

//! lunie-client: staking wallet client core. Mirrors on-chain delegation
//! state and signs through a browser extension.
//!
//! # Architecture
//!
//! ```text
//! Client (entry point)
//!   │
//!   ├── Store (AppState behind one RwLock)
//!   │
//!   ├── Synchronizer
//!   │     ├── DelegationModule   (every 5 blocks)
//!   │     ├── DistributionModule (every 20 blocks)
//!   │     └── MintingModule      (every 20 blocks)
//!   │           └── NodeFacade ──► LcdClient (REST)
//!   │
//!   ├── ExtensionBridge ──► MessageBus ⇄ extension
//!   │
//!   └── GraphqlClient (validators, networks)
//! ```
//!
//! # Features
//!
//! - `http` (default) - `LcdClient`, `GraphqlClient` and the `lunie` binary
//!
//! # Usage
//!
//! ```ignore
//! use lunie_client::{Client, ClientConfig, SigningMethod};
//!
//! let client = Client::from_config(ClientConfig::from_env()?)?;
//! client.listen_extension();
//! client.sign_in("cosmos1...", SigningMethod::Extension).await;
//!
//! // on every new block
//! client.synchronizer().poll().await?;
//!
//! let signed = client.sign("{...}").await?;
//! ```

pub mod bridge;
pub mod client;
pub mod core;
pub mod error;
pub mod gql;
pub mod lcd;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod store;
pub mod sync;

pub use bridge::{BridgeConfig, ExtensionBridge, MessageBus, SignedMessage};
pub use client::{Client, ClientConfig, Thresholds};
pub use error::{BridgeError, ClientError, ClientResult, GqlError, NodeError};
pub use lcd::NodeFacade;
pub use session::{TxRequest, WithdrawOptions};
pub use store::{AppState, SigningMethod, Store};
pub use sync::{SyncOutcome, Synchronizer};

#[cfg(feature = "http")]
pub use gql::GraphqlClient;
#[cfg(feature = "http")]
pub use lcd::LcdClient;

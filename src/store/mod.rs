//! Store - the single shared application state
//!
//! ```text
//! AppState
//!   ├── session      (address, signing method, epoch)
//!   ├── connection   (connected, last header height)
//!   ├── extension    (announced?, wallets)
//!   ├── network      (current id, known networks)
//!   ├── delegation   ─┐
//!   ├── distribution  ├─ owned by their sync module
//!   ├── minting      ─┘
//!   └── notifications
//! ```
//!
//! Reads are unrestricted. Each sync module only writes its own slice.
//! Never hold a guard across a node or extension await.

mod state;

pub use state::{
    AppState, ConnectionState, DelegationState, DenomAmounts, DistributionState, ExtensionState,
    ExtensionWallet, MintingState, NetworkState, Notification, SessionIdentity, SessionState,
    SigningMethod, SyncStatus,
};

use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<AppState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AppState) -> Self {
        Self { inner: Arc::new(RwLock::new(state)) }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.inner.write().await
    }

    /// Apply one mutation under the write lock.
    pub async fn update<R>(&self, mutate: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.inner.write().await;
        mutate(&mut *state)
    }

    /// Cloned view, e.g. for serializing to the CLI.
    pub async fn snapshot(&self) -> AppState {
        self.inner.read().await.clone()
    }
}

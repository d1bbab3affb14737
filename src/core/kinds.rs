//! Wire tags and store constants
//!
//! Centralized registry for the message discriminators exchanged with the
//! signing extension and the per-module throttle thresholds.

/// Envelope tags on the shared message bus
pub mod envelope {
    /// Outbound: page → extension
    pub const FROM_PAGE: &str = "FROM_LUNIE_IO";
    /// Inbound: extension → page
    pub const FROM_EXTENSION: &str = "FROM_LUNIE_EXTENSION";
}

/// Message kinds carried inside an envelope
pub mod message {
    pub const INIT_EXTENSION: &str = "INIT_EXTENSION";
    pub const GET_WALLETS: &str = "GET_WALLETS";
    pub const GET_WALLETS_RESPONSE: &str = "GET_WALLETS_RESPONSE";
    pub const SIGN_REQUEST: &str = "LUNIE_SIGN_REQUEST";
    pub const SIGN_REQUEST_RESPONSE: &str = "LUNIE_SIGN_REQUEST_RESPONSE";
}

/// Block-height deltas before a module refetches
pub mod threshold {
    pub const DELEGATION: u64 = 5;
    pub const VALIDATOR_REWARDS: u64 = 20;
    pub const MINTING: u64 = 20;
}

/// Module names, used as tracing fields and notification titles
pub mod module {
    pub const DELEGATION: &str = "delegation";
    pub const DISTRIBUTION: &str = "distribution";
    pub const MINTING: &str = "minting";
}

/// Transaction message types built by the session layer
pub mod tx {
    pub const WITHDRAW_DELEGATION_REWARD: &str = "MsgWithdrawDelegationReward";
    /// Validators included in a bulk withdrawal
    pub const MAX_WITHDRAW_VALIDATORS: usize = 5;
    /// Display gas price → on-chain micro-denom
    pub const GAS_PRICE_SCALE: f64 = 1_000_000.0;
}

//! Sync - keep local mirrors of on-chain commitments fresh
//!
//! Every module follows one cycle:
//!
//! ```text
//! trigger (session start | reconnect | new height)
//!     │
//!     ▼
//! throttle: height - last_update_height >= threshold, or force
//!     │
//!     ▼
//! fetch from NodeFacade (concurrent reads)
//!     │
//!     ▼
//! same session? newest cycle? ── no ──► discard silently
//!     │ yes
//!     ▼
//! apply: keys missing from the response are removed, the rest overwritten
//! ```
//!
//! Failures keep the previous data, set `error` on the module status and
//! raise a notification. The next trigger retries.
//!
//! | Module | Threshold | Reads |
//! |--------|-----------|-------|
//! | delegation | 5 | delegations, unbonding delegations, redelegations |
//! | distribution | 20 | total rewards, rewards per delegated validator, parameters, outstanding |
//! | minting | 20 | parameters, inflation, annual provisions (no session) |

mod delegation;
mod distribution;
mod engine;
mod minting;
mod module;
pub mod reconcile;
mod throttle;

pub use delegation::{DelegationModule, DelegatorSnapshot};
pub use distribution::{DistributionModule, RewardsSnapshot};
pub use engine::{ModuleSet, SweepReport, Synchronizer};
pub use minting::{MintingModule, MintingSnapshot};
pub use module::{SyncModule, SyncOutcome};
pub use throttle::HeightThrottle;

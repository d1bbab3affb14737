//! The generic sync cycle shared by every module.

use async_trait::async_trait;

use super::throttle::HeightThrottle;
use crate::error::NodeError;
use crate::lcd::NodeFacade;
use crate::store::{AppState, SyncStatus};

/// One category of on-chain data mirrored into its own slice of [`AppState`].
#[async_trait]
pub trait SyncModule: Send + Sync {
    /// Whatever `fetch` needs from local state, captured when the cycle starts.
    type Input: Send;
    /// The authoritative response, applied in one step.
    type Snapshot: Send;

    fn name(&self) -> &'static str;

    fn throttle(&self) -> HeightThrottle;

    /// Title of the notification raised when a fetch fails.
    fn error_title(&self) -> &'static str;

    /// Modules reading per-address data do nothing without a signed-in session.
    fn requires_session(&self) -> bool {
        true
    }

    fn status<'a>(&self, state: &'a mut AppState) -> &'a mut SyncStatus;

    fn input(&self, state: &AppState) -> Self::Input;

    async fn fetch(
        &self,
        node: &dyn NodeFacade,
        address: Option<&str>,
        input: Self::Input,
    ) -> Result<Self::Snapshot, NodeError>;

    fn apply(&self, state: &mut AppState, snapshot: Self::Snapshot);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Not enough blocks since the last run.
    Throttled,
    /// Module needs a session and nobody is signed in.
    NoSession,
    /// Node offline; the module stays `loading` until `reconnected`.
    Deferred,
    Applied,
    /// Response outlived its session or a later cycle already landed.
    Discarded,
    Failed(NodeError),
}

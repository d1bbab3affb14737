//! Minting module - chain-wide inflation data, no session needed.

use async_trait::async_trait;

use super::module::SyncModule;
use super::throttle::HeightThrottle;
use crate::core::amount::parse_amount;
use crate::core::kinds::{module, threshold};
use crate::error::NodeError;
use crate::lcd::{MintingParameters, NodeFacade};
use crate::store::{AppState, SyncStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct MintingSnapshot {
    pub parameters: MintingParameters,
    pub inflation: f64,
    pub annual_provisions: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MintingModule {
    throttle: HeightThrottle,
}

impl Default for MintingModule {
    fn default() -> Self {
        Self::new(threshold::MINTING)
    }
}

impl MintingModule {
    pub fn new(threshold: u64) -> Self {
        Self { throttle: HeightThrottle::new(threshold) }
    }
}

#[async_trait]
impl SyncModule for MintingModule {
    type Input = ();
    type Snapshot = MintingSnapshot;

    fn name(&self) -> &'static str {
        module::MINTING
    }

    fn throttle(&self) -> HeightThrottle {
        self.throttle
    }

    fn error_title(&self) -> &'static str {
        "Error fetching minting data"
    }

    fn requires_session(&self) -> bool {
        false
    }

    fn status<'a>(&self, state: &'a mut AppState) -> &'a mut SyncStatus {
        &mut state.minting.status
    }

    fn input(&self, _state: &AppState) -> Self::Input {}

    async fn fetch(
        &self,
        node: &dyn NodeFacade,
        _address: Option<&str>,
        _input: (),
    ) -> Result<MintingSnapshot, NodeError> {
        let (parameters, inflation, annual_provisions) = tokio::try_join!(
            node.minting_parameters(),
            node.minting_inflation(),
            node.minting_annual_provisions(),
        )?;
        Ok(MintingSnapshot {
            parameters,
            inflation: parse_amount(&inflation)?,
            annual_provisions: parse_amount(&annual_provisions)?,
        })
    }

    fn apply(&self, state: &mut AppState, snapshot: MintingSnapshot) {
        let minting = &mut state.minting;
        minting.parameters = Some(snapshot.parameters);
        minting.inflation = Some(snapshot.inflation);
        minting.annual_provisions = Some(snapshot.annual_provisions);
    }
}

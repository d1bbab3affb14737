//! Decimal string amounts as returned by the node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::NodeError;

/// Amount of a single denomination, amounts kept as the node's decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self { denom: denom.into(), amount: amount.into() }
    }
}

/// Parse a node decimal (`"5"`, `"10.00"`, `"3.5e2"`). Non-finite values are rejected.
pub fn parse_amount(value: &str) -> Result<f64, NodeError> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| NodeError::Decode(format!("not a decimal amount: '{}'", value)))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(NodeError::Decode(format!("amount out of range: '{}'", value)))
    }
}

/// Fold a coin list into `denom → amount`, summing duplicate denoms.
pub fn coins_to_map(coins: &[Coin]) -> Result<BTreeMap<String, f64>, NodeError> {
    let mut out = BTreeMap::new();
    for coin in coins {
        *out.entry(coin.denom.clone()).or_insert(0.0) += parse_amount(&coin.amount)?;
    }
    Ok(out)
}

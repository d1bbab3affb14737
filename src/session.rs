//! Session-side transaction requests: what gets handed to a signer.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::amount::Coin;
use crate::core::kinds::tx;
use crate::store::SigningMethod;

/// Fee and targeting options for a rewards withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawOptions {
    pub gas: u64,
    /// Display units; scaled to the micro-denom on the way out.
    pub gas_price: f64,
    pub submit_type: SigningMethod,
    /// Withdraw from this validator only; otherwise the largest delegations.
    pub validator_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawArguments {
    pub to_address: String,
    pub validator_addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxRequest {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    #[serde(rename = "txArguments")]
    pub tx_arguments: WithdrawArguments,
    #[serde(rename = "submitType")]
    pub submit_type: SigningMethod,
    pub gas: String,
    pub gas_prices: Vec<Coin>,
}

/// Validators to withdraw from: the explicit one, or the top five by
/// committed amount (largest first, address order on ties).
pub fn withdraw_targets(committed: &BTreeMap<String, f64>, validator: Option<&str>) -> Vec<String> {
    if let Some(validator) = validator {
        return vec![validator.to_string()];
    }
    let mut ranked: Vec<(&String, f64)> = committed.iter().map(|(k, v)| (k, *v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(tx::MAX_WITHDRAW_VALIDATORS)
        .map(|(address, _)| address.clone())
        .collect()
}

/// `123` display units → `"123000000"` micro units.
pub fn scale_gas_price(gas_price: f64) -> String {
    let micro = (gas_price * tx::GAS_PRICE_SCALE).round();
    if micro <= 0.0 {
        "0".into()
    } else {
        format!("{}", micro as u128)
    }
}

pub fn withdraw_rewards_request(
    to_address: &str,
    committed: &BTreeMap<String, f64>,
    denom: &str,
    options: &WithdrawOptions,
) -> TxRequest {
    TxRequest {
        msg_type: tx::WITHDRAW_DELEGATION_REWARD,
        tx_arguments: WithdrawArguments {
            to_address: to_address.to_string(),
            validator_addresses: withdraw_targets(committed, options.validator_address.as_deref()),
        },
        submit_type: options.submit_type,
        gas: options.gas.to_string(),
        gas_prices: vec![Coin::new(denom, scale_gas_price(options.gas_price))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ten_delegations() -> BTreeMap<String, f64> {
        [
            ("address1", 100.0),
            ("address2", 1.0),
            ("address3", 5.0),
            ("address4", 3.0),
            ("address6", 99.0),
            ("address7", 9.0),
            ("address8", 96.0),
            ("address9", 98.0),
            ("address10", 97.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn options(validator: Option<&str>) -> WithdrawOptions {
        WithdrawOptions {
            gas: 456,
            gas_price: 123.0,
            submit_type: SigningMethod::Ledger,
            validator_address: validator.map(String::from),
        }
    }

    #[test]
    fn top_five_by_amount() {
        assert_eq!(
            withdraw_targets(&ten_delegations(), None),
            vec!["address1", "address6", "address9", "address10", "address8"]
        );
    }

    #[test]
    fn explicit_validator_only() {
        assert_eq!(withdraw_targets(&ten_delegations(), Some("address4")), vec!["address4"]);
    }

    #[test]
    fn fewer_than_five_takes_all() {
        let committed = BTreeMap::from([("coolval1".to_string(), 1.0)]);
        assert_eq!(withdraw_targets(&committed, None), vec!["coolval1"]);
        assert!(withdraw_targets(&BTreeMap::new(), None).is_empty());
    }

    #[test]
    fn gas_price_scaling() {
        assert_eq!(scale_gas_price(123.0), "123000000");
        assert_eq!(scale_gas_price(0.025), "25000");
        assert_eq!(scale_gas_price(0.0), "0");
    }

    #[test]
    fn request_shape() {
        let committed = BTreeMap::from([("coolval1".to_string(), 1.0)]);
        let request = withdraw_rewards_request("cosmos1address", &committed, "stake", &options(None));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "type": "MsgWithdrawDelegationReward",
                "txArguments": {"toAddress": "cosmos1address", "validatorAddresses": ["coolval1"]},
                "submitType": "ledger",
                "gas": "456",
                "gas_prices": [{"denom": "stake", "amount": "123000000"}]
            })
        );
    }
}

//! Wire format of the page ⇄ extension bus.
//!
//! Page → extension:
//! `{"type": "FROM_LUNIE_IO", "payload": {"type": <kind>, ...}, "skipResponse": false}`
//!
//! Extension → page:
//! `{"type": "FROM_LUNIE_EXTENSION", "message": {"type": <kind>, "payload": {...}}}`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::ExtensionWallet;

/// Everything that may legitimately travel on the bus. Anything else is noise
/// from unrelated scripts and fails to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BusMessage {
    #[serde(rename = "FROM_LUNIE_IO")]
    FromPage {
        payload: PageRequest,
        #[serde(rename = "skipResponse", default)]
        skip_response: bool,
    },
    #[serde(rename = "FROM_LUNIE_EXTENSION")]
    FromExtension { message: ExtensionMessage },
}

impl BusMessage {
    pub fn request(payload: PageRequest) -> Self {
        BusMessage::FromPage { payload, skip_response: false }
    }

    pub fn from_extension(message: ExtensionMessage) -> Self {
        BusMessage::FromExtension { message }
    }

    pub fn to_value(&self) -> Value {
        // Plain derived structs with string keys; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageRequest {
    #[serde(rename = "GET_WALLETS")]
    GetWallets,
    #[serde(rename = "LUNIE_SIGN_REQUEST")]
    SignRequest { payload: SignRequestPayload },
}

impl PageRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            PageRequest::GetWallets => crate::core::kinds::message::GET_WALLETS,
            PageRequest::SignRequest { .. } => crate::core::kinds::message::SIGN_REQUEST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequestPayload {
    #[serde(rename = "signMessage")]
    pub sign_message: String,
    #[serde(rename = "senderAddress")]
    pub sender_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtensionMessage {
    #[serde(rename = "INIT_EXTENSION")]
    InitExtension {},
    #[serde(rename = "GET_WALLETS_RESPONSE")]
    GetWalletsResponse { payload: WalletsPayload },
    #[serde(rename = "LUNIE_SIGN_REQUEST_RESPONSE")]
    SignResponse { payload: SignResponsePayload },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletsPayload {
    #[serde(default)]
    pub wallets: Vec<ExtensionWallet>,
}

/// Hex-encoded signature material, or a rejection flag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(rename = "publicKey", default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub rejected: bool,
}

/// Decode one bus event. `None` for anything not shaped like our protocol.
pub fn parse_bus_message(value: &Value) -> Option<BusMessage> {
    match BusMessage::deserialize(value) {
        Ok(message) => Some(message),
        Err(error) => {
            tracing::trace!(%error, "ignoring foreign bus message");
            None
        }
    }
}

/// Only messages the extension sent; our own outbound echoes are dropped too.
pub fn parse_extension_message(value: &Value) -> Option<ExtensionMessage> {
    match parse_bus_message(value)? {
        BusMessage::FromExtension { message } => Some(message),
        BusMessage::FromPage { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_wallets_request_framing() {
        let value = BusMessage::request(PageRequest::GetWallets).to_value();
        assert_eq!(
            value,
            json!({"payload": {"type": "GET_WALLETS"}, "skipResponse": false, "type": "FROM_LUNIE_IO"})
        );
    }

    #[test]
    fn sign_request_framing() {
        let value = BusMessage::request(PageRequest::SignRequest {
            payload: SignRequestPayload { sign_message: "abc".into(), sender_address: "cosmos1234".into() },
        })
        .to_value();
        assert_eq!(
            value,
            json!({
                "payload": {
                    "payload": {"senderAddress": "cosmos1234", "signMessage": "abc"},
                    "type": "LUNIE_SIGN_REQUEST"
                },
                "skipResponse": false,
                "type": "FROM_LUNIE_IO"
            })
        );
    }

    #[test]
    fn decodes_extension_messages() {
        let init = json!({"type": "FROM_LUNIE_EXTENSION", "message": {"type": "INIT_EXTENSION"}});
        assert_eq!(parse_extension_message(&init), Some(ExtensionMessage::InitExtension {}));

        let wallets = json!({
            "type": "FROM_LUNIE_EXTENSION",
            "message": {"type": "GET_WALLETS_RESPONSE", "payload": {"wallets": [{"name": "Baz", "address": "cosmos1"}]}}
        });
        let Some(ExtensionMessage::GetWalletsResponse { payload }) = parse_extension_message(&wallets) else {
            panic!("expected wallets response");
        };
        assert_eq!(payload.wallets, vec![ExtensionWallet { name: "Baz".into(), address: "cosmos1".into() }]);

        let rejected = json!({
            "type": "FROM_LUNIE_EXTENSION",
            "message": {"type": "LUNIE_SIGN_REQUEST_RESPONSE", "payload": {"rejected": true}}
        });
        let Some(ExtensionMessage::SignResponse { payload }) = parse_extension_message(&rejected) else {
            panic!("expected sign response");
        };
        assert!(payload.rejected);
        assert!(payload.signature.is_none());
    }

    /// Test: serde wire tags equal the shared registry constants
    #[test]
    fn serde_tags_match_registry() {
        use crate::core::kinds::{envelope, message};

        let get_wallets = BusMessage::request(PageRequest::GetWallets).to_value();
        assert_eq!(get_wallets["type"], envelope::FROM_PAGE);
        assert_eq!(get_wallets["payload"]["type"], message::GET_WALLETS);

        let sign = BusMessage::request(PageRequest::SignRequest {
            payload: SignRequestPayload { sign_message: "m".into(), sender_address: "a".into() },
        })
        .to_value();
        assert_eq!(sign["payload"]["type"], message::SIGN_REQUEST);

        let inbound = [
            (ExtensionMessage::InitExtension {}, message::INIT_EXTENSION),
            (
                ExtensionMessage::GetWalletsResponse { payload: WalletsPayload::default() },
                message::GET_WALLETS_RESPONSE,
            ),
            (
                ExtensionMessage::SignResponse { payload: SignResponsePayload::default() },
                message::SIGN_REQUEST_RESPONSE,
            ),
        ];
        for (msg, kind) in inbound {
            let value = BusMessage::from_extension(msg).to_value();
            assert_eq!(value["type"], envelope::FROM_EXTENSION);
            assert_eq!(value["message"]["type"], kind);
        }
    }

    #[test]
    fn ignores_foreign_traffic() {
        let spoofed = json!({"type": "NOT_FROM_LUNIE_EXTENSION", "message": {"type": "INIT_EXTENSION"}});
        assert!(parse_extension_message(&spoofed).is_none());

        let unknown_kind = json!({"type": "FROM_LUNIE_EXTENSION", "message": {"type": "DROP_TABLES"}});
        assert!(parse_extension_message(&unknown_kind).is_none());

        assert!(parse_extension_message(&json!("webpackHotUpdate")).is_none());
        assert!(parse_extension_message(&json!({"source": "react-devtools"})).is_none());
    }

    #[test]
    fn own_requests_are_not_extension_messages() {
        let echo = BusMessage::request(PageRequest::GetWallets).to_value();
        assert!(parse_bus_message(&echo).is_some());
        assert!(parse_extension_message(&echo).is_none());
    }
}

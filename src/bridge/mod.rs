//! Extension bridge - signing without ever seeing a private key
//!
//! The page and the signing extension share one broadcast channel. The page
//! posts requests; the extension answers on the same channel.
//!
//! ```text
//! page                              bus                         extension
//!  │ GET_WALLETS ───────────────────►│──────────────────────────────►│
//!  │◄────────────────────────────────│◄──────── GET_WALLETS_RESPONSE │
//!  │ LUNIE_SIGN_REQUEST ────────────►│──────────────────────────────►│
//!  │◄────────────────────────────────│◄─ LUNIE_SIGN_REQUEST_RESPONSE │
//!  │                                 │◄─────────────── INIT_EXTENSION│
//! ```
//!
//! | Kind | Direction | Payload |
//! |------|-----------|---------|
//! | `INIT_EXTENSION` | in | none |
//! | `GET_WALLETS` | out | none |
//! | `GET_WALLETS_RESPONSE` | in | `{wallets: [{name, address}]}` |
//! | `LUNIE_SIGN_REQUEST` | out | `{signMessage, senderAddress}` |
//! | `LUNIE_SIGN_REQUEST_RESPONSE` | in | `{signature, publicKey}` (hex) or `{rejected: true}` |
//!
//! Other scripts may post on the same channel. Only payloads that decode as
//! [`BusMessage::FromExtension`] are ever acted upon.

mod bus;
mod extension;
mod message;

pub use bus::MessageBus;
pub use extension::{
    BridgeConfig, ExtensionBridge, ListenEvent, SignedMessage, DEFAULT_REQUEST_TIMEOUT,
};
pub use message::{
    parse_bus_message, parse_extension_message, BusMessage, ExtensionMessage, PageRequest,
    SignRequestPayload, SignResponsePayload, WalletsPayload,
};

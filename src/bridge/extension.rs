//! ExtensionBridge - wallet listing and transaction signing through the extension.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::bus::MessageBus;
use super::message::{
    parse_extension_message, BusMessage, ExtensionMessage, PageRequest, SignRequestPayload,
    SignResponsePayload,
};
use crate::error::BridgeError;
use crate::store::{ExtensionWallet, Store};

/// How long a call waits for the extension before giving up.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { request_timeout: Some(DEFAULT_REQUEST_TIMEOUT) }
    }
}

impl BridgeConfig {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Signature material returned by the extension, hex-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

/// What the listener did with one bus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenEvent {
    ExtensionAvailable,
    Ignored,
}

/// A call waiting for its correlated response. Subscribed before the request
/// is posted, so the answer cannot slip past. Dropping it abandons the call.
struct PendingRequest {
    kind: &'static str,
    receiver: broadcast::Receiver<Value>,
}

impl PendingRequest {
    /// Feed extension messages to `settle` until it yields a result.
    async fn settle_with<T>(
        mut self,
        mut settle: impl FnMut(ExtensionMessage) -> Option<Result<T, BridgeError>>,
    ) -> Result<T, BridgeError> {
        loop {
            let value = match self.receiver.recv().await {
                Ok(value) => value,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(kind = self.kind, skipped, "bridge receiver lagged");
                    continue;
                }
                Err(RecvError::Closed) => return Err(BridgeError::Closed),
            };
            if let Some(result) = parse_extension_message(&value).and_then(&mut settle) {
                return result;
            }
        }
    }
}

/// Clears the single-flight flag even if the signing future is dropped.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct ExtensionBridge {
    bus: MessageBus,
    config: BridgeConfig,
    signing: Arc<AtomicBool>,
}

impl ExtensionBridge {
    pub fn new(bus: MessageBus) -> Self {
        Self::with_config(bus, BridgeConfig::default())
    }

    pub fn with_config(bus: MessageBus, config: BridgeConfig) -> Self {
        Self { bus, config, signing: Arc::new(AtomicBool::new(false)) }
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn config(&self) -> BridgeConfig {
        self.config
    }

    fn send(&self, request: PageRequest) -> PendingRequest {
        let kind = request.kind();
        let receiver = self.bus.subscribe();
        tracing::debug!(kind, "posting extension request");
        self.bus.post(BusMessage::request(request).to_value());
        PendingRequest { kind, receiver }
    }

    async fn await_response<T>(
        &self,
        pending: PendingRequest,
        settle: impl FnMut(ExtensionMessage) -> Option<Result<T, BridgeError>>,
    ) -> Result<T, BridgeError> {
        let kind = pending.kind;
        match self.config.request_timeout {
            None => pending.settle_with(settle).await,
            Some(limit) => tokio::time::timeout(limit, pending.settle_with(settle))
                .await
                .map_err(|_| BridgeError::Timeout { kind, secs: limit.as_secs() })?,
        }
    }

    /// Wallets the extension holds. Concurrent callers each post a request
    /// and are all answered by the first response.
    pub async fn get_wallets(&self) -> Result<Vec<ExtensionWallet>, BridgeError> {
        let pending = self.send(PageRequest::GetWallets);
        self.await_response(pending, |message| match message {
            ExtensionMessage::GetWalletsResponse { payload } => Some(Ok(payload.wallets)),
            _ => None,
        })
        .await
    }

    /// Ask the extension to sign `message` for `sender_address`.
    ///
    /// The extension does not echo request ids, so only one signature request
    /// may be outstanding; a second one fails with [`BridgeError::SignInFlight`].
    pub async fn sign(&self, message: &str, sender_address: &str) -> Result<SignedMessage, BridgeError> {
        if self.signing.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::SignInFlight);
        }
        let _flight = FlightGuard(self.signing.clone());

        let pending = self.send(PageRequest::SignRequest {
            payload: SignRequestPayload {
                sign_message: message.to_string(),
                sender_address: sender_address.to_string(),
            },
        });
        self.await_response(pending, |message| match message {
            ExtensionMessage::SignResponse { payload } => settle_signature(payload),
            _ => None,
        })
        .await
    }

    /// Handle one bus event on behalf of `store`.
    pub async fn process_message(&self, store: &Store, value: &Value) -> ListenEvent {
        match parse_extension_message(value) {
            Some(ExtensionMessage::InitExtension {}) => {
                tracing::info!("extension announced itself");
                store.update(|state| state.set_extension_available()).await;
                ListenEvent::ExtensionAvailable
            }
            _ => ListenEvent::Ignored,
        }
    }

    /// Fetch wallets and record them; failures are logged, not surfaced.
    pub async fn get_addresses_from_extension(&self, store: &Store) -> Result<usize, BridgeError> {
        match self.get_wallets().await {
            Ok(wallets) => {
                let count = wallets.len();
                store.update(|state| state.set_extension_wallets(wallets)).await;
                tracing::debug!(count, "stored extension wallets");
                Ok(count)
            }
            Err(error) => {
                tracing::warn!(%error, "could not load wallets from extension");
                Err(error)
            }
        }
    }

    /// Watch the bus for the page's lifetime. On `INIT_EXTENSION` mark the
    /// extension available and load its wallets.
    pub fn listen(&self, store: Store) -> JoinHandle<()> {
        let bridge = self.clone();
        let mut receiver = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                let value = match receiver.recv().await {
                    Ok(value) => value,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "extension listener lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if bridge.process_message(&store, &value).await == ListenEvent::ExtensionAvailable {
                    let bridge = bridge.clone();
                    let store = store.clone();
                    tokio::spawn(async move {
                        let _ = bridge.get_addresses_from_extension(&store).await;
                    });
                }
            }
            tracing::debug!("extension listener stopped");
        })
    }
}

/// A response without signature and without rejection does not settle the call.
fn settle_signature(payload: SignResponsePayload) -> Option<Result<SignedMessage, BridgeError>> {
    if payload.rejected {
        return Some(Err(BridgeError::UserRejected));
    }
    let signature = payload.signature?;
    Some(decode_signature(&signature, payload.public_key.as_deref()))
}

fn decode_signature(signature: &str, public_key: Option<&str>) -> Result<SignedMessage, BridgeError> {
    let public_key = public_key
        .ok_or_else(|| BridgeError::InvalidResponse("signature without public key".into()))?;
    let decode = |field: &str, value: &str| {
        hex::decode(value).map_err(|e| BridgeError::InvalidResponse(format!("{field}: {e}")))
    };
    Ok(SignedMessage {
        signature: decode("signature", signature)?,
        public_key: decode("publicKey", public_key)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_settles_with_error() {
        let payload = SignResponsePayload { rejected: true, ..Default::default() };
        assert_eq!(settle_signature(payload), Some(Err(BridgeError::UserRejected)));
    }

    #[test]
    fn empty_response_keeps_waiting() {
        assert_eq!(settle_signature(SignResponsePayload::default()), None);
    }

    #[test]
    fn signature_is_hex_decoded() {
        let payload = SignResponsePayload {
            signature: Some("abcd".into()),
            public_key: Some("1234".into()),
            rejected: false,
        };
        let signed = settle_signature(payload).unwrap().unwrap();
        assert_eq!(signed.signature, vec![0xab, 0xcd]);
        assert_eq!(signed.public_key, vec![0x12, 0x34]);
    }

    #[test]
    fn malformed_signature_is_an_error() {
        assert!(matches!(
            decode_signature("zz", Some("12")),
            Err(BridgeError::InvalidResponse(_))
        ));
        assert!(matches!(decode_signature("ab", None), Err(BridgeError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn spoofed_init_does_not_touch_state() {
        let store = Store::new();
        let bridge = ExtensionBridge::new(MessageBus::new());
        let spoofed = serde_json::json!({"type": "NOT_FROM_LUNIE_EXTENSION", "message": {"type": "INIT_EXTENSION"}});

        assert_eq!(bridge.process_message(&store, &spoofed).await, ListenEvent::Ignored);
        assert!(!store.read().await.extension.enabled);
    }
}

//! Error types. One enum per layer, folded into [`ClientError`] at the top.

use thiserror::Error;

/// Failures of the extension signing bridge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("User rejected action in extension.")]
    UserRejected,

    #[error("a signature request is already waiting for the extension")]
    SignInFlight,

    #[error("extension did not answer {kind} within {secs}s")]
    Timeout { kind: &'static str, secs: u64 },

    #[error("message bus closed")]
    Closed,

    #[error("invalid extension response: {0}")]
    InvalidResponse(String),
}

/// Failures talking to the chain node facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("node returned HTTP {0}")]
    Status(u16),

    #[error("invalid node response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

/// Failures of the GraphQL query surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GqlError {
    #[error("no schema alias for network '{0}'")]
    UnknownNetwork(String),

    #[error("missing result key '{0}'")]
    MissingResult(String),

    #[error("graphql errors: {0}")]
    Query(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid graphql response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Gql(#[from] GqlError),

    #[error("not signed in")]
    NotSignedIn,

    #[error("signing method '{0}' is not supported by this client")]
    UnsupportedSigningMethod(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

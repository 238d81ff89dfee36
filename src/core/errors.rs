use thiserror::Error;

/// Error type for vault client operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed address or object id.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Transport-level failures talking to the full node.
    #[error("Network error: {0}")]
    Network(String),

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response payload did not match the expected shape.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A field the node must return was absent from its response.
    #[error("Missing field in node response: {0}")]
    MissingField(String),

    /// BCS encoding failures.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Object requested as a transaction input does not exist.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// A Move return value could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The transaction block is incomplete or inconsistent.
    #[error("Transaction builder error: {0}")]
    Builder(String),

    /// No account is connected.
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// The external signer failed or produced no signature.
    #[error("Signer error: {0}")]
    Signer(String),

    /// Execution was rejected or reported a failure status.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl VaultError {
    /// Whether the failure is transient and the call may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VaultError::Network(_))
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            VaultError::Deserialization(err.to_string())
        } else {
            VaultError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Deserialization(err.to_string())
    }
}

impl From<bcs::Error> for VaultError {
    fn from(err: bcs::Error) -> Self {
        VaultError::Serialization(err.to_string())
    }
}

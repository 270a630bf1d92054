use thiserror::Error;

/// Unified error type for the node
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("State error: {0}")]
    StateError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Crypto error: {0}")]
    CryptoError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, NodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let e = NodeError::ConfigError("bad rpc address".to_string());
        assert_eq!(e.to_string(), "Config error: bad rpc address");
    }
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Error reported verbatim by the native SDK.
    #[error("{0}")]
    Native(String),
}

impl BridgeError {
    /// The collaborator's own message, without the bridge prefix.
    pub fn detail(&self) -> &str {
        match self {
            BridgeError::NotAvailable(msg)
            | BridgeError::OperationFailed(msg)
            | BridgeError::Native(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

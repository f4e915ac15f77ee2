/// Errors produced while preparing, dispatching or decoding an RPC call.
#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("invalid number of parameters for RPC method `{method}`: got {got}, expected {expected}")]
    InvalidNumberOfParams {
        method: String,
        got: usize,
        expected: usize,
    },
    #[error("invalid parameter at position {index}: {reason}")]
    InvalidParam { index: usize, reason: String },
    #[error("provider not set or invalid")]
    NoProvider,
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("node returned an error: {0}")]
    Rpc(jsonrpc_core::Error),
    #[error("invalid JSON RPC response: {0}")]
    InvalidResponse(String),
    #[error("failed to (de)serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RequestError {
    pub(crate) fn invalid_param(index: usize, reason: impl Into<String>) -> Self {
        RequestError::InvalidParam {
            index,
            reason: reason.into(),
        }
    }

    /// Returns the node-side error code if the node answered with a failure.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            RequestError::Rpc(err) => Some(err.code.code()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;

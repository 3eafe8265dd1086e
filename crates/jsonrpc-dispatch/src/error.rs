//! Error taxonomy and JSON-RPC error codes.

use serde_json::Value;

use crate::envelope::EnvelopeError;
use crate::schema::ValidationError;
use crate::types::{JsonRpcErrorObject, JsonRpcResponse, RequestId};

/// Standard JSON-RPC 2.0 error codes produced by the dispatcher.
pub mod error_codes {
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Every way a call can fail before producing a result.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(EnvelopeError),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(ValidationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            DispatchError::InvalidRequest(_) => INVALID_REQUEST,
            DispatchError::MethodNotFound(_) => METHOD_NOT_FOUND,
            DispatchError::InvalidParams(_) => INVALID_PARAMS,
            DispatchError::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// The fixed wire message for this error's code.
    pub fn message(&self) -> &'static str {
        match self {
            DispatchError::InvalidRequest(_) => "Invalid Request",
            DispatchError::MethodNotFound(_) => "Method not found",
            DispatchError::InvalidParams(_) => "Invalid params",
            DispatchError::Internal(_) => "Internal error",
        }
    }

    /// Wire `data`. Method-not-found carries none; internal errors carry
    /// only the failure message.
    pub fn data(&self) -> Option<Value> {
        match self {
            DispatchError::InvalidRequest(e) => Some(e.to_value()),
            DispatchError::MethodNotFound(_) => None,
            DispatchError::InvalidParams(e) => Some(e.to_value()),
            DispatchError::Internal(message) => Some(Value::String(message.clone())),
        }
    }

    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject {
            code: self.code(),
            message: self.message().to_string(),
            data: self.data(),
        }
    }

    pub fn to_response(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::error(id, self.to_error_object())
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;

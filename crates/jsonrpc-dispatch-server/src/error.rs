//! Errors raised while bootstrapping or serving.

/// Startup and transport failures. Request-level failures never surface
/// here; the dispatcher turns those into JSON-RPC responses.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid manifest {path}: {source}")]
    ManifestParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Manifest declares no methods")]
    EmptyManifest,

    #[error("Method '{method}' refers to unknown handler '{handler}'")]
    UnknownHandler { method: String, handler: String },

    #[error("Method '{0}' is declared more than once")]
    DuplicateMethod(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

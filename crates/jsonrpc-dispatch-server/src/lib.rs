//! jsonrpc-dispatch server: built-in methods, method manifests, and the
//! HTTP transport around the core dispatcher.

pub mod config;
pub mod error;
pub mod handlers;
pub mod repl;
pub mod transport;

pub use config::{resolve_listen_addr, resolve_manifest_path};
pub use error::{ServerError, ServerResult};
pub use handlers::MethodTable;
#[cfg(feature = "http")]
pub use transport::HttpTransport;

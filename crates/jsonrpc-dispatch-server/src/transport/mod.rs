//! Transport layer: turns wire bodies into dispatcher calls.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{build_router, HttpTransport};

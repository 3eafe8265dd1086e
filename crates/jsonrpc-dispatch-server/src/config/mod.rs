//! Configuration loading and resolution.
//!
//! Every setting resolves as: explicit flag, then environment variable, then
//! default.

use std::path::PathBuf;

pub mod manifest;

pub use manifest::MethodManifest;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const ADDR_ENV: &str = "JSONRPC_DISPATCH_ADDR";
pub const PORT_ENV: &str = "PORT";
pub const MANIFEST_ENV: &str = "JSONRPC_DISPATCH_MANIFEST";

/// Resolve the HTTP listen address.
pub fn resolve_listen_addr(explicit: Option<&str>) -> String {
    pick_listen_addr(
        explicit,
        std::env::var(ADDR_ENV).ok().as_deref(),
        std::env::var(PORT_ENV).ok().as_deref(),
    )
}

/// Resolve the method manifest path, if any.
pub fn resolve_manifest_path(explicit: Option<&str>) -> Option<PathBuf> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(MANIFEST_ENV).ok())
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

fn pick_listen_addr(explicit: Option<&str>, addr_var: Option<&str>, port_var: Option<&str>) -> String {
    if let Some(addr) = explicit {
        return addr.to_string();
    }

    if let Some(addr) = addr_var.filter(|a| !a.trim().is_empty()) {
        return addr.trim().to_string();
    }

    if let Some(port) = port_var.and_then(|p| p.trim().parse::<u16>().ok()) {
        return format!("0.0.0.0:{port}");
    }

    DEFAULT_ADDR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        assert_eq!(
            pick_listen_addr(Some("127.0.0.1:9000"), Some("0.0.0.0:1"), Some("2")),
            "127.0.0.1:9000"
        );
    }

    #[test]
    fn test_addr_var_before_port() {
        assert_eq!(pick_listen_addr(None, Some("10.0.0.1:80"), Some("2")), "10.0.0.1:80");
    }

    #[test]
    fn test_port_var() {
        assert_eq!(pick_listen_addr(None, None, Some("8080")), "0.0.0.0:8080");
        assert_eq!(pick_listen_addr(None, Some("  "), Some("not-a-port")), DEFAULT_ADDR);
    }

    #[test]
    fn test_default() {
        assert_eq!(pick_listen_addr(None, None, None), "127.0.0.1:3000");
    }

    #[test]
    fn test_explicit_manifest() {
        assert_eq!(
            resolve_manifest_path(Some("methods.json")),
            Some(PathBuf::from("methods.json"))
        );
    }
}

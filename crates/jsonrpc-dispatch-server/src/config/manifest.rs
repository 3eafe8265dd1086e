//! Method manifest: a JSON file naming which built-ins to expose, and under
//! which method names.
//!
//! ```json
//! {
//!   "methods": [
//!     { "name": "greet", "handler": "hello" },
//!     { "handler": "getTime" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodManifest {
    pub methods: Vec<MethodEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodEntry {
    /// Exposed method name; defaults to the handler name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub handler: String,
}

impl MethodEntry {
    pub fn method_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.handler)
    }
}

impl MethodManifest {
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ServerError::ManifestRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ServerError::ManifestParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_default_name() {
        let manifest =
            MethodManifest::parse(r#"{"methods": [{"handler": "hello"}, {"name": "now", "handler": "getTime"}]}"#)
                .unwrap();
        assert_eq!(manifest.methods[0].method_name(), "hello");
        assert_eq!(manifest.methods[1].method_name(), "now");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(MethodManifest::parse(r#"{"methods": [{"handler": "hello", "path": "x.so"}]}"#).is_err());
        assert!(MethodManifest::parse(r#"{"handlers": []}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = MethodManifest::load(Path::new("/nonexistent/methods.json")).unwrap_err();
        assert!(matches!(err, ServerError::ManifestRead { .. }));
    }
}

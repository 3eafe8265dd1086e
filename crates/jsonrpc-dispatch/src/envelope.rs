//! Structural validation of incoming request envelopes.
//!
//! Transports run raw bodies through [`parse_request`] (or
//! [`parse_request_str`]) before handing them to the dispatcher. Failures are
//! answered with `-32600` and an `id` of `null`.

use serde_json::{json, Map, Value};

use crate::error::DispatchError;
use crate::schema::{value_kind, Issue, IssueCode};
use crate::types::{JsonRpcRequest, JsonRpcResponse, RequestId, JSONRPC_VERSION};

/// Every structural problem found in one envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeError {
    pub issues: Vec<Issue>,
}

impl EnvelopeError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    fn root(message: impl Into<String>) -> Self {
        Self::new(vec![Issue::custom(Vec::new(), message)])
    }

    pub fn to_value(&self) -> Value {
        json!({ "issues": serde_json::to_value(&self.issues).unwrap_or_default() })
    }

    /// The `-32600` response for this envelope, always with a null id.
    pub fn to_response(&self) -> JsonRpcResponse {
        DispatchError::InvalidRequest(self.clone()).to_response(RequestId::Null)
    }
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|issue| match issue.path.first() {
                Some(field) => format!("{field}: {}", issue.message),
                None => issue.message.clone(),
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for EnvelopeError {}

/// Parse a raw body. Invalid JSON is reported the same way as a structurally
/// invalid envelope.
pub fn parse_request_str(raw: &str) -> Result<JsonRpcRequest, EnvelopeError> {
    parse_request_slice(raw.as_bytes())
}

/// Byte-slice variant of [`parse_request_str`].
pub fn parse_request_slice(raw: &[u8]) -> Result<JsonRpcRequest, EnvelopeError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| EnvelopeError::root(format!("Body is not valid JSON: {e}")))?;
    parse_request(value)
}

/// Validate an already-decoded body and build the request from it.
pub fn parse_request(value: Value) -> Result<JsonRpcRequest, EnvelopeError> {
    let mut object = match value {
        Value::Object(map) => map,
        Value::Array(_) => return Err(EnvelopeError::root("Batch requests are not supported")),
        other => {
            return Err(EnvelopeError::new(vec![Issue::invalid_type(
                Vec::new(),
                "object",
                &other,
            )]))
        }
    };

    let mut issues = Vec::new();
    check_version(&object, &mut issues);
    let method = take_method(&mut object, &mut issues);
    let id = take_id(&mut object, &mut issues);

    match (method, id) {
        (Some(method), Some(id)) if issues.is_empty() => Ok(JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method,
            params: object.remove("params"),
            id,
        }),
        _ => Err(EnvelopeError::new(issues)),
    }
}

fn field_path(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

fn check_version(object: &Map<String, Value>, issues: &mut Vec<Issue>) {
    match object.get("jsonrpc") {
        None => issues.push(Issue::required(field_path("jsonrpc"))),
        Some(Value::String(v)) if v == JSONRPC_VERSION => {}
        Some(other) => issues.push(Issue {
            path: field_path("jsonrpc"),
            code: IssueCode::InvalidLiteral,
            message: format!("Invalid literal value, expected \"{JSONRPC_VERSION}\""),
            expected: Some(JSONRPC_VERSION.to_string()),
            received: Some(other.to_string()),
        }),
    }
}

fn take_method(object: &mut Map<String, Value>, issues: &mut Vec<Issue>) -> Option<String> {
    match object.remove("method") {
        None => {
            issues.push(Issue::required(field_path("method")));
            None
        }
        Some(Value::String(method)) => Some(method),
        Some(other) => {
            issues.push(Issue::invalid_type(field_path("method"), "string", &other));
            None
        }
    }
}

fn take_id(object: &mut Map<String, Value>, issues: &mut Vec<Issue>) -> Option<RequestId> {
    match object.remove("id") {
        None => {
            issues.push(Issue::required(field_path("id")));
            None
        }
        Some(Value::Null) => Some(RequestId::Null),
        Some(Value::String(s)) => Some(RequestId::String(s)),
        Some(Value::Number(n)) => Some(RequestId::Number(n)),
        Some(other) => {
            issues.push(Issue {
                path: field_path("id"),
                code: IssueCode::InvalidType,
                message: format!(
                    "Expected number | string | null, received {}",
                    value_kind(&other)
                ),
                expected: Some("number | string | null".to_string()),
                received: Some(value_kind(&other).to_string()),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(err: &EnvelopeError) -> Vec<String> {
        err.issues.iter().map(|i| i.path.join(".")).collect()
    }

    #[test]
    fn test_valid_envelope() {
        let req = parse_request(json!({
            "jsonrpc": "2.0",
            "method": "hello",
            "params": {"name": "Test"},
            "id": 1
        }))
        .unwrap();
        assert_eq!(req.method, "hello");
        assert_eq!(req.id, RequestId::from(1));
        assert_eq!(req.params, Some(json!({"name": "Test"})));
    }

    #[test]
    fn test_params_are_optional_and_id_may_be_null() {
        let req = parse_request(json!({"jsonrpc": "2.0", "method": "getTime", "id": null})).unwrap();
        assert!(req.params.is_none());
        assert_eq!(req.id, RequestId::Null);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = parse_request(json!({"jsonrpc": "2.0", "method": "hello"})).unwrap_err();
        assert_eq!(paths(&err), vec!["id"]);
        assert_eq!(err.issues[0].code, IssueCode::Required);
    }

    #[test]
    fn test_wrong_version_and_method_type_reported_together() {
        let err = parse_request(json!({"jsonrpc": "1.0", "method": 5, "id": 1})).unwrap_err();
        assert_eq!(paths(&err), vec!["jsonrpc", "method"]);
        assert_eq!(err.issues[0].code, IssueCode::InvalidLiteral);
        assert_eq!(err.issues[1].code, IssueCode::InvalidType);
    }

    #[test]
    fn test_object_id_rejected() {
        let err = parse_request(json!({"jsonrpc": "2.0", "method": "m", "id": {}})).unwrap_err();
        assert_eq!(err.issues[0].received.as_deref(), Some("object"));
    }

    #[test]
    fn test_batch_rejected() {
        let err = parse_request(json!([{"jsonrpc": "2.0", "method": "m", "id": 1}])).unwrap_err();
        assert!(err.to_string().contains("Batch"));
    }

    #[test]
    fn test_invalid_json_body() {
        let err = parse_request_str(r#"{"broken":"#).unwrap_err();
        assert!(err.to_string().starts_with("Body is not valid JSON"));
    }

    #[test]
    fn test_error_response_shape() {
        let err = parse_request(json!("hello")).unwrap_err();
        let value = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32600);
        assert_eq!(value["error"]["message"], "Invalid Request");
        assert_eq!(value["error"]["data"]["issues"][0]["code"], "invalid_type");
    }
}

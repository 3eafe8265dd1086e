//! Parameter validation.
//!
//! A [`Validator`] inspects the raw `params` of a request before the handler
//! runs. [`ParamsSchema`] derives one from a `schemars::JsonSchema` params
//! struct; anything more specific can implement the trait directly or use a
//! closure.

use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Capability interface for parameter schemas.
pub trait Validator: Send + Sync {
    /// Check `params` (absent when the request carried none).
    fn validate(&self, params: Option<&Value>) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(Option<&Value>) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, params: Option<&Value>) -> Result<(), ValidationError> {
        self(params)
    }
}

/// Kind of violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Required,
    InvalidType,
    InvalidLiteral,
    TooSmall,
    Custom,
}

/// One violation, located by the path of keys leading to the offending value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub path: Vec<String>,
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl Issue {
    pub fn required(path: Vec<String>) -> Self {
        Self {
            path,
            code: IssueCode::Required,
            message: "Required".to_string(),
            expected: None,
            received: None,
        }
    }

    pub fn invalid_type(path: Vec<String>, expected: &str, received: &Value) -> Self {
        let received = value_kind(received);
        Self {
            path,
            code: IssueCode::InvalidType,
            message: format!("Expected {expected}, received {received}"),
            expected: Some(expected.to_string()),
            received: Some(received.to_string()),
        }
    }

    pub fn custom(path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            path,
            code: IssueCode::Custom,
            message: message.into(),
            expected: None,
            received: None,
        }
    }
}

/// Structured description of everything wrong with a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({ "issues": [] }))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|issue| {
                if issue.path.is_empty() {
                    issue.message.clone()
                } else {
                    format!("{}: {}", issue.path.join("."), issue.message)
                }
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Type name used in issue messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parameter schema generated from a typed params struct.
///
/// The same `JsonSchema` derive that documents a method drives its
/// validation, so the two cannot disagree. Checked keywords: `type`,
/// `required`, `properties`, `enum`, `minLength`, `minItems`, `minimum`, and
/// local `$ref`s into `$defs`. Unknown keys are ignored. Absent params fail
/// with a root-level `required` issue whenever the root declares a type.
#[derive(Debug, Clone)]
pub struct ParamsSchema {
    schema: Schema,
}

impl ParamsSchema {
    pub fn of<T: JsonSchema>() -> Self {
        Self {
            schema: schema_for!(T),
        }
    }

    pub fn from_schema(schema: Schema) -> Self {
        Self { schema }
    }

    /// The JSON Schema document, for introspection output.
    pub fn as_json(&self) -> &Value {
        self.schema.as_value()
    }

    fn resolve<'a>(&'a self, node: &'a Value) -> &'a Value {
        node.get("$ref")
            .and_then(Value::as_str)
            .and_then(|reference| reference.strip_prefix('#'))
            .and_then(|pointer| self.as_json().pointer(pointer))
            .unwrap_or(node)
    }

    fn check(&self, path: Vec<String>, node: &Value, value: &Value, issues: &mut Vec<Issue>) {
        let node = self.resolve(node);

        if let Some(types) = node.get("type") {
            let names: Vec<&str> = match types {
                Value::String(name) => vec![name.as_str()],
                Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            if !names.is_empty() && !names.iter().any(|name| type_accepts(name, value)) {
                issues.push(Issue::invalid_type(path, &names.join(" | "), value));
                return;
            }
        }

        if let Some(allowed) = node.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                let expected: Vec<String> = allowed.iter().map(Value::to_string).collect();
                issues.push(Issue {
                    path,
                    code: IssueCode::InvalidLiteral,
                    message: format!("Expected one of {}", expected.join(" | ")),
                    expected: Some(expected.join(" | ")),
                    received: Some(value.to_string()),
                });
                return;
            }
        }

        match value {
            Value::String(s) => {
                if let Some(min) = node.get("minLength").and_then(Value::as_u64) {
                    too_small(path, s.chars().count() as u64, min, "String", "character(s)", issues);
                }
            }
            Value::Array(items) => {
                if let Some(min) = node.get("minItems").and_then(Value::as_u64) {
                    too_small(path, items.len() as u64, min, "Array", "element(s)", issues);
                }
            }
            Value::Number(n) => {
                if let (Some(min), Some(actual)) =
                    (node.get("minimum").and_then(Value::as_f64), n.as_f64())
                {
                    if actual < min {
                        issues.push(Issue {
                            path,
                            code: IssueCode::TooSmall,
                            message: format!("Number must be greater than or equal to {min}"),
                            expected: Some(format!(">= {min}")),
                            received: Some(n.to_string()),
                        });
                    }
                }
            }
            Value::Object(map) => {
                let Some(properties) = node.get("properties").and_then(Value::as_object) else {
                    return;
                };
                let required: Vec<&str> = node
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|names| names.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();

                for (name, property) in properties {
                    let mut field_path = path.clone();
                    field_path.push(name.clone());
                    match map.get(name) {
                        Some(field) => self.check(field_path, property, field, issues),
                        None if required.contains(&name.as_str()) => {
                            issues.push(Issue::required(field_path))
                        }
                        None => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn type_accepts(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn too_small(
    path: Vec<String>,
    len: u64,
    min: u64,
    noun: &str,
    unit: &str,
    issues: &mut Vec<Issue>,
) {
    if len < min {
        issues.push(Issue {
            path,
            code: IssueCode::TooSmall,
            message: format!("{noun} must contain at least {min} {unit}"),
            expected: Some(format!(">= {min}")),
            received: Some(len.to_string()),
        });
    }
}

impl Validator for ParamsSchema {
    fn validate(&self, params: Option<&Value>) -> Result<(), ValidationError> {
        let root = self.as_json();
        let mut issues = Vec::new();
        match params {
            Some(value) => self.check(Vec::new(), root, value, &mut issues),
            None if root.get("type").is_some() => issues.push(Issue::required(Vec::new())),
            None => {}
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Greeting {
        #[schemars(length(min = 1))]
        name: String,
        /// Honorific
        #[serde(default)]
        #[schemars(with = "String")]
        title: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Pair {
        a: i64,
        b: bool,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Order {
        item: Item,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Item {
        #[schemars(range(min = 1))]
        count: i64,
    }

    fn greeting_schema() -> ParamsSchema {
        ParamsSchema::of::<Greeting>()
    }

    #[test]
    fn test_valid_object_passes() {
        let params = json!({"name": "Test", "extra": true});
        assert!(greeting_schema().validate(Some(&params)).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let err = greeting_schema().validate(Some(&json!({}))).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, vec!["name".to_string()]);
        assert_eq!(err.issues[0].code, IssueCode::Required);
    }

    #[test]
    fn test_wrong_type_reports_expected_and_received() {
        let err = greeting_schema()
            .validate(Some(&json!({"name": 42})))
            .unwrap_err();
        let issue = &err.issues[0];
        assert_eq!(issue.code, IssueCode::InvalidType);
        assert_eq!(issue.expected.as_deref(), Some("string"));
        assert_eq!(issue.received.as_deref(), Some("number"));
    }

    #[test]
    fn test_empty_string_is_too_small() {
        let err = greeting_schema()
            .validate(Some(&json!({"name": ""})))
            .unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
        assert_eq!(
            err.issues[0].message,
            "String must contain at least 1 character(s)"
        );
    }

    #[test]
    fn test_absent_params_fail_object_schema() {
        let err = greeting_schema().validate(None).unwrap_err();
        assert!(err.issues[0].path.is_empty());
        assert_eq!(err.issues[0].code, IssueCode::Required);
    }

    #[test]
    fn test_positional_params_rejected() {
        let err = greeting_schema()
            .validate(Some(&json!(["Test"])))
            .unwrap_err();
        assert_eq!(err.issues[0].received.as_deref(), Some("array"));
    }

    #[test]
    fn test_optional_field_may_be_absent_but_not_null() {
        let schema = greeting_schema();
        assert!(schema.validate(Some(&json!({"name": "a"}))).is_ok());
        let err = schema
            .validate(Some(&json!({"name": "a", "title": null})))
            .unwrap_err();
        assert_eq!(err.issues[0].path, vec!["title".to_string()]);
    }

    #[test]
    fn test_collects_every_issue() {
        let schema = ParamsSchema::of::<Pair>();
        let err = schema.validate(Some(&json!({"a": 1.5}))).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert_eq!(err.to_string(), "a: Expected integer, received number; b: Required");
    }

    #[test]
    fn test_nested_struct_is_followed_through_ref() {
        let schema = ParamsSchema::of::<Order>();
        assert!(schema.validate(Some(&json!({"item": {"count": 2}}))).is_ok());

        let err = schema
            .validate(Some(&json!({"item": {"count": 0}})))
            .unwrap_err();
        assert_eq!(err.issues[0].path, vec!["item".to_string(), "count".to_string()]);
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);

        let err = schema.validate(Some(&json!({"item": {}}))).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::Required);
    }

    #[test]
    fn test_closure_validator() {
        let even = |params: Option<&Value>| match params.and_then(Value::as_i64) {
            Some(n) if n % 2 == 0 => Ok(()),
            _ => Err(ValidationError::single(Issue::custom(Vec::new(), "expected an even number"))),
        };
        assert!(even.validate(Some(&json!(4))).is_ok());
        assert!(even.validate(Some(&json!(3))).is_err());
    }

    #[test]
    fn test_introspection_comes_from_the_struct() {
        let schema = greeting_schema();
        let doc = schema.as_json();
        assert_eq!(doc["type"], "object");
        assert_eq!(doc["properties"]["name"]["minLength"], 1);
        assert_eq!(doc["properties"]["title"]["type"], "string");
        assert_eq!(doc["properties"]["title"]["description"], "Honorific");
        assert_eq!(doc["required"], json!(["name"]));
    }
}

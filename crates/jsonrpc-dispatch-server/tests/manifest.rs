//! Method manifests loaded from disk.

use std::io::Write;

use serde_json::json;

use jsonrpc_dispatch::{JsonRpcRequest, RequestId};
use jsonrpc_dispatch_server::handlers::MethodTable;
use jsonrpc_dispatch_server::ServerError;

fn write_manifest(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("methods.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_aliased_methods_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        &dir,
        r#"{"methods": [{"name": "greet", "handler": "hello"}, {"handler": "getTime"}]}"#,
    );

    let table = MethodTable::load(Some(&path)).unwrap();
    let dispatcher = table.dispatcher();
    assert_eq!(dispatcher.registry().method_names(), vec!["getTime", "greet"]);

    let resp = tokio_test::block_on(dispatcher.handle(JsonRpcRequest::new(
        1,
        "greet",
        Some(json!({"name": "Ada"})),
    )));
    assert_eq!(resp.result(), Some(&json!("Hello, Ada!")));

    // Only what the manifest names is exposed.
    let resp = tokio_test::block_on(dispatcher.handle(JsonRpcRequest::new(
        "h",
        "hello",
        Some(json!({"name": "Ada"})),
    )));
    assert_eq!(resp.error_object().map(|e| e.code), Some(-32601));
    assert_eq!(resp.id(), &RequestId::from("h"));
}

#[test]
fn test_unresolvable_entry_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        &dir,
        r#"{"methods": [{"handler": "hello"}, {"name": "sum", "handler": "math/add"}]}"#,
    );

    let err = MethodTable::load(Some(&path)).err().expect("load must fail");
    assert!(matches!(err, ServerError::UnknownHandler { .. }));
    assert_eq!(
        err.to_string(),
        "Method 'sum' refers to unknown handler 'math/add'"
    );
}

#[test]
fn test_malformed_manifest_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, r#"{"methods": [{"handler": }]}"#);

    let err = MethodTable::load(Some(&path)).err().expect("load must fail");
    assert!(matches!(err, ServerError::ManifestParse { .. }));
    assert!(err.to_string().contains("methods.json"));
}

#[test]
fn test_no_manifest_means_builtins() {
    let table = MethodTable::load(None).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.get("hello").is_some());
    assert!(table.get("getTime").is_some());
}

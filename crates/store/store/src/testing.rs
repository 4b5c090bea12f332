//! Conformance tests shared by store backends.

use crate::error::KvError;
use crate::store::KvStore;

/// Run the full store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_store_conformance_tests(store: &dyn KvStore) -> Result<(), KvError> {
    test_get_missing(store).await?;
    test_set_and_get(store).await?;
    test_overwrite(store).await?;
    test_remove(store).await?;
    test_json_value_roundtrip(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn KvStore) -> Result<(), KvError> {
    let val = store.get("missing").await?;
    assert!(val.is_none(), "get on missing key should return None");
    Ok(())
}

async fn test_set_and_get(store: &dyn KvStore) -> Result<(), KvError> {
    store.set("set-get", "hello").await?;
    let val = store.get("set-get").await?;
    assert_eq!(val.as_deref(), Some("hello"));
    Ok(())
}

async fn test_overwrite(store: &dyn KvStore) -> Result<(), KvError> {
    store.set("overwrite", "v1").await?;
    store.set("overwrite", "v2").await?;
    let val = store.get("overwrite").await?;
    assert_eq!(val.as_deref(), Some("v2"), "second set should win");
    Ok(())
}

async fn test_remove(store: &dyn KvStore) -> Result<(), KvError> {
    store.set("to-remove", "bye").await?;
    let existed = store.remove("to-remove").await?;
    assert!(existed, "remove should return true for existing key");
    let val = store.get("to-remove").await?;
    assert!(val.is_none(), "get after remove should return None");

    let existed = store.remove("to-remove").await?;
    assert!(!existed, "remove on missing key should return false");
    Ok(())
}

async fn test_json_value_roundtrip(store: &dyn KvStore) -> Result<(), KvError> {
    // Stored user records are JSON documents; they must survive verbatim.
    let user = r#"{"id":7,"username":"magnus","email":"magnus@example.com"}"#;
    store.set("user", user).await?;
    let val = store.get("user").await?;
    assert_eq!(val.as_deref(), Some(user));
    Ok(())
}

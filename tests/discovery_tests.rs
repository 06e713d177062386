//! Index discovery tests
//!
//! Age filtering, newest-first ordering and alias lookups against a scripted store.
//! Run with: cargo test --test discovery_tests

use indexkeeper::{IndexDiscovery, IndexError, InMemoryTransport, Method};
use serde_json::json;
use std::sync::Arc;

const SETTINGS_PATH: &str = "/products*/_settings/index.creation_date";

fn settings_response() -> serde_json::Value {
    json!({
        "products_a": {"settings": {"index": {"creation_date": "1525225677001"}}},
        "products_b": {"settings": {"index": {"creation_date": "1525225676001"}}},
        "products_c": {"settings": {"index": {"creation_date": "1525225676002"}}}
    })
}

#[tokio::test]
async fn test_older_than_sorts_newest_of_old_first() {
    let transport = InMemoryTransport::new().respond(Method::Get, SETTINGS_PATH, 200, settings_response());
    let discovery = IndexDiscovery::new(Arc::new(transport.clone()));

    let old = discovery
        .indices_older_than("products", 1525225677000)
        .await
        .unwrap();

    assert_eq!(old, vec!["products_c", "products_b"]);
    assert_eq!(transport.requests()[0].path, SETTINGS_PATH);
}

#[tokio::test]
async fn test_cutoff_is_strict() {
    let transport = InMemoryTransport::new().respond(Method::Get, SETTINGS_PATH, 200, settings_response());
    let discovery = IndexDiscovery::new(Arc::new(transport));

    let old = discovery
        .indices_older_than("products", 1525225676001)
        .await
        .unwrap();

    assert!(old.is_empty());
}

#[tokio::test]
async fn test_cutoff_after_everything_returns_all() {
    let transport = InMemoryTransport::new().respond(Method::Get, SETTINGS_PATH, 200, settings_response());
    let discovery = IndexDiscovery::new(Arc::new(transport));

    let old = discovery.indices_older_than("products", i64::MAX).await.unwrap();

    assert_eq!(old, vec!["products_a", "products_c", "products_b"]);
}

#[tokio::test]
async fn test_empty_prefix_fails_before_network() {
    let transport = InMemoryTransport::new();
    let discovery = IndexDiscovery::new(Arc::new(transport.clone()));

    let err = discovery.indices_older_than("", 0).await.unwrap_err();

    assert!(matches!(err, IndexError::Validation(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_store_errors_propagate_unchanged() {
    let transport = InMemoryTransport::new().respond_raw(Method::Get, SETTINGS_PATH, 503, "cluster unavailable");
    let discovery = IndexDiscovery::new(Arc::new(transport));

    match discovery.indices_older_than("products", 0).await {
        Err(IndexError::Store { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "cluster unavailable");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreadable_creation_date_is_reported() {
    let transport = InMemoryTransport::new().respond(
        Method::Get,
        SETTINGS_PATH,
        200,
        json!({"products_a": {"settings": {"index": {}}}}),
    );
    let discovery = IndexDiscovery::new(Arc::new(transport));

    let err = discovery.indices_older_than("products", 0).await.unwrap_err();
    assert!(matches!(err, IndexError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_alias_lookup_lists_bound_indices() {
    let transport = InMemoryTransport::new().respond(
        Method::Get,
        "/_alias/products",
        200,
        json!({
            "products_20180502_010757": {"aliases": {"products": {}}},
            "products_20180503_010757": {"aliases": {"products": {}}}
        }),
    );
    let discovery = IndexDiscovery::new(Arc::new(transport));

    let bound = discovery.indices_for_alias("products").await.unwrap();

    assert_eq!(bound, vec!["products_20180502_010757", "products_20180503_010757"]);
}

#[tokio::test]
async fn test_missing_alias_is_empty() {
    let transport = InMemoryTransport::new().respond(
        Method::Get,
        "/_alias/products",
        404,
        json!({"error": "alias [products] missing", "status": 404}),
    );
    let discovery = IndexDiscovery::new(Arc::new(transport));

    assert!(discovery.indices_for_alias("products").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_alias_lookup_other_errors_propagate() {
    let transport = InMemoryTransport::new().respond_raw(Method::Get, "/_alias/products", 500, "boom");
    let discovery = IndexDiscovery::new(Arc::new(transport));

    let err = discovery.indices_for_alias("products").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[tokio::test]
async fn test_alias_lookup_rejects_path_like_names() {
    let transport = InMemoryTransport::new();
    let discovery = IndexDiscovery::new(Arc::new(transport.clone()));

    for alias in ["Logs/../_all", "logs*", "logs alias"] {
        let err = discovery.indices_for_alias(alias).await.unwrap_err();
        assert!(matches!(err, IndexError::Validation(_)), "{} accepted", alias);
    }
    assert!(transport.requests().is_empty());
}

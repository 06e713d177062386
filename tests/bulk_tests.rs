//! Bulk write reconciliation tests
//!
//! Run with: cargo test --test bulk_tests

use indexkeeper::{
    BulkItemError, Document, DocumentWriter, IndexError, InMemoryTransport, Method, WriteResult,
};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_create_then_overwrite_same_id() {
    let transport = InMemoryTransport::new().respond(
        Method::Post,
        "/_bulk",
        200,
        json!({
            "took": 7,
            "errors": false,
            "items": [
                {"index": {"_index": "products", "_id": "12", "status": 201, "created": true}},
                {"index": {"_index": "products", "_id": "12", "status": 200, "created": false}}
            ]
        }),
    );
    let writer = DocumentWriter::new(Arc::new(transport.clone()));

    let documents = vec![
        Document::new("12", json!({"title": "Widget"})),
        Document::new("12", json!({"title": "Widget v2"})),
    ];
    let reconciliation = writer.index_document_bulk("products", &documents).await.unwrap();

    assert_eq!(reconciliation.created_ids, vec!["12"]);
    assert_eq!(reconciliation.updated_ids, vec!["12"]);
    assert!(reconciliation.errors.is_empty());

    let body = transport.requests()[0].ndjson().unwrap().to_string();
    let lines: Vec<serde_json::Value> = body
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(
        lines,
        vec![
            json!({"index": {"_index": "products", "_id": "12"}}),
            json!({"title": "Widget"}),
            json!({"index": {"_index": "products", "_id": "12"}}),
            json!({"title": "Widget v2"}),
        ]
    );
}

#[tokio::test]
async fn test_item_errors_are_data_not_failures() {
    let transport = InMemoryTransport::new().respond(
        Method::Post,
        "/_bulk",
        200,
        json!({
            "errors": true,
            "items": [{"index": {
                "_index": "products",
                "_id": "7",
                "status": 400,
                "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse field [price]",
                    "caused_by": {"type": "number_format_exception", "reason": "For input string: \"cheap\""}
                }
            }}]
        }),
    );
    let writer = DocumentWriter::new(Arc::new(transport));

    let reconciliation = writer
        .index_document_bulk("products", &[Document::new("7", json!({"price": "cheap"}))])
        .await
        .unwrap();

    assert!(reconciliation.created_ids.is_empty());
    assert!(reconciliation.updated_ids.is_empty());
    assert_eq!(reconciliation.errors.len(), 1);

    let failure = &reconciliation.errors[0];
    assert_eq!(failure.id, "7");
    assert_eq!(failure.error.error_type, "mapper_parsing_exception");
    let cause: &BulkItemError = failure.error.caused_by.as_deref().unwrap();
    assert_eq!(cause.error_type, "number_format_exception");
}

#[tokio::test]
async fn test_error_without_type_stays_per_item() {
    let transport = InMemoryTransport::new().respond(
        Method::Post,
        "/_bulk",
        200,
        json!({
            "errors": true,
            "items": [
                {"index": {"_id": "1", "status": 201, "result": "created"}},
                {"index": {"_id": "2", "status": 400, "error": {"reason": "rejected"}}}
            ]
        }),
    );
    let writer = DocumentWriter::new(Arc::new(transport));

    let documents = vec![
        Document::new("1", json!({"title": "kept"})),
        Document::new("2", json!({"title": "rejected"})),
    ];
    let reconciliation = writer.index_document_bulk("products", &documents).await.unwrap();

    assert_eq!(reconciliation.created_ids, vec!["1"]);
    assert_eq!(reconciliation.errors.len(), 1);
    assert_eq!(reconciliation.errors[0].id, "2");
    assert_eq!(reconciliation.errors[0].error.error_type, BulkItemError::UNTYPED);
    assert_eq!(reconciliation.errors[0].error.reason.as_deref(), Some("rejected"));
}

#[tokio::test]
async fn test_mixed_outcomes_keep_relative_order() {
    let transport = InMemoryTransport::new().respond(
        Method::Post,
        "/_bulk",
        200,
        json!({
            "errors": true,
            "items": [
                {"index": {"_id": "a", "status": 200, "result": "updated"}},
                {"index": {"_id": "b", "status": 201, "result": "created"}},
                {"index": {"_id": "c", "status": 429, "error": {"type": "es_rejected_execution_exception"}}},
                {"index": {"_id": "d", "status": 201, "result": "created"}},
                {"index": {"_id": "e", "status": 200, "result": "updated"}}
            ]
        }),
    );
    let writer = DocumentWriter::new(Arc::new(transport));

    let documents: Vec<Document> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|id| Document::new(*id, json!({"id": id})))
        .collect();
    let reconciliation = writer.index_document_bulk("products", &documents).await.unwrap();

    assert_eq!(reconciliation.created_ids, vec!["b", "d"]);
    assert_eq!(reconciliation.updated_ids, vec!["a", "e"]);
    assert_eq!(reconciliation.errors[0].id, "c");
    assert_eq!(reconciliation.total(), 5);
}

#[tokio::test]
async fn test_whole_request_failure_is_raised() {
    let transport = InMemoryTransport::new().respond_raw(Method::Post, "/_bulk", 500, "{\"error\":\"internal\"}");
    let writer = DocumentWriter::new(Arc::new(transport));

    match writer
        .index_document_bulk("products", &[Document::new("1", json!({}))])
        .await
    {
        Err(IndexError::Store { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "{\"error\":\"internal\"}");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_batch_sends_nothing() {
    let transport = InMemoryTransport::new();
    let writer = DocumentWriter::new(Arc::new(transport.clone()));

    let reconciliation = writer.index_document_bulk("products", &[]).await.unwrap();

    assert_eq!(reconciliation.total(), 0);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_single_document_write() {
    let transport = InMemoryTransport::new()
        .respond(
            Method::Put,
            "/products/_doc/sku%2F42",
            201,
            json!({"_id": "sku/42", "result": "created"}),
        )
        .respond(
            Method::Put,
            "/products/_doc/sku%2F42",
            200,
            json!({"_id": "sku/42", "result": "updated"}),
        );
    let writer = DocumentWriter::new(Arc::new(transport.clone()));

    let first = writer
        .index_document("products", "sku/42", &json!({"title": "Widget"}))
        .await
        .unwrap();
    let second = writer
        .index_document("products", "sku/42", &json!({"title": "Widget v2"}))
        .await
        .unwrap();

    assert_eq!(first, WriteResult::Created);
    assert_eq!(second, WriteResult::Updated);
    assert_eq!(
        transport.requests()[1].json().unwrap(),
        &json!({"title": "Widget v2"})
    );
}

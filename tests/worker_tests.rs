mod common;

use common::{client_with, FailingTransport, GatedTransport, PanickingTransport, StubTransport};
use kcal::models::NutrientKey;
use kcal::worker::{FetchOutcome, FetchTask, SearchKind, TaskState};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::test]
async fn test_barcode_task_end_to_end() {
    let transport = Arc::new(StubTransport::new().with_response(
        "/api/v2/product/123",
        json!({"product": {"code": "123", "product_name": "X", "nutriments": {"fat_100g": 1.0}}}),
    ));
    let client = client_with(transport);

    let outcome = FetchTask::new(SearchKind::Barcode, "123").start(client).wait().await;

    let products = match outcome {
        FetchOutcome::Completed(products) => products,
        FetchOutcome::Failed(message) => panic!("unexpected failure: {}", message),
    };
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].code.as_deref(), Some("123"));
    assert_eq!(products[0].name.as_deref(), Some("X"));
    assert_eq!(products[0].nutrient_summary().get(NutrientKey::Fat100g), Some(1.0));
}

#[tokio::test]
async fn test_barcode_without_product_is_empty_not_failure() {
    let transport = Arc::new(StubTransport::new().with_response(
        "/api/v2/product/999",
        json!({"status": 0, "status_verbose": "product not found"}),
    ));

    let outcome = FetchTask::new(SearchKind::Barcode, "999")
        .start(client_with(transport))
        .wait()
        .await;

    assert_eq!(outcome, FetchOutcome::Completed(vec![]));
    assert!(outcome.is_not_found());
}

#[tokio::test]
async fn test_text_task_requests_ten_results() {
    let transport = Arc::new(StubTransport::new().with_response(
        "/api/v2/search",
        json!({"count": 2, "products": [{"code": "1", "product_name": "Milk"}, {"code": "2"}]}),
    ));

    let outcome = FetchTask::new(SearchKind::Text, "milk")
        .start(client_with(transport.clone()))
        .wait()
        .await;

    assert_eq!(outcome.products().map(|p| p.len()), Some(2));
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].param("page_size"), Some("10"));
    assert_eq!(calls[0].param("search_terms"), Some("milk"));
}

#[tokio::test]
async fn test_transport_error_becomes_failure() {
    let mut handle =
        FetchTask::new(SearchKind::Text, "bread").start(client_with(Arc::new(FailingTransport)));

    let outcome = handle.outcome().await;
    match &outcome {
        FetchOutcome::Failed(message) => assert!(message.contains("connection refused")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(handle.state(), TaskState::Failed);
}

#[tokio::test]
async fn test_status_error_becomes_failure() {
    let outcome = FetchTask::new(SearchKind::Barcode, "404")
        .start(client_with(Arc::new(StubTransport::new())))
        .wait()
        .await;

    match outcome {
        FetchOutcome::Failed(message) => assert_eq!(message, "HTTP 404: not found"),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_panic_in_lookup_becomes_failure() {
    let outcome = FetchTask::new(SearchKind::Barcode, "1")
        .start(client_with(Arc::new(PanickingTransport)))
        .wait()
        .await;

    match outcome {
        FetchOutcome::Failed(message) => {
            assert!(!message.is_empty());
            assert!(message.contains("transport exploded"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_state_transitions_and_repeatable_outcome() {
    let gate = Arc::new(Notify::new());
    let transport = Arc::new(GatedTransport {
        gate: gate.clone(),
        body: json!({"product": {"code": "42"}}),
    });

    let task = FetchTask::new(SearchKind::Barcode, "42");
    assert_eq!(task.state(), TaskState::Idle);

    let mut handle = task.start(client_with(transport));
    assert_eq!(handle.state(), TaskState::Running);
    assert_eq!(handle.kind(), SearchKind::Barcode);
    assert_eq!(handle.query(), "42");

    gate.notify_one();
    let first = handle.outcome().await;
    assert_eq!(handle.state(), TaskState::Completed);

    let second = handle.outcome().await;
    assert_eq!(first, second);
    assert_eq!(first.products().map(|p| p.len()), Some(1));
}

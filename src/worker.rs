//! Background fetch task.
//!
//! A [`FetchTask`] runs one query on a spawned tokio task so the caller never
//! waits on the network. The single terminal outcome travels back through a
//! one-shot channel to the [`FetchHandle`] returned by [`FetchTask::start`].

use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::api::{ApiError, NutritionClient};
use crate::config::TASK_PAGE_SIZE;
use crate::models::Product;

/// What the query string means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Barcode,
    Text,
}

impl SearchKind {
    pub fn label(&self) -> &'static str {
        match self {
            SearchKind::Barcode => "barcode",
            SearchKind::Text => "text",
        }
    }
}

/// Terminal outcome of one fetch task.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Matching records; empty means nothing was found
    Completed(Vec<Product>),
    /// Human-readable reason the query failed, never empty
    Failed(String),
}

impl FetchOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchOutcome::Completed(products) if products.is_empty())
    }

    pub fn products(&self) -> Option<&[Product]> {
        match self {
            FetchOutcome::Completed(products) => Some(products),
            FetchOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// A query that has not been started yet.
#[derive(Debug, Clone)]
pub struct FetchTask {
    kind: SearchKind,
    query: String,
}

impl FetchTask {
    pub fn new(kind: SearchKind, query: impl Into<String>) -> Self {
        Self {
            kind,
            query: query.into(),
        }
    }

    pub fn state(&self) -> TaskState {
        TaskState::Idle
    }

    /// Spawn the query on the current tokio runtime.
    ///
    /// Consumes the task; a finished task cannot be restarted. Errors and
    /// panics inside the lookup are turned into [`FetchOutcome::Failed`].
    pub fn start(self, client: NutritionClient) -> FetchHandle {
        let (tx, rx) = oneshot::channel();
        let FetchTask { kind, query } = self;
        let task_query = query.clone();

        tokio::spawn(async move {
            let lookup = AssertUnwindSafe(run_query(&client, kind, &task_query)).catch_unwind();
            let outcome = match lookup.await {
                Ok(Ok(products)) => {
                    tracing::debug!(kind = kind.label(), count = products.len(), "Fetch completed");
                    FetchOutcome::Completed(products)
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        kind = kind.label(),
                        query = %task_query,
                        error = %e,
                        "Fetch failed"
                    );
                    FetchOutcome::Failed(e.to_string())
                }
                Err(panic) => {
                    let message = panic_message(panic);
                    tracing::error!(
                        kind = kind.label(),
                        query = %task_query,
                        %message,
                        "Fetch panicked"
                    );
                    FetchOutcome::Failed(message)
                }
            };
            if tx.send(outcome).is_err() {
                tracing::debug!("Fetch handle dropped before the outcome was delivered");
            }
        });

        FetchHandle {
            kind,
            query,
            rx: Some(rx),
            outcome: None,
        }
    }
}

/// Caller-side view of a running fetch task.
#[derive(Debug)]
pub struct FetchHandle {
    kind: SearchKind,
    query: String,
    rx: Option<oneshot::Receiver<FetchOutcome>>,
    outcome: Option<FetchOutcome>,
}

impl FetchHandle {
    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current state, without waiting.
    pub fn state(&mut self) -> TaskState {
        if self.outcome.is_none() {
            if let Some(rx) = self.rx.as_mut() {
                match rx.try_recv() {
                    Ok(outcome) => self.settle(outcome),
                    Err(TryRecvError::Empty) => return TaskState::Running,
                    Err(TryRecvError::Closed) => self.settle(lost_outcome()),
                }
            }
        }
        match &self.outcome {
            Some(FetchOutcome::Completed(_)) => TaskState::Completed,
            Some(FetchOutcome::Failed(_)) => TaskState::Failed,
            None => TaskState::Running,
        }
    }

    /// Wait for the terminal outcome. Safe to cancel and to call again.
    pub async fn outcome(&mut self) -> FetchOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let received = match self.rx.as_mut() {
            Some(rx) => rx.await.unwrap_or_else(|_| lost_outcome()),
            None => lost_outcome(),
        };
        self.settle(received.clone());
        received
    }

    pub async fn wait(mut self) -> FetchOutcome {
        self.outcome().await
    }

    fn settle(&mut self, outcome: FetchOutcome) {
        self.rx = None;
        self.outcome = Some(outcome);
    }
}

fn lost_outcome() -> FetchOutcome {
    FetchOutcome::Failed("fetch task ended without reporting a result".to_string())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    format!("lookup panicked: {}", detail)
}

async fn run_query(
    client: &NutritionClient,
    kind: SearchKind,
    query: &str,
) -> Result<Vec<Product>, ApiError> {
    match kind {
        SearchKind::Barcode => {
            let response = client.lookup_by_code(query).await?;
            Ok(products_from_lookup(&response))
        }
        SearchKind::Text => {
            let response = client.search_by_text(query, Some(TASK_PAGE_SIZE)).await?;
            Ok(products_from_search(&response))
        }
    }
}

/// One-element result set when the response carries a product object.
///
/// A missing product and an unexpectedly shaped one both give an empty set.
pub fn products_from_lookup(response: &Value) -> Vec<Product> {
    match response.get("product") {
        Some(Value::Object(obj)) if !obj.is_empty() => {
            vec![Product::from_value(&response["product"])]
        }
        None | Some(Value::Null) => vec![],
        Some(other) => {
            tracing::warn!(
                shape = %other,
                "Unexpected product shape in lookup response; treating as not found"
            );
            vec![]
        }
    }
}

pub fn products_from_search(response: &Value) -> Vec<Product> {
    response
        .get("products")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter(|item| item.is_object())
                .map(Product::from_value)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_with_product() {
        let products = products_from_lookup(&json!({"product": {"code": "123"}, "status": 1}));
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].code.as_deref(), Some("123"));
    }

    #[test]
    fn test_lookup_without_product() {
        let response = json!({"status": 0, "status_verbose": "product not found"});
        assert!(products_from_lookup(&response).is_empty());
        assert!(products_from_lookup(&json!({"product": null})).is_empty());
        assert!(products_from_lookup(&json!({"product": {}})).is_empty());
    }

    #[test]
    fn test_lookup_malformed_product_is_not_found() {
        assert!(products_from_lookup(&json!({"product": "oops"})).is_empty());
        assert!(products_from_lookup(&json!({"product": [1, 2]})).is_empty());
    }

    #[test]
    fn test_search_products() {
        let products = products_from_search(&json!({
            "count": 2,
            "products": [{"code": "1"}, "junk", {"code": "2"}]
        }));
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].code.as_deref(), Some("2"));
        assert!(products_from_search(&json!({})).is_empty());
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(FetchOutcome::Completed(vec![]).is_not_found());
        assert!(!FetchOutcome::Failed("x".into()).is_not_found());
        assert!(FetchOutcome::Failed("x".into()).products().is_none());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload), "lookup panicked: boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload), "lookup panicked: bang");
    }

    #[test]
    fn test_new_task_is_idle() {
        assert_eq!(FetchTask::new(SearchKind::Text, "milk").state(), TaskState::Idle);
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use kcal::api::{ApiError, NutritionClient, Transport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub struct Call {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl Call {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Answers with canned bodies per endpoint and records every call.
/// Unknown endpoints answer HTTP 404.
#[derive(Default)]
pub struct StubTransport {
    responses: HashMap<String, Value>,
    calls: Mutex<Vec<Call>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, endpoint: &str, body: Value) -> Self {
        self.responses.insert(endpoint.to_string(), body);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(Call {
            endpoint: endpoint.to_string(),
            params: params.to_vec(),
        });
        self.responses
            .get(endpoint)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: "not found".to_string(),
            })
    }
}

pub struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn get_json(
        &self,
        _endpoint: &str,
        _params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        Err(ApiError::Network("connection refused".to_string()))
    }
}

pub struct PanickingTransport;

#[async_trait]
impl Transport for PanickingTransport {
    async fn get_json(
        &self,
        _endpoint: &str,
        _params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        panic!("transport exploded");
    }
}

/// Holds every request until the gate is opened.
pub struct GatedTransport {
    pub gate: Arc<Notify>,
    pub body: Value,
}

#[async_trait]
impl Transport for GatedTransport {
    async fn get_json(
        &self,
        _endpoint: &str,
        _params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        self.gate.notified().await;
        Ok(self.body.clone())
    }
}

pub fn client_with<T: Transport + 'static>(transport: Arc<T>) -> NutritionClient {
    NutritionClient::new(transport)
}

use thiserror::Error;

use crate::api::NutritionClient;
use crate::models::Product;
use crate::worker::{FetchHandle, FetchOutcome, FetchTask, SearchKind};

/// Reasons a search could not be started
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A previous search has not reported its outcome yet
    #[error("A search is already in progress")]
    Busy,

    #[error("Enter a barcode")]
    EmptyBarcode,

    #[error("Enter a product name")]
    EmptyName,
}

/// Owns the in-flight fetch task for a front end.
///
/// At most one task runs at a time: [`SearchSession::begin`] refuses to start
/// another until the caller has observed the current one's outcome.
pub struct SearchSession {
    client: NutritionClient,
    in_flight: Option<FetchHandle>,
    results: Vec<Product>,
}

impl SearchSession {
    pub fn new(client: NutritionClient) -> Self {
        Self {
            client,
            in_flight: None,
            results: Vec::new(),
        }
    }

    pub fn client(&self) -> &NutritionClient {
        &self.client
    }

    /// Start a search. Must be called from within a tokio runtime.
    pub fn begin(&mut self, kind: SearchKind, query: &str) -> Result<(), SessionError> {
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(match kind {
                SearchKind::Barcode => SessionError::EmptyBarcode,
                SearchKind::Text => SessionError::EmptyName,
            });
        }

        tracing::info!(kind = kind.label(), %query, "Starting search");
        let handle = FetchTask::new(kind, query).start(self.client.clone());
        self.in_flight = Some(handle);
        Ok(())
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_mut(&mut self) -> Option<&mut FetchHandle> {
        self.in_flight.as_mut()
    }

    /// Record an observed outcome and release the in-flight slot.
    ///
    /// Only a non-empty result set replaces the remembered rows.
    pub fn finish(&mut self, outcome: &FetchOutcome) {
        self.in_flight = None;
        match outcome {
            FetchOutcome::Completed(products) if !products.is_empty() => {
                self.results = products.clone();
            }
            _ => {}
        }
    }

    /// Wait for the in-flight search, if any, and finish it.
    pub async fn wait(&mut self) -> Option<FetchOutcome> {
        let outcome = self.in_flight.as_mut()?.outcome().await;
        self.finish(&outcome);
        Some(outcome)
    }

    /// Rows from the last completed search.
    pub fn results(&self) -> &[Product] {
        &self.results
    }

    /// Row by 1-based position, as shown in the results table.
    pub fn selected(&self, row: usize) -> Option<&Product> {
        row.checked_sub(1).and_then(|idx| self.results.get(idx))
    }
}

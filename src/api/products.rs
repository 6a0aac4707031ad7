use serde_json::Value;
use std::sync::Arc;

use super::client::{HttpTransport, Transport};
use super::error::ApiError;
use crate::config::{
    Settings, DEFAULT_LOCALE, DEFAULT_PAGE_SIZE, DEFAULT_PRODUCT_FIELDS, DEFAULT_REGION,
    DEFAULT_SEARCH_FIELDS,
};

const PRODUCT_ENDPOINT: &str = "/api/v2/product";
const SEARCH_ENDPOINT: &str = "/api/v2/search";

/// Per-request knobs shared by both lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Comma-separated response fields; `None` uses the lookup's default list
    pub fields: Option<String>,
    /// Sent as `lc`
    pub locale: String,
    /// Sent as `cc`
    pub region: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            fields: None,
            locale: DEFAULT_LOCALE.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl QueryOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            fields: None,
            locale: settings.locale.clone(),
            region: settings.region.clone(),
        }
    }

    fn fields_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.fields.as_deref().unwrap_or(default)
    }
}

/// Client for the Open Food Facts product and search endpoints.
#[derive(Clone)]
pub struct NutritionClient {
    transport: Arc<dyn Transport>,
    options: QueryOptions,
}

impl NutritionClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_options(transport, QueryOptions::default())
    }

    pub fn with_options(transport: Arc<dyn Transport>, options: QueryOptions) -> Self {
        Self { transport, options }
    }

    /// Real HTTP client for the configured base URL, locale and region.
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&settings.base_url)?;
        Ok(Self::with_options(
            Arc::new(transport),
            QueryOptions::from_settings(settings),
        ))
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Look up one product by its exact code, using the client's options.
    pub async fn lookup_by_code(&self, code: &str) -> Result<Value, ApiError> {
        self.lookup_by_code_with(code, &self.options).await
    }

    /// Look up one product by its exact code.
    ///
    /// The code is not checked beyond being non-empty.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for an empty code, otherwise any
    /// transport error from the request.
    pub async fn lookup_by_code_with(
        &self,
        code: &str,
        options: &QueryOptions,
    ) -> Result<Value, ApiError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::InvalidInput("product code cannot be empty".into()));
        }

        let endpoint = format!("{}/{}", PRODUCT_ENDPOINT, urlencoding::encode(code));
        let params = vec![
            ("fields".to_string(), options.fields_or(DEFAULT_PRODUCT_FIELDS).to_string()),
            ("lc".to_string(), options.locale.clone()),
            ("cc".to_string(), options.region.clone()),
        ];
        tracing::debug!(%code, "Looking up product by code");
        self.transport.get_json(&endpoint, &params).await
    }

    /// Free-text search using the client's options.
    pub async fn search_by_text(
        &self,
        query: &str,
        page_size: Option<u32>,
    ) -> Result<Value, ApiError> {
        self.search_by_text_with(query, page_size, &self.options).await
    }

    /// Free-text search capped at `page_size` results (5 when `None`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for an empty query, otherwise any
    /// transport error from the request.
    pub async fn search_by_text_with(
        &self,
        query: &str,
        page_size: Option<u32>,
        options: &QueryOptions,
    ) -> Result<Value, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::InvalidInput("search query cannot be empty".into()));
        }

        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let params = vec![
            ("search_terms".to_string(), query.to_string()),
            ("fields".to_string(), options.fields_or(DEFAULT_SEARCH_FIELDS).to_string()),
            ("page_size".to_string(), page_size.to_string()),
            ("lc".to_string(), options.locale.clone()),
            ("cc".to_string(), options.region.clone()),
        ];
        tracing::debug!(%query, page_size, "Searching products");
        self.transport.get_json(SEARCH_ENDPOINT, &params).await
    }
}

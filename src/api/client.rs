use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use urlencoding::encode;
use yansi::Paint;

use super::error::ApiError;
use crate::config::{sanitize_base_url, REQUEST_TIMEOUT, USER_AGENT};

const MAX_ERROR_BODY: usize = 200;

static SILENT: AtomicBool = AtomicBool::new(false);

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// Something that can GET a JSON document relative to the API base URL.
///
/// [`HttpTransport`] is the real implementation; tests plug in stubs.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, ApiError>;
}

/// reqwest-backed transport carrying the fixed timeout and identifying header.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: sanitize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        api_call(&self.client, &self.base_url, endpoint, params).await
    }
}

/// Core HTTP call shared by every lookup.
/// Logs the request as a curl line, then maps transport failures, non-success
/// statuses and undecodable bodies to [`ApiError`].
pub async fn api_call(
    client: &reqwest::Client,
    api_base_url: &str,
    endpoint: &str,
    params: &[(String, String)],
) -> Result<Value, ApiError> {
    // --- Curl Logging ---
    let mut url_for_log = format!("{}{}", api_base_url, endpoint);
    if !params.is_empty() {
        url_for_log = format!("{}?{}", url_for_log, query_string(params));
    }

    let parts = [
        Paint::new("curl").fg(yansi::Color::Green).bold().to_string(),
        format!("-X {}", Paint::new("GET").fg(yansi::Color::Yellow).bold()),
        format!("'{}'", Paint::new(&url_for_log).fg(yansi::Color::Cyan)),
        format!(
            "{} {}",
            Paint::new("-H").fg(yansi::Color::Magenta),
            Paint::new(format!("'User-Agent: {}'", USER_AGENT)).fg(yansi::Color::Magenta)
        ),
    ];
    log_output(format!("Request:\n{}", parts.join(" ")));
    // --------------------

    let url = format!("{}{}", api_base_url, endpoint);
    tracing::debug!(%url, "Sending request");

    let response = client
        .get(&url)
        .query(params)
        .send()
        .await
        .map_err(map_reqwest_error)?;

    let status = response.status();
    let text = response.text().await.map_err(map_reqwest_error)?;

    // Grayed out color (dimmed/dark gray)
    log_output(format!("Response:\n{}", Paint::new(&text).rgb(100, 100, 100)));

    if !status.is_success() {
        tracing::debug!(status = status.as_u16(), "Request rejected");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: truncate(&text, MAX_ERROR_BODY),
        });
    }

    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(REQUEST_TIMEOUT.as_secs())
    } else {
        ApiError::Network(e.to_string())
    }
}

fn query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encodes_values() {
        let pairs = vec![
            ("search_terms".to_string(), "peanut butter".to_string()),
            ("fields".to_string(), "code,product_name".to_string()),
        ];
        assert_eq!(
            query_string(&pairs),
            "search_terms=peanut%20butter&fields=code%2Cproduct_name"
        );
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(250);
        let out = truncate(&body, 200);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate("  short  ", 200), "short");
    }

    #[test]
    fn test_transport_sanitizes_base_url() {
        let transport = HttpTransport::new("https://world.openfoodfacts.org/").unwrap();
        assert_eq!(transport.base_url(), "https://world.openfoodfacts.org");
    }
}

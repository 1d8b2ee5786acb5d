use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Providers see at most this many characters of document text.
pub const SUMMARY_INPUT_CHAR_LIMIT: usize = 512;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SUMMARY_LENGTH: u32 = 100;
const MIN_SUMMARY_LENGTH: u32 = 30;

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("Summarizer not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    ModelMissing(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<SummarizerError> for AppError {
    fn from(err: SummarizerError) -> Self {
        match err {
            SummarizerError::Timeout(msg) => AppError::GatewayTimeout(msg),
            SummarizerError::RateLimited(msg) => AppError::TooManyRequests(msg, None),
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}

/// Abstraction over the summary backend so handlers and the upload pipeline
/// never care which provider is wired in.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError>;
}

/// First `max_chars` characters of `text`, respecting char boundaries.
pub fn truncate_to_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Whether extracted text is worth sending to a provider. Extraction-failure
/// markers and blank content are not.
pub fn is_summarizable(content: &str) -> bool {
    !content.trim().is_empty() && !content.contains("Error extracting")
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_length: u32,
    min_length: u32,
}

#[derive(Deserialize)]
struct InferenceSummary {
    summary_text: String,
}

/// Hugging Face inference-API client (BART summarization model).
pub struct HuggingFaceSummarizer {
    client: Client,
    api_url: String,
    api_token: Option<String>,
}

impl HuggingFaceSummarizer {
    pub fn new(api_url: String, api_token: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            api_url,
            api_token,
        })
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                max_length: MAX_SUMMARY_LENGTH,
                min_length: MIN_SUMMARY_LENGTH,
            },
        };

        let mut builder = self.client.post(&self.api_url).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(input_len = text.len(), "Requesting summary from Hugging Face");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                SummarizerError::Timeout("Hugging Face API timed out".to_string())
            } else {
                SummarizerError::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => SummarizerError::RateLimited(
                    "Hugging Face API rate limit exceeded".to_string(),
                ),
                StatusCode::NOT_FOUND => {
                    SummarizerError::ModelMissing("Hugging Face model not found".to_string())
                }
                _ => SummarizerError::Api(format!(
                    "Hugging Face API error {}: {}",
                    status, error_text
                )),
            });
        }

        let items: Vec<InferenceSummary> = response
            .json()
            .await
            .map_err(|e| SummarizerError::Api(format!("Failed to parse response: {}", e)))?;

        items
            .into_iter()
            .next()
            .map(|item| item.summary_text)
            .filter(|summary| !summary.is_empty())
            .ok_or_else(|| SummarizerError::Api("Failed to generate summary".to_string()))
    }
}

/// Deterministic summarizer for tests and offline development. Counts calls
/// so tests can assert on cache hits.
pub struct MockSummarizer {
    enabled: bool,
    calls: AtomicUsize,
}

impl MockSummarizer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Err(SummarizerError::NotConfigured(
                "mock summarizer disabled".to_string(),
            ));
        }
        let head: String = text.chars().take(60).collect();
        Ok(format!("Summary: {}", head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_to_chars("héllo", 2), "hé");
        assert_eq!(truncate_to_chars("short", 512), "short");
        assert_eq!(truncate_to_chars("", 10), "");
    }

    #[test]
    fn extraction_markers_are_not_summarizable() {
        assert!(is_summarizable("real document text"));
        assert!(!is_summarizable(""));
        assert!(!is_summarizable("   \n"));
        assert!(!is_summarizable("Error extracting text: broken xref"));
    }

    #[tokio::test]
    async fn mock_summarizer_counts_calls() {
        let mock = MockSummarizer::new(true);
        let summary = mock.summarize("some document text").await.unwrap();
        assert!(summary.starts_with("Summary: "));
        assert_eq!(mock.calls(), 1);

        mock.summarize("more").await.unwrap();
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn disabled_mock_reports_not_configured() {
        let mock = MockSummarizer::new(false);
        let err = mock.summarize("text").await.unwrap_err();
        assert!(matches!(err, SummarizerError::NotConfigured(_)));
    }

    #[test]
    fn timeout_and_rate_limit_map_to_their_statuses() {
        let timeout: AppError = SummarizerError::Timeout("timed out".to_string()).into();
        assert!(matches!(timeout, AppError::GatewayTimeout(_)));

        let limited: AppError = SummarizerError::RateLimited("slow down".to_string()).into();
        assert!(matches!(limited, AppError::TooManyRequests(_, _)));

        let missing: AppError = SummarizerError::ModelMissing("gone".to_string()).into();
        assert!(matches!(missing, AppError::InternalError(_)));
    }
}

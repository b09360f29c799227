//! OpenAI-compatible chat completions annotator

use super::{Annotation, Annotator};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const SYSTEM_PROMPT: &str = "You are an assistant skilled at extracting information from web pages.";

/// Reasons an annotation request failed
///
/// These never leave [`OpenAiAnnotator`]; they are logged and replaced by
/// the default annotation.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("missing API key")]
    MissingApiKey,

    #[error("invalid API key header value")]
    InvalidApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("response contained no choices")]
    EmptyResponse,
}

/// Model parameters for [`OpenAiAnnotator`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl OpenAiSettings {
    /// Collects the annotation settings from the crawl configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
            max_tokens: config.openai_max_tokens,
            temperature: config.openai_temperature,
            timeout: Duration::from_secs(config.openai_timeout_secs),
            max_retries: config.openai_max_retries,
        }
    }
}

/// Annotator backed by an OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone)]
pub struct OpenAiAnnotator {
    client: Client,
    endpoint: String,
    settings: OpenAiSettings,
}

impl OpenAiAnnotator {
    /// Builds a new annotator
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer credential, taken from the environment by the caller
    /// * `settings` - Model and transport parameters
    ///
    /// # Returns
    ///
    /// * `Ok(OpenAiAnnotator)` - Ready to annotate
    /// * `Err(AnnotationError)` - Empty key or HTTP client construction failed
    pub fn new(api_key: &str, settings: OpenAiSettings) -> Result<Self, AnnotationError> {
        if api_key.trim().is_empty() {
            return Err(AnnotationError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| AnnotationError::InvalidApiKey)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()?;

        let endpoint = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    /// Sends the annotation prompt and returns the raw response text
    ///
    /// Rate limiting (429), server errors and transient transport errors are
    /// retried up to `max_retries` times with exponential backoff.
    pub async fn request_annotation(&self, text: &str) -> Result<String, AnnotationError> {
        let prompt = build_prompt(text);
        let request = ChatRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let mut attempt = 0u32;
        loop {
            match self.client.post(&self.endpoint).json(&request).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: ChatResponse = resp.json().await?;
                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .map(|choice| choice.message.content.trim().to_string())
                            .ok_or(AnnotationError::EmptyResponse);
                    }

                    let body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt < self.settings.max_retries {
                        attempt += 1;
                        tracing::warn!(
                            "Annotation request returned {}, retrying (attempt {})",
                            status,
                            attempt
                        );
                        tokio::time::sleep(retry_backoff(attempt)).await;
                        continue;
                    }
                    return Err(AnnotationError::Status { status, body });
                }
                Err(err) => {
                    if is_retryable_error(&err) && attempt < self.settings.max_retries {
                        attempt += 1;
                        tracing::warn!("Annotation request failed: {}, retrying (attempt {})", err, attempt);
                        tokio::time::sleep(retry_backoff(attempt)).await;
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }
}

#[async_trait]
impl Annotator for OpenAiAnnotator {
    async fn annotate(&self, text: &str) -> Annotation {
        match self.request_annotation(text).await {
            Ok(content) => Annotation::parse(&content),
            Err(e) => {
                tracing::error!("Failed to annotate page: {}", e);
                Annotation::default()
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "From the text below, provide the following information in a structured way:\n\
         1. Keywords in English.\n\
         2. Keywords in French.\n\
         3. Summary in English (two sentences).\n\
         4. Summary in French (two sentences).\n\
         5. Main product number (if available).\n\
         If no product number is available, answer 'no'.\n\n\
         Text:\n{}\n\n\
         Response format:\n\
         Keywords (EN): [keywords in English]\n\
         Keywords (FR): [keywords in French]\n\
         Summary (EN): [summary in English]\n\
         Summary (FR): [summary in French]\n\
         Product Number: [product number or 'no']",
        text
    )
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn retry_backoff(attempt: u32) -> Duration {
    let capped = attempt.min(5);
    Duration::from_millis(500 * (1 << capped))
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str) -> OpenAiSettings {
        OpenAiSettings {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            max_tokens: 120,
            temperature: 0.3,
            timeout: Duration::from_secs(5),
            max_retries: 0,
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAiAnnotator::new("  ", settings("http://localhost"));
        assert!(matches!(result, Err(AnnotationError::MissingApiKey)));
    }

    #[test]
    fn test_prompt_contains_text_and_labels() {
        let prompt = build_prompt("PAGE BODY");
        assert!(prompt.contains("PAGE BODY"));
        for label in ["Keywords (EN):", "Keywords (FR):", "Summary (EN):", "Summary (FR):", "Product Number:"] {
            assert!(prompt.contains(label), "missing {}", label);
        }
    }

    #[test]
    fn test_retry_policy() {
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry(StatusCode::BAD_GATEWAY));
        assert!(!should_retry(StatusCode::UNAUTHORIZED));
        assert!(retry_backoff(2) > retry_backoff(1));
        assert_eq!(retry_backoff(9), retry_backoff(5));
    }

    #[tokio::test]
    async fn test_annotate_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "max_tokens": 120
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                "Keywords (EN): pumps\nKeywords (FR): pompes\nSummary (EN): A. B.\nSummary (FR): C. D.\nProduct Number: P-1",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let annotator = OpenAiAnnotator::new("secret", settings(&server.uri())).unwrap();
        let annotation = annotator.annotate("text about pumps").await;

        assert_eq!(annotation.keywords_en, "pumps");
        assert_eq!(annotation.keywords_fr, "pompes");
        assert_eq!(annotation.summary_en, "A. B.");
        assert_eq!(annotation.summary_fr, "C. D.");
        assert_eq!(annotation.product_number, "P-1");
    }

    #[tokio::test]
    async fn test_server_error_yields_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let annotator = OpenAiAnnotator::new("secret", settings(&server.uri())).unwrap();
        assert!(matches!(
            annotator.request_annotation("text").await,
            Err(AnnotationError::Status { .. })
        ));
        assert_eq!(annotator.annotate("text").await, Annotation::default());
    }

    #[tokio::test]
    async fn test_malformed_body_yields_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let annotator = OpenAiAnnotator::new("secret", settings(&server.uri())).unwrap();
        assert_eq!(annotator.annotate("text").await, Annotation::default());
    }

    #[tokio::test]
    async fn test_no_choices_yields_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let annotator = OpenAiAnnotator::new("secret", settings(&server.uri())).unwrap();
        assert!(matches!(
            annotator.request_annotation("text").await,
            Err(AnnotationError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Product Number: X9")))
            .mount(&server)
            .await;

        let mut retrying = settings(&server.uri());
        retrying.max_retries = 1;
        let annotator = OpenAiAnnotator::new("secret", retrying).unwrap();

        assert_eq!(annotator.annotate("text").await.product_number, "X9");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_default() {
        let annotator = OpenAiAnnotator::new("secret", settings("http://127.0.0.1:1")).unwrap();
        assert_eq!(annotator.annotate("text").await, Annotation::default());
    }
}

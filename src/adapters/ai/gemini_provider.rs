//! Gemini Provider - Implementation of AIProvider for Google's Generative Language API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(Some(api_key))
//!     .with_model("gemini-1.5-flash-latest")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! A provider built without a key still constructs; every call then fails
//! with `AIError::MissingCredential` so callers fall back instead of crashing.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, MessageRole,
    ProviderInfo, TokenUsage,
};

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Option<Secret<String>>,
    /// Model to use (e.g., "gemini-1.5-flash-latest").
    pub model: String,
    /// Base URL for the API (default: https://generativelanguage.googleapis.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: Option<Secret<String>>) -> Self {
        Self {
            api_key,
            model: "gemini-1.5-flash-latest".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    fn api_key(&self) -> Result<&str, AIError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AIError::MissingCredential("GEMINI_API_KEY is not configured".into()))
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    ///
    /// # Errors
    /// Returns `AIError::InvalidRequest` if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Endpoint without the key query parameter (safe to log).
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let api_key = self.config.api_key()?;
        let body = to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e.without_url()))
                } else {
                    AIError::network(e.without_url().to_string())
                }
            })
    }

    async fn handle_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), error_body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        extract_completion(parsed, &self.config.model)
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        tracing::debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            trace_id = %request.metadata.trace_id,
            "Calling Gemini generateContent"
        );

        let response = self.send_request(&request).await?;
        self.handle_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", self.config.model.clone())
    }
}

/// Converts our request to Gemini's wire format.
fn to_gemini_request(request: &CompletionRequest) -> GenerateContentRequest {
    let contents = request
        .messages
        .iter()
        .map(|msg| GeminiContent {
            role: match msg.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Assistant => "model".to_string(),
            },
            parts: vec![GeminiPart {
                text: msg.content.clone(),
            }],
        })
        .collect();

    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig {
            temperature: request.generation.temperature,
            top_k: request.generation.top_k,
            top_p: request.generation.top_p,
            max_output_tokens: request.generation.max_output_tokens,
        },
        safety_settings: SAFETY_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: SAFETY_THRESHOLD.to_string(),
            })
            .collect(),
    }
}

/// Maps a non-success status to an error. The body is kept for logs.
fn status_error(status: u16, error_body: String) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        400 if error_body.contains("API_KEY_INVALID") => AIError::AuthenticationFailed,
        400 => AIError::InvalidRequest(error_body),
        429 => AIError::rate_limited(60),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => AIError::unavailable(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Pulls `candidates[0].content.parts[0].text` out of a response.
fn extract_completion(
    response: GenerateContentResponse,
    configured_model: &str,
) -> Result<CompletionResponse, AIError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        return Err(AIError::content_filtered(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AIError::EmptyResponse)?;

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") | None => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::Length,
        Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => {
            FinishReason::ContentFilter
        }
        Some(_) => FinishReason::Other,
    };

    let content = match text {
        Some(text) => text,
        None if finish_reason == FinishReason::ContentFilter => {
            return Err(AIError::content_filtered("candidate blocked by safety settings"))
        }
        None => return Err(AIError::EmptyResponse),
    };

    let usage = response
        .usage_metadata
        .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    Ok(CompletionResponse {
        content,
        usage,
        model: response
            .model_version
            .unwrap_or_else(|| configured_model.to_string()),
        finish_reason,
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Gemini API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{GenerationSettings, Message, RequestMetadata};

    fn parse(json: &str) -> Result<CompletionResponse, AIError> {
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        extract_completion(response, "gemini-1.5-flash-latest")
    }

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new(Some(Secret::new("test-key".to_string())))
            .with_model("gemini-pro")
            .with_base_url("http://localhost:9999/")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.has_api_key());
        assert_eq!(config.api_key().unwrap(), "test-key");

        let provider = GeminiProvider::new(config).unwrap();
        assert_eq!(
            provider.generate_url(),
            "http://localhost:9999/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(provider.provider_info().name, "gemini");
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = GeminiConfig::new(Some(Secret::new("  ".to_string())));
        assert!(!config.has_api_key());
        assert!(matches!(config.api_key(), Err(AIError::MissingCredential(_))));
    }

    #[tokio::test]
    async fn complete_without_key_fails_before_any_request() {
        let provider = GeminiProvider::new(GeminiConfig::new(None)).unwrap();
        let request = CompletionRequest::new(RequestMetadata::new("t")).with_message(MessageRole::User, "hi");

        let err = provider.complete(request).await.unwrap_err();
        assert!(matches!(err, AIError::MissingCredential(_)));
    }

    #[test]
    fn request_maps_roles_and_settings() {
        let request = CompletionRequest::new(RequestMetadata::new("t"))
            .with_messages(vec![Message::assistant("Hello!"), Message::user("Hi")])
            .with_generation(GenerationSettings::conversational());

        let json = serde_json::to_value(to_gemini_request(&request)).unwrap();

        assert_eq!(json["contents"][0]["role"], "model");
        assert_eq!(json["contents"][1]["role"], "user");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "Hi");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 512);
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
    }

    #[test]
    fn extracts_and_trims_first_candidate() {
        let response = parse(
            r#"{
                "candidates": [
                    {"content": {"role": "model", "parts": [{"text": "  Your slot is 4 PM.\n"}]}, "finishReason": "STOP"},
                    {"content": {"parts": [{"text": "ignored"}]}}
                ],
                "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 8, "totalTokenCount": 128}
            }"#,
        )
        .unwrap();

        assert_eq!(response.content, "Your slot is 4 PM.");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.total_tokens, 128);
        assert_eq!(response.model, "gemini-1.5-flash-latest");
    }

    #[test]
    fn no_candidates_is_empty_response() {
        assert!(matches!(parse(r#"{"candidates": []}"#), Err(AIError::EmptyResponse)));
        assert!(matches!(parse(r#"{}"#), Err(AIError::EmptyResponse)));
    }

    #[test]
    fn blank_text_is_empty_response() {
        let result = parse(r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#);
        assert!(matches!(result, Err(AIError::EmptyResponse)));
    }

    #[test]
    fn blocked_prompt_is_content_filtered() {
        let result = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert!(matches!(result, Err(AIError::ContentFiltered { .. })));

        let result = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
        assert!(matches!(result, Err(AIError::ContentFiltered { .. })));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(status_error(403, String::new()), AIError::AuthenticationFailed));
        assert!(matches!(
            status_error(400, r#"{"error":{"details":[{"reason":"API_KEY_INVALID"}]}}"#.into()),
            AIError::AuthenticationFailed
        ));
        assert!(matches!(status_error(400, "bad".into()), AIError::InvalidRequest(_)));
        assert!(matches!(status_error(429, String::new()), AIError::RateLimited { .. }));
        assert!(matches!(status_error(503, String::new()), AIError::Unavailable { .. }));
    }
}

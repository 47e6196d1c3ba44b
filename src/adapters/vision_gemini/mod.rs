//! Gemini vision adapter
//!
//! Sends one inline image plus one text prompt to the `generateContent`
//! endpoint and returns the reply text. One attempt per call, no retry.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Provider message fragment that identifies a rejected key
const INVALID_KEY_MARKER: &str = "API key not valid";

/// Gemini `generateContent` client
pub struct GeminiVisionAdapter {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiVisionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiVisionAdapter")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiVisionAdapter {
    /// Create a client for `model` at `base_url`; no timeout beyond the transport default
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DomainError::Provider(ProviderError::MissingCredential));
        }

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| DomainError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Full URL of the generateContent call
    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Request body carrying the image part followed by the prompt part
    pub fn request_body(frame: &FrameImage, prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": frame.mime_type(),
                            "data": frame.payload(),
                        }
                    },
                    { "text": prompt }
                ]
            }]
        })
    }
}

#[async_trait]
impl VisionPort for GeminiVisionAdapter {
    async fn describe_frame(&self, frame: &FrameImage, prompt: &str) -> Result<String, ProviderError> {
        debug!("Prompting {} with a {} frame", self.model, frame.mime_type());

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(frame, prompt))
            .send()
            .await
            .map_err(|e| {
                error!("Error calling Gemini API: {}", e);
                ProviderError::Request(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = provider_error_message(&body).unwrap_or_else(|| status.to_string());
            error!("Gemini API returned {}: {}", status, message);
            return Err(classify_provider_message(&message));
        }

        parse_reply(&body)
    }
}

/// Turn a provider failure message into the matching error
pub fn classify_provider_message(message: &str) -> ProviderError {
    if message.contains(INVALID_KEY_MARKER) {
        ProviderError::InvalidCredential
    } else {
        ProviderError::Request(message.to_string())
    }
}

/// Pull `error.message` out of a provider error body
fn provider_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenated text of the first candidate, trimmed
pub fn parse_reply(body: &str) -> Result<String, ProviderError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        debug!("Undecodable Gemini response: {}", e);
        ProviderError::Unknown
    })?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_joins_parts_and_trims() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  Cat Fails "},{"text":"Epic Jump #LOL\n"}]}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "Cat Fails Epic Jump #LOL");
    }

    #[test]
    fn test_parse_reply_empty() {
        assert_eq!(parse_reply(r#"{"candidates":[]}"#), Err(ProviderError::EmptyResponse));
        assert_eq!(parse_reply("{}"), Err(ProviderError::EmptyResponse));
        assert_eq!(
            parse_reply(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#),
            Err(ProviderError::EmptyResponse)
        );
    }

    #[test]
    fn test_parse_reply_garbage_is_unknown() {
        assert_eq!(parse_reply("<html>oops</html>"), Err(ProviderError::Unknown));
    }

    #[test]
    fn test_classify_provider_message() {
        assert_eq!(
            classify_provider_message("API key not valid. Please pass a valid API key."),
            ProviderError::InvalidCredential
        );
        assert_eq!(
            classify_provider_message("Quota exceeded"),
            ProviderError::Request("Quota exceeded".to_string())
        );
    }

    #[test]
    fn test_provider_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(provider_error_message(body).as_deref(), Some("API key not valid."));
        assert_eq!(provider_error_message("not json"), None);
    }

    #[test]
    fn test_request_body_strips_data_uri_header() {
        let frame = FrameImage::from_bytes("image/jpeg", b"abc");
        let body = GeminiVisionAdapter::request_body(&frame, "Name this");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "YWJj");
        assert_eq!(body["contents"][0]["parts"][1]["text"], "Name this");
    }

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(GeminiVisionAdapter::new("  ", "https://example.com", "m").is_err());
    }

    #[test]
    fn test_endpoint() {
        let adapter = GeminiVisionAdapter::new("k", "https://example.com/", "gemini-2.5-flash").unwrap();
        assert_eq!(
            adapter.endpoint(),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}

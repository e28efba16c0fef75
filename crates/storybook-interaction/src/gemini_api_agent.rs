//! GeminiApiAgent - direct REST client for the Gemini `generateContent` API.
//!
//! Text and image generation share one request shape; they differ only in
//! the model and in which response part is extracted.

use crate::error::AgentError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storybook_core::config::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GeminiConfig};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_IMAGE_MIME: &str = "image/png";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    image_model: String,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiApiAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiApiAgent")
            .field("model", &self.model)
            .field("image_model", &self.image_model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiApiAgent {
    /// Creates an agent with the default text and image models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Builds an agent from the `gemini` section of `secret.json`.
    ///
    /// Returns `None` when the section carries no usable key.
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        if !config.is_usable() {
            return None;
        }
        Some(
            Self::new(config.api_key.trim())
                .with_model(config.text_model())
                .with_image_model(config.image_model()),
        )
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    /// Sends `prompt` to the text model and returns the first text part.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, AgentError> {
        let response = self.send_request(&self.model, prompt).await?;
        extract_text_response(response)
    }

    /// Sends `prompt` to the image model and returns the first inline image
    /// as a `data:<mime>;base64,<data>` URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, AgentError> {
        let response = self.send_request(&self.image_model, prompt).await?;
        extract_image_response(response)
    }

    async fn send_request(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<GenerateContentResponse, AgentError> {
        if prompt.trim().is_empty() {
            return Err(AgentError::ExecutionFailed(
                "Gemini request must include a prompt".into(),
            ));
        }

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = model,
            api_key = self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(model = %model, prompt_len = prompt.len(), "Sending Gemini request");
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                let is_retryable = err.is_connect() || err.is_timeout();
                // The URL carries the API key.
                AgentError::ProcessError {
                    status_code: None,
                    message: format!("Gemini API request failed: {}", err.without_url()),
                    is_retryable,
                    retry_after: None,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        response
            .json()
            .await
            .map_err(|err| AgentError::Other(format!("Failed to parse Gemini response: {err}")))
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn first_candidate_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, AgentError> {
    first_candidate_parts(response)
        .into_iter()
        .find_map(|part| part.text.filter(|text| !text.trim().is_empty()))
        .ok_or_else(|| {
            AgentError::ExecutionFailed(
                "Gemini API returned no text in the response candidates".into(),
            )
        })
}

fn extract_image_response(response: GenerateContentResponse) -> Result<String, AgentError> {
    let inline = first_candidate_parts(response)
        .into_iter()
        .find_map(|part| part.inline_data)
        .ok_or_else(|| {
            AgentError::ExecutionFailed(
                "Gemini API returned no image data in the response candidates".into(),
            )
        })?;

    BASE64_STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|err| AgentError::Other(format!("Gemini image payload is not base64: {err}")))?;

    let mime_type = inline
        .mime_type
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
    Ok(format!("data:{mime_type};base64,{}", inline.data))
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> AgentError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    if let Some(delay) = retry_after {
        AgentError::process_error_with_retry_after(status.as_u16(), message, is_retryable, delay)
    } else {
        AgentError::ProcessError {
            status_code: Some(status.as_u16()),
            message,
            is_retryable,
            retry_after: None,
        }
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are ignored.
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_text_skips_non_text_parts() {
        let parsed = response(
            r#"{"candidates":[{"content":{"parts":[
                {"inlineData":{"mimeType":"image/png","data":"AAAA"}},
                {"text":"hello"}
            ]}}]}"#,
        );
        assert_eq!(extract_text_response(parsed).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_without_candidates_fails() {
        let err = extract_text_response(response(r#"{"candidates":[]}"#)).unwrap_err();
        assert!(matches!(err, AgentError::ExecutionFailed(_)));
        assert!(extract_text_response(response("{}")).is_err());
    }

    #[test]
    fn test_extract_image_builds_data_url() {
        let parsed = response(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your picture"},
                {"inlineData":{"mimeType":"image/jpeg","data":"aGVsbG8="}}
            ]}}]}"#,
        );
        assert_eq!(
            extract_image_response(parsed).unwrap(),
            "data:image/jpeg;base64,aGVsbG8="
        );
    }

    #[test]
    fn test_extract_image_defaults_mime() {
        let parsed = response(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"aGk="}}]}}]}"#,
        );
        assert_eq!(extract_image_response(parsed).unwrap(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_extract_image_rejects_text_only_and_bad_payload() {
        let text_only = response(r#"{"candidates":[{"content":{"parts":[{"text":"no"}]}}]}"#);
        assert!(extract_image_response(text_only).is_err());

        let garbage =
            response(r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"%%%"}}]}}]}"#);
        assert!(matches!(extract_image_response(garbage), Err(AgentError::Other(_))));
    }

    #[test]
    fn test_map_http_error_reads_envelope() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            body.to_string(),
            Some(Duration::from_secs(7)),
        );

        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        match err {
            AgentError::ProcessError {
                status_code,
                message,
                ..
            } => {
                assert_eq!(status_code, Some(429));
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_plain_body_not_retryable() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "bad".to_string(), None);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_parse_retry_after() {
        let seconds = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&seconds)), Some(Duration::from_secs(12)));
        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(GeminiApiAgent::from_config(&GeminiConfig::default()).is_none());

        let agent = GeminiApiAgent::from_config(&GeminiConfig {
            api_key: "k".into(),
            model_name: Some("text-model".into()),
            image_model_name: None,
        })
        .unwrap();
        assert_eq!(agent.model(), "text-model");
        assert_eq!(agent.image_model(), DEFAULT_IMAGE_MODEL);
        assert!(!format!("{agent:?}").contains("\"k\""));
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_before_sending() {
        let agent = GeminiApiAgent::new("k");
        let err = agent.generate_text("   ").await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutionFailed(_)));
    }
}

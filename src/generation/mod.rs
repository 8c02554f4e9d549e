// Remote text and wallpaper generation
//
// Both calls share one retry policy: a fixed number of attempts with a
// doubling delay between them. The last failure is returned to the caller.

mod retry;

pub use retry::{retry, RetryPolicy};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::GenerationConfig;

const SYSTEM_INSTRUCTION: &str =
    "You are Zenith OS AI. Keep responses concise and technical. Use a futuristic tone.";
const WALLPAPER_PREFIX: &str = "Futuristic desktop wallpaper, high resolution, digital art style: ";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured (set ZENITH_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Malformed(&'static str),
}

impl GenerationError {
    /// Worth another attempt: connection problems, rate limiting and server
    /// faults. Bad requests, rejected keys and unusable bodies are final.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Transport(_) => true,
            GenerationError::Status(status) => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            GenerationError::MissingApiKey | GenerationError::Malformed(_) => false,
        }
    }
}

// ===== Wire types =====

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextRequest {
    contents: Vec<Content>,
    system_instruction: Content,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Serialize)]
struct ImageInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    instances: ImageInstance,
    parameters: ImageParameters,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

fn text_request(prompt: &str) -> TextRequest {
    TextRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt.to_string() }],
        }],
        system_instruction: Content {
            parts: vec![Part { text: SYSTEM_INSTRUCTION.to_string() }],
        },
    }
}

fn image_request(prompt: &str) -> ImageRequest {
    ImageRequest {
        instances: ImageInstance {
            prompt: format!("{}{}", WALLPAPER_PREFIX, prompt),
        },
        parameters: ImageParameters { sample_count: 1 },
    }
}

fn text_from_response(response: TextResponse) -> Result<String, GenerationError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or(GenerationError::Malformed("no candidate text"))
}

fn wallpaper_from_response(response: ImageResponse) -> Result<String, GenerationError> {
    response
        .predictions
        .into_iter()
        .next()
        .and_then(|p| p.bytes_base64_encoded)
        .map(|payload| format!("data:image/png;base64,{}", payload))
        .ok_or(GenerationError::Malformed("no image payload"))
}

/// HTTP client for the generation endpoints.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    config: GenerationConfig,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(config: GenerationConfig) -> Self {
        let policy = RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        };
        Self {
            http: reqwest::Client::new(),
            config,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Free-text completion for `prompt`.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.api_key()?;
        let body = &text_request(prompt);
        let model = self.config.text_model.as_str();
        retry(self.policy, GenerationError::is_transient, move || async move {
            let response: TextResponse = self.post(key, model, "generateContent", body).await?;
            text_from_response(response)
        })
        .await
    }

    /// Wallpaper image for `prompt`, as a `data:` URL.
    pub async fn generate_wallpaper(&self, prompt: &str) -> Result<String, GenerationError> {
        let key = self.api_key()?;
        let body = &image_request(prompt);
        let model = self.config.image_model.as_str();
        retry(self.policy, GenerationError::is_transient, move || async move {
            let response: ImageResponse = self.post(key, model, "predict", body).await?;
            wallpaper_from_response(response)
        })
        .await
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey)
    }

    async fn post<B, R>(
        &self,
        key: &str,
        model: &str,
        method: &str,
        body: &B,
    ) -> Result<R, GenerationError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}/models/{}:{}", self.config.base_url, model, method);
        debug!(%url, "generation request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::Status(response.status()));
        }
        Ok(response.json::<R>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_request_shape() {
        let body = serde_json::to_value(text_request("status report")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "status report");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
    }

    #[test]
    fn test_image_request_shape() {
        let body = serde_json::to_value(image_request("aurora")).unwrap();
        assert_eq!(
            body,
            json!({
                "instances": {
                    "prompt": "Futuristic desktop wallpaper, high resolution, digital art style: aurora"
                },
                "parameters": { "sampleCount": 1 }
            })
        );
    }

    #[test]
    fn test_text_response_extraction() {
        let response: TextResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "All systems nominal." }] } }]
        }))
        .unwrap();
        assert_eq!(text_from_response(response).unwrap(), "All systems nominal.");

        let empty: TextResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(matches!(text_from_response(empty), Err(GenerationError::Malformed(_))));

        let blocked: TextResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(text_from_response(blocked).is_err());
    }

    #[test]
    fn test_wallpaper_response_extraction() {
        let response: ImageResponse = serde_json::from_value(json!({
            "predictions": [{ "bytesBase64Encoded": "iVBORw0KGgo=", "mimeType": "image/png" }]
        }))
        .unwrap();
        assert_eq!(
            wallpaper_from_response(response).unwrap(),
            "data:image/png;base64,iVBORw0KGgo="
        );

        let missing: ImageResponse = serde_json::from_value(json!({})).unwrap();
        assert!(wallpaper_from_response(missing).is_err());
    }

    #[test]
    fn test_transient_classification() {
        use reqwest::StatusCode;
        assert!(GenerationError::Status(StatusCode::SERVICE_UNAVAILABLE).is_transient());
        assert!(GenerationError::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!GenerationError::Status(StatusCode::BAD_REQUEST).is_transient());
        assert!(!GenerationError::Status(StatusCode::FORBIDDEN).is_transient());
        assert!(!GenerationError::Malformed("no candidate text").is_transient());
        assert!(!GenerationError::MissingApiKey.is_transient());
    }

    async fn attempts_for(status: reqwest::StatusCode) -> u32 {
        let mut calls = 0;
        let result: Result<(), GenerationError> =
            retry(RetryPolicy::default(), GenerationError::is_transient, || {
                calls += 1;
                async move { Err(GenerationError::Status(status)) }
            })
            .await;
        assert!(matches!(result, Err(GenerationError::Status(s)) if s == status));
        calls
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_request_is_attempted_once() {
        assert_eq!(attempts_for(reqwest::StatusCode::BAD_REQUEST).await, 1);
        assert_eq!(attempts_for(reqwest::StatusCode::UNAUTHORIZED).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_uses_every_attempt() {
        assert_eq!(attempts_for(reqwest::StatusCode::SERVICE_UNAVAILABLE).await, 5);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_retrying() {
        let client = GenerationClient::new(GenerationConfig::default());
        let err = client.generate_text("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const IMAGE_SIZE: &str = "512x512";

/// Opaque failure of a hosted backend call. Logged at the orchestration
/// boundary and translated into the crate error taxonomy; never shown to
/// players as-is.
#[derive(Debug, Clone, Error)]
#[error("backend failure: {0}")]
pub struct BackendError(pub String);

/// The hosted generative model, reduced to the single contract the core
/// needs: instructions plus an output schema in, a structured object out.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn invoke(
        &self,
        instructions: &str,
        output_schema: &serde_json::Value,
    ) -> Result<serde_json::Value, BackendError>;
}

/// The hosted image model: a prompt in, a hosted image reference out.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Bounded retry for backend invocations: `max_attempts` total attempts with
/// a fixed delay between them.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 2,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[cfg(test)]
    pub fn immediate(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }
}

/// Invoke the generation backend under a retry policy. Used for plain
/// structured calls; the session orchestrator keeps its own loop because its
/// attempts also cover payload validation.
pub async fn invoke_with_retry(
    backend: &dyn GenerationBackend,
    policy: RetryPolicy,
    instructions: &str,
    output_schema: &serde_json::Value,
) -> Result<serde_json::Value, BackendError> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match backend.invoke(instructions, output_schema).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                log::warn!(
                    "backend invocation attempt {}/{} failed: {}",
                    attempt,
                    policy.max_attempts,
                    e
                );
                if attempt >= policy.max_attempts {
                    return Err(e);
                }
                tokio::time::sleep(policy.backoff).await;
            }
        }
    }
}

/// OpenAI-compatible implementation of both backends over one HTTP client.
/// Structured generation asks chat completions for a strict JSON object with
/// the output schema quoted in the request; images come back as hosted URLs.
#[derive(Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    chat_model: String,
    image_model: String,
}

impl OpenAiBackend {
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            chat_model: config.openai_chat_model.clone(),
            image_model: config.openai_image_model.clone(),
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn invoke(
        &self,
        instructions: &str,
        output_schema: &serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);
        let schema_text = serde_json::to_string_pretty(output_schema)
            .map_err(|e| BackendError(e.to_string()))?;
        let user = format!(
            "Return a single JSON object that conforms exactly to this JSON Schema. \
             No prose, no markdown, no extra keys.\n\n{}",
            schema_text
        );

        let req = ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages: vec![
                ChatMessageReq {
                    role: "system".into(),
                    content: instructions.into(),
                },
                ChatMessageReq {
                    role: "user".into(),
                    content: user,
                },
            ],
            temperature: 0.7,
            response_format: Some(ResponseFormat {
                format_type: "json_object".into(),
            }),
        };

        let res = self
            .client
            .post(&url)
            .header(USER_AGENT, "lexquest-server/0.1")
            .header(CONTENT_TYPE, "application/json")
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&req)
            .send()
            .await
            .map_err(|e| BackendError(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            let msg = extract_api_error(&body).unwrap_or(body);
            return Err(BackendError(format!("HTTP {}: {}", status, msg)));
        }

        let body: ChatCompletionResponse =
            res.json().await.map_err(|e| BackendError(e.to_string()))?;
        if let Some(usage) = &body.usage {
            log::info!(
                "generation backend usage: prompt={:?} completion={:?} total={:?}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        let text = body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        serde_json::from_str(&text)
            .map_err(|e| BackendError(format!("structured output parse error: {}", e)))
    }
}

#[async_trait]
impl ImageBackend for OpenAiBackend {
    async fn generate_image(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/images/generations", self.base_url);
        let req = ImageGenerationRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE.into(),
            response_format: "url".into(),
        };

        let res = self
            .client
            .post(&url)
            .header(USER_AGENT, "lexquest-server/0.1")
            .header(CONTENT_TYPE, "application/json")
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&req)
            .send()
            .await
            .map_err(|e| BackendError(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            let msg = extract_api_error(&body).unwrap_or(body);
            return Err(BackendError(format!("HTTP {}: {}", status, msg)));
        }

        let body: ImageGenerationResponse =
            res.json().await.map_err(|e| BackendError(e.to_string()))?;
        body.data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| BackendError("image response contained no url".to_string()))
    }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessageReq>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessageReq {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResp,
}

#[derive(Deserialize)]
struct ChatMessageResp {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    n: u8,
    size: String,
    response_format: String,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

/// Pull a clean message out of an OpenAI-style error body, if present.
fn extract_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct EWrap {
        error: EObj,
    }
    #[derive(Deserialize)]
    struct EObj {
        message: String,
    }
    serde_json::from_str::<EWrap>(body)
        .ok()
        .map(|w| w.error.message)
}

//! Vision backend trait and the OpenAI-compatible implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use fenestra_core::defaults::{
    ENV_OPENAI_API_KEY, ENV_OPENAI_BASE_URL, ENV_VISION_MODEL, ENV_VISION_TIMEOUT, OPENAI_URL,
    VISION_MAX_TOKENS, VISION_MODEL, VISION_TIMEOUT_SECS,
};
use fenestra_core::{Error, Result};

/// Backend for analyzing window images with a vision LLM.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Send one image plus an instruction prompt, returning the raw model
    /// reply text. The call is time-bounded; a hung upstream surfaces as an
    /// error, never as an indefinite wait.
    async fn request_analysis(
        &self,
        image_data: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Configuration for the OpenAI-compatible vision backend.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Vision model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_URL.to_string(),
            api_key: String::new(),
            model: VISION_MODEL.to_string(),
            timeout_secs: VISION_TIMEOUT_SECS,
        }
    }
}

/// Vision backend for any OpenAI-compatible chat-completions endpoint.
pub struct OpenAiVisionBackend {
    client: reqwest::Client,
    config: VisionConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImagePayload },
}

#[derive(Serialize)]
struct ImagePayload {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiVisionBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: VisionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Analysis(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "vision",
            component = "backend",
            model = %config.model,
            timeout_secs = config.timeout_secs,
            "Initializing vision backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    ///
    /// Returns `None` when no API key is configured; callers then run in
    /// permanent-fallback mode instead of attempting network calls.
    pub fn from_env() -> Option<Result<Self>> {
        let api_key = std::env::var(ENV_OPENAI_API_KEY).ok()?;
        if api_key.is_empty() {
            return None;
        }

        let config = VisionConfig {
            base_url: std::env::var(ENV_OPENAI_BASE_URL).unwrap_or_else(|_| OPENAI_URL.to_string()),
            api_key,
            model: std::env::var(ENV_VISION_MODEL).unwrap_or_else(|_| VISION_MODEL.to_string()),
            timeout_secs: std::env::var(ENV_VISION_TIMEOUT)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(VISION_TIMEOUT_SECS),
        };

        Some(Self::new(config))
    }

    /// Get the current configuration.
    pub fn config(&self) -> &VisionConfig {
        &self.config
    }
}

#[async_trait]
impl VisionBackend for OpenAiVisionBackend {
    async fn request_analysis(
        &self,
        image_data: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        use base64::Engine;
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImagePayload {
                            url: format!("data:{};base64,{}", mime_type, image_b64),
                        },
                    },
                ],
            }],
            max_tokens: VISION_MAX_TOKENS,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!(
            subsystem = "vision",
            component = "backend",
            op = "request_analysis",
            model = %self.config.model,
            image_bytes = image_data.len(),
            "Sending vision request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Analysis(format!("Vision request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Analysis(format!(
                "Vision API returned {}: {}",
                status, body
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Analysis(format!("Failed to parse vision response: {}", e)))?;

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Analysis("Vision response contained no choices".to_string()))?;

        Ok(choice.message.content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

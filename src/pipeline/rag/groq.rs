use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::orchestrator::LlmGenerate;
use super::RagError;

/// Sampling temperature for explanations.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Groq client for the OpenAI-compatible chat completions endpoint.
pub struct GroqClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GroqClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, RagError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RagError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl LlmGenerate for GroqClient {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, RagError> {
        let api_key = self.api_key.as_deref().ok_or(RagError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    RagError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    RagError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
                } else {
                    RagError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RagError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| RagError::ResponseParsing(e.to_string()))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(RagError::EmptyAnswer);
        }

        tracing::debug!(model = %self.model, chars = answer.len(), "LLM answer received");
        Ok(answer)
    }
}

/// Mock generator for testing: returns a fixed answer or error and records prompts.
pub struct MockLlm {
    response: Result<String, String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockLlm {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// (system, prompt) pairs seen so far.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LlmGenerate for MockLlm {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, RagError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((system.to_string(), prompt.to_string()));
        }
        self.response
            .clone()
            .map_err(RagError::Connection)
    }
}

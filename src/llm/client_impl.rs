use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::client::LlmClient;
use crate::util::SecretString;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

// ============================================================================
// OpenAI Client (also serves Groq and OpenAI-compatible gateways)
// ============================================================================

pub struct OpenAIClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
    label: &'static str,
    client: Client,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

impl OpenAIClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(
            api_key,
            model,
            OPENAI_BASE_URL.to_string(),
            max_tokens,
            timeout_secs,
        )
    }

    pub fn groq(api_key: String, model: String, max_tokens: u32, timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_base_url(
            api_key,
            model,
            GROQ_BASE_URL.to_string(),
            max_tokens,
            timeout_secs,
        )?
        .with_label("Groq"))
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens,
            label: "OpenAI",
            client: http_client(timeout_secs)?,
        })
    }

    /// Provider name used in log lines and error messages
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    fn build_request(&self, prompt: &str, temperature: f32) -> OpenAIRequest {
        // GPT-5+ models use max_completion_tokens instead of max_tokens
        let (max_tokens, max_completion_tokens) = if self.model.starts_with("gpt-5") {
            (None, Some(self.max_tokens))
        } else {
            (Some(self.max_tokens), None)
        };

        OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature,
            max_tokens,
            max_completion_tokens,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = self.build_request(prompt, temperature);

        debug!(
            "Calling {} API at {} with model: {} (temperature {})",
            self.label, self.base_url, self.model, temperature
        );

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request);

        if !self.api_key.is_blank() {
            req = req.header("authorization", format!("Bearer {}", self.api_key.expose()));
        }

        let response = req
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.label))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("{} API error {}: {}", self.label, status, error_text);
        }

        let api_response: OpenAIResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} API response", self.label))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .with_context(|| format!("No choices in {} response", self.label))
    }
}

// ============================================================================
// Gemini Client (Google Generative AI)
// ============================================================================

pub struct GeminiClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(
            api_key,
            model,
            GEMINI_BASE_URL.to_string(),
            max_tokens,
            timeout_secs,
        )
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: String,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens,
            client: http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        debug!(
            "Calling Gemini API with model: {} (temperature {})",
            self.model, temperature
        );

        // Key goes in a header so it never shows up in a request URL
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, error_text);
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        // Long answers may be split across several parts
        let text: String = api_response
            .candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            bail!("No content in Gemini response");
        }
        Ok(text)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_client_creation() {
        let client =
            OpenAIClient::new("test_key".to_string(), "gpt-4o".to_string(), 4096, 120).unwrap();
        assert_eq!(client.api_key.expose(), "test_key");
        assert_eq!(client.model, "gpt-4o");
        assert_eq!(client.base_url, OPENAI_BASE_URL);
        assert_eq!(client.label, "OpenAI");
    }

    #[test]
    fn test_groq_client_uses_groq_endpoint() {
        let client = OpenAIClient::groq(
            "gsk_test".to_string(),
            "llama-3.1-70b-versatile".to_string(),
            4096,
            120,
        )
        .unwrap();
        assert_eq!(client.base_url, GROQ_BASE_URL);
        assert_eq!(client.label, "Groq");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenAIClient::with_base_url(
            String::new(),
            "llama3".to_string(),
            "http://localhost:11434/v1/".to_string(),
            16384,
            120,
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_openai_request_carries_temperature() {
        let client =
            OpenAIClient::new("k".to_string(), "gpt-4o".to_string(), 4096, 120).unwrap();
        let json = serde_json::to_value(client.build_request("hello", 0.5)).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.5).abs() < 0.0001);
        assert_eq!(json["max_tokens"], 4096);
        assert!(json.get("max_completion_tokens").is_none());
    }

    #[test]
    fn test_openai_request_gpt5_uses_max_completion_tokens() {
        let client =
            OpenAIClient::new("k".to_string(), "gpt-5-mini".to_string(), 8000, 120).unwrap();
        let json = serde_json::to_value(client.build_request("hello", 0.7)).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["max_completion_tokens"], 8000);
    }

    #[test]
    fn test_openai_response_parsing() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Hello, world!"}}
            ]
        }"#;
        let response: OpenAIResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("Hello, world!")
        );
    }

    #[test]
    fn test_openai_response_null_content() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: OpenAIResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_gemini_request_structure() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "test prompt".to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.6,
                max_output_tokens: 8192,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "test prompt");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        let temp = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.6).abs() < 0.0001);
    }

    #[test]
    fn test_gemini_response_parsing() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello, "}, {"text": "world!"}]}}
            ]
        }"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates[0].content.parts.len(), 2);
    }

    #[test]
    fn test_gemini_response_missing_candidates() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::new(
            "key".to_string(),
            "gemini-1.5-flash".to_string(),
            8192,
            120,
        )
        .unwrap();
        assert_eq!(client.max_tokens, 8192);
        assert_eq!(client.base_url, GEMINI_BASE_URL);
    }
}

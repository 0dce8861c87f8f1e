use anyhow::{Context as _, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::traits::Provider;
use super::types::GenerateRequest;
use crate::constants::{DEFAULT_OPENAI_COMPAT_BASE_URL, HEALTH_CHECK_TIMEOUT_SECS};

/// Provider for any OpenAI-compatible chat completions endpoint
/// (OpenAI itself, LiteLLM, vLLM, Ollama's compatibility layer, ...)
pub struct OpenAiCompatProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    pub fn new(
        model: &str,
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_COMPAT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    fn build_body(&self, request: &GenerateRequest) -> Value {
        let mut messages = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(json!({
                "role": "system",
                "content": system
            }));
        }

        // Plain string content unless an image rides along
        let content = match &request.image {
            None => json!(request.prompt),
            Some(image) => {
                let mut parts = Vec::new();
                if !request.prompt.trim().is_empty() {
                    parts.push(json!({ "type": "text", "text": request.prompt }));
                }
                let data_url = format!(
                    "data:{};base64,{}",
                    image.media_type,
                    BASE64_STANDARD.encode(&image.data)
                );
                parts.push(json!({ "type": "image_url", "image_url": { "url": data_url } }));
                json!(parts)
            }
        };

        messages.push(json!({
            "role": "user",
            "content": content
        }));

        json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        })
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let mut http_request = self.client.post(&url).json(&self.build_body(&request));

        if let Some(key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {}", key));
        }

        let response = http_request
            .send()
            .await
            .with_context(|| format!("Failed to connect to provider at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Provider error ({}): {}", status.as_u16(), error_text);
        }

        let response_json: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat completion response")?;

        Ok(response_json
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        &self.model
    }

    async fn validate_connection(&self) -> Result<bool> {
        let health_client = Client::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .build()?;

        let mut request = health_client.get(format!("{}/v1/models", self.base_url));
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        match request.send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

// Response structures (OpenAI format)

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ImagePayload;
    use pretty_assertions::assert_eq;

    fn provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::new("gpt-4o", None, None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_text_only_body() {
        let body = provider().build_body(&GenerateRequest {
            prompt: "explain recursion".to_string(),
            image: None,
            system_prompt: None,
        });

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [{ "role": "user", "content": "explain recursion" }],
                "stream": false,
            })
        );
    }

    #[test]
    fn test_image_body_uses_data_url() {
        let body = provider().build_body(&GenerateRequest {
            prompt: "describe".to_string(),
            image: Some(ImagePayload::new(vec![1u8, 2, 3], "image/png")),
            system_prompt: Some("be brief".to_string()),
        });

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        let parts = messages[1]["content"].as_array().unwrap();
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,AQID");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = OpenAiCompatProvider::new(
            "m",
            None,
            Some("http://localhost:4000/".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:4000");
    }
}

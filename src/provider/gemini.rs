use anyhow::{Context as _, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::traits::Provider;
use super::types::{GenerateRequest, ImagePayload};
use crate::constants::{DEFAULT_GEMINI_BASE_URL, HEALTH_CHECK_TIMEOUT_SECS};

// The key travels in this header, never in the URL
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Provider backed by the Gemini `generateContent` REST endpoint
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(
        model: &str,
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    fn build_parts(prompt: &str, image: Option<&ImagePayload>) -> Vec<Part> {
        let mut parts = Vec::new();
        if !prompt.trim().is_empty() {
            parts.push(Part::Text {
                text: prompt.to_string(),
            });
        }
        if let Some(image) = image {
            parts.push(Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: image.media_type.clone(),
                    data: BASE64_STANDARD.encode(&image.data),
                },
            });
        }
        parts
    }

    fn build_request(request: &GenerateRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: Self::build_parts(&request.prompt, request.image.as_ref()),
            }],
            system_instruction: request.system_prompt.as_ref().map(|text| Content {
                role: "system".to_string(),
                parts: vec![Part::Text { text: text.clone() }],
            }),
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let body = Self::build_request(&request);
        if body.contents[0].parts.is_empty() {
            anyhow::bail!("Gemini payload must include text or an image");
        }

        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Gemini API request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            anyhow::bail!(describe_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Gemini response")?;

        Ok(extract_text_response(parsed))
    }

    fn name(&self) -> &str {
        &self.model
    }

    async fn validate_connection(&self) -> Result<bool> {
        let health_client = Client::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .build()?;
        let url = format!("{}/{}", self.base_url, self.model);

        match health_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Concatenated text of the last candidate; empty when there is none
fn extract_text_response(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn describe_http_error(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    format!("Gemini API error ({}): {}", status.as_u16(), detail)
}

use anyhow::{bail, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    app::Config,
    cli::OutputFormat,
    provider::{ImageMeta, ImagePayload, ProviderGateway},
    session::{SessionEngine, SubmitOutcome},
    speech::SpeechBridge,
    utils::ErrorKind,
};

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The prompt that was executed
    pub prompt: String,
    /// Image sent alongside the prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
    /// The answer turn: provider text, canned reply, or the apology
    pub response: String,
    /// Set when the provider failed
    pub error: Option<ErrorKind>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    pub provider: String,
    pub model: String,
    pub duration_ms: u128,
}

/// Non-interactive runner for executing single prompts
pub struct NonInteractiveRunner {
    engine: SessionEngine,
    model: String,
}

impl NonInteractiveRunner {
    /// Create a runner for the configured provider; speech is never used
    pub fn new(config: &Config) -> Result<Self> {
        let gateway = ProviderGateway::from_config(config)?;
        Ok(Self::with_gateway(gateway, config.provider.model.clone()))
    }

    pub fn with_gateway(gateway: ProviderGateway, model: impl Into<String>) -> Self {
        Self {
            engine: SessionEngine::new(Arc::new(gateway), SpeechBridge::unavailable()),
            model: model.into(),
        }
    }

    /// Execute a single prompt and return the result
    pub async fn execute(
        &self,
        prompt: String,
        image: Option<ImagePayload>,
    ) -> Result<NonInteractiveResult> {
        let start_time = Instant::now();

        self.engine.compose_text(prompt.clone());
        let image_meta = image.as_ref().map(ImagePayload::meta);
        if let Some(image) = image {
            self.engine.compose_image(image)?;
        }

        let answer = match self.engine.submit().await? {
            SubmitOutcome::Answered { answer, .. } | SubmitOutcome::Failed { answer, .. } => {
                answer
            }
            SubmitOutcome::Busy => bail!("A request is already in flight"),
        };

        Ok(NonInteractiveResult {
            prompt,
            image: image_meta,
            response: self.engine.turn(answer)?.content,
            error: self.engine.last_error(),
            metadata: ExecutionMetadata {
                provider: self.engine.gateway().provider_name().to_string(),
                model: self.model.clone(),
                duration_ms: start_time.elapsed().as_millis(),
            },
        })
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = result.response.clone();
                if let Some(error) = result.error {
                    output.push_str(&format!("\n\n--- Error ---\n{}\n", error));
                }
                output
            }
            OutputFormat::Markdown => {
                let mut output = self.engine.transcript_markdown();

                if let Some(error) = result.error {
                    output.push_str(&format!("## Error\n\n- {}\n\n", error));
                }

                output.push_str("---\n");
                output.push_str(&format!(
                    "*Provider: {} | Model: {} | Duration: {}ms*\n",
                    result.metadata.provider, result.metadata.model, result.metadata.duration_ms
                ));

                output
            }
        }
    }
}

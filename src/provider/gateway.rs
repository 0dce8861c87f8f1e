use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::factory::ProviderFactory;
use super::intents;
use super::traits::Provider;
use super::types::{GenerateRequest, ImagePayload};
use crate::app::Config;
use crate::utils::SessionError;

/// The single point of contact with the generative-response provider.
///
/// Holds no session state: each `ask` is independent. Serialization of calls
/// is the session engine's job.
pub struct ProviderGateway {
    provider: Box<dyn Provider>,
    pacing_delay: Duration,
    system_prompt: Option<String>,
}

impl ProviderGateway {
    pub fn new(
        provider: Box<dyn Provider>,
        pacing_delay: Duration,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            provider,
            pacing_delay,
            system_prompt,
        }
    }

    /// Build the configured backend and wrap it
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = ProviderFactory::create(config)?;
        Ok(Self::new(
            provider,
            Duration::from_millis(config.provider.pacing_delay_ms),
            config.provider.system_prompt.clone(),
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask the provider, returning trimmed non-empty text.
    ///
    /// Text-only prompts matching a local intent are answered from canned
    /// responses before any delay or network call. Failures are never retried.
    pub async fn ask(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
    ) -> Result<String, SessionError> {
        if prompt.trim().is_empty() && image.is_none() {
            return Err(SessionError::NotSubmittable);
        }

        if image.is_none() {
            if let Some(intent) = intents::detect(prompt) {
                debug!("Answering {:?} intent locally", intent);
                return Ok(intent.response().to_string());
            }
        }

        if !self.pacing_delay.is_zero() {
            tokio::time::sleep(self.pacing_delay).await;
        }

        let request = GenerateRequest {
            prompt: prompt.to_string(),
            image: image.cloned(),
            system_prompt: self.system_prompt.clone(),
        };

        info!(
            "Dispatching prompt ({} chars, image: {})",
            prompt.len(),
            image.is_some()
        );

        let raw = self.provider.generate(request).await.map_err(|e| {
            warn!("Provider request failed: {:#}", e);
            SessionError::ProviderError(e.to_string())
        })?;

        let text = raw.trim();
        if text.is_empty() {
            warn!("Provider returned a blank response");
            return Err(SessionError::EmptyResponse);
        }

        Ok(text.to_string())
    }

    /// Check that the backend is reachable
    pub async fn check_connection(&self) -> Result<bool> {
        self.provider.validate_connection().await
    }
}

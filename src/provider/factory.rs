use anyhow::Result;
use std::time::Duration;

use super::gemini::GeminiProvider;
use super::openai_compat::OpenAiCompatProvider;
use super::traits::Provider;
use crate::app::{Config, ProviderKind};
use crate::utils::SessionError;

/// Factory for creating provider backends from configuration
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the backend named by `config.provider.kind`
    ///
    /// Gemini requires a credential; OpenAI-compatible endpoints may run
    /// without one (local proxies).
    pub fn create(config: &Config) -> Result<Box<dyn Provider>> {
        let settings = &config.provider;
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let api_key = settings.resolve_api_key();

        match settings.kind {
            ProviderKind::Gemini => {
                let api_key = api_key.ok_or_else(|| {
                    SessionError::Config(format!(
                        "No Gemini API key found. Set {} or provider.api_key",
                        settings.api_key_env
                    ))
                })?;
                Ok(Box::new(GeminiProvider::new(
                    &settings.model,
                    api_key,
                    settings.base_url.clone(),
                    timeout,
                )?))
            }
            ProviderKind::OpenaiCompatible => Ok(Box::new(OpenAiCompatProvider::new(
                &settings.model,
                api_key,
                settings.base_url.clone(),
                timeout,
            )?)),
        }
    }
}

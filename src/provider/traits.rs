use anyhow::Result;
use async_trait::async_trait;

use super::types::GenerateRequest;

/// Core trait that all provider backends must implement
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send one prompt (and optional image) and get the raw response text
    async fn generate(&self, request: GenerateRequest) -> Result<String>;

    /// Get the name of the backend model
    fn name(&self) -> &str;

    /// Validate that the backend is reachable
    async fn validate_connection(&self) -> Result<bool> {
        Ok(true)
    }
}

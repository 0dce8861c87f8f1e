// Gateway module for providers - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod gateway;
mod gemini;
mod intents;
mod openai_compat;
mod traits;
mod types;

// Public re-exports - the ONLY way to access provider functionality
pub use factory::ProviderFactory;
pub use gateway::ProviderGateway;
pub use gemini::GeminiProvider;
pub use intents::{detect as detect_local_intent, LocalIntent};
pub use openai_compat::OpenAiCompatProvider;
pub use traits::Provider;
pub use types::{is_image_media_type, GenerateRequest, ImageMeta, ImagePayload};

#[cfg(test)]
pub use traits::MockProvider;

pub mod app;
pub mod cli;
pub mod constants;
pub mod provider;
pub mod runtime;
pub mod session;
pub mod speech;
pub mod utils;

pub use app::{load_config, Config};
pub use provider::{ImagePayload, Provider, ProviderGateway};
pub use session::{SessionEngine, SessionSnapshot, SubmitOutcome};
pub use speech::SpeechBridge;
pub use utils::{ErrorKind, SessionError};

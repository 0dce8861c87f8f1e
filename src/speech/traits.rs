use anyhow::Result;
use async_trait::async_trait;

/// Speech-to-text capability.
///
/// Implementations capture one utterance per `listen` call and return its
/// transcript.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether capture works in the current environment
    fn is_available(&self) -> bool;

    /// Capture one utterance and return the transcript
    async fn listen(&self) -> Result<String>;
}

/// Text-to-speech capability
pub trait SpeechSynthesizer: Send + Sync {
    /// Whether playback works in the current environment
    fn is_available(&self) -> bool;

    /// Begin audible playback of `text`
    fn start(&self, text: &str) -> Result<Box<dyn Playback>>;
}

/// Handle on one running playback
pub trait Playback: Send {
    /// Whether audio is still playing
    fn is_active(&mut self) -> bool;

    /// Stop playback; calling this on a finished playback is harmless
    fn cancel(&mut self);
}

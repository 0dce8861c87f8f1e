use anyhow::Result;
use async_trait::async_trait;

use super::traits::{Playback, SpeechRecognizer, SpeechSynthesizer};

/// Stand-in for environments without speech support
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl SpeechRecognizer for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen(&self) -> Result<String> {
        anyhow::bail!("Speech recognition is not available")
    }
}

impl SpeechSynthesizer for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&self, _text: &str) -> Result<Box<dyn Playback>> {
        anyhow::bail!("Speech synthesis is not available")
    }
}

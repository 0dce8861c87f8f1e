use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::command::{CommandRecognizer, CommandSynthesizer};
use super::traits::{Playback, SpeechRecognizer, SpeechSynthesizer};
use super::unavailable::Unavailable;
use crate::app::SpeechSettings;

/// Two independent single-flight speech channels.
///
/// Listening refuses overlapping captures. Speaking is latest-wins: a new
/// `speak` cancels whatever is playing. Missing capabilities turn every
/// operation into a silent no-op.
pub struct SpeechBridge {
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    listening: AtomicBool,
    playback: Mutex<Option<Box<dyn Playback>>>,
}

/// Clears the listening flag however the capture ends
struct ListeningGuard<'a>(&'a AtomicBool);

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SpeechBridge {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            recognizer,
            synthesizer,
            listening: AtomicBool::new(false),
            playback: Mutex::new(None),
        }
    }

    /// A bridge with neither capability
    pub fn unavailable() -> Self {
        Self::new(Box::new(Unavailable), Box::new(Unavailable))
    }

    pub fn from_settings(settings: &SpeechSettings) -> Self {
        if !settings.enabled {
            return Self::unavailable();
        }

        let recognizer: Box<dyn SpeechRecognizer> = match &settings.listen_command {
            Some(argv) => Box::new(CommandRecognizer::new(
                argv,
                Duration::from_secs(settings.listen_timeout_secs),
            )),
            None => Box::new(Unavailable),
        };
        let synthesizer = CommandSynthesizer::detect(settings.speak_command.as_deref());

        Self::new(recognizer, Box::new(synthesizer))
    }

    pub fn can_listen(&self) -> bool {
        self.recognizer.is_available()
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_available()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Capture one utterance.
    ///
    /// Returns `None` when capture is unavailable, already running, or fails.
    pub async fn listen(&self) -> Option<String> {
        if !self.recognizer.is_available() {
            debug!("Speech recognition unavailable; ignoring listen request");
            return None;
        }

        if self
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Already listening; ignoring listen request");
            return None;
        }
        let _guard = ListeningGuard(&self.listening);

        match self.recognizer.listen().await {
            Ok(transcript) => Some(transcript),
            Err(e) => {
                warn!("Speech recognition failed: {:#}", e);
                None
            }
        }
    }

    /// Speak `text`, cancelling any playback in progress. Returns whether
    /// playback started.
    pub fn speak(&self, text: &str) -> bool {
        if !self.synthesizer.is_available() {
            debug!("Speech synthesis unavailable; ignoring speak request");
            return false;
        }

        let mut current = self.playback.lock();
        if let Some(mut prior) = current.take() {
            prior.cancel();
        }

        match self.synthesizer.start(text) {
            Ok(playback) => {
                *current = Some(playback);
                true
            }
            Err(e) => {
                warn!("Speech synthesis failed: {:#}", e);
                false
            }
        }
    }

    pub fn stop_speaking(&self) {
        if let Some(mut playback) = self.playback.lock().take() {
            playback.cancel();
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.playback
            .lock()
            .as_mut()
            .map(|playback| playback.is_active())
            .unwrap_or(false)
    }
}

impl Drop for SpeechBridge {
    fn drop(&mut self) {
        self.stop_speaking();
    }
}

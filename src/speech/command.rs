use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Child;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::debug;

use super::traits::{Playback, SpeechRecognizer, SpeechSynthesizer};
use crate::constants::TTS_PROGRAMS;

/// Recognizer that shells out to an external transcription command.
///
/// The command records one utterance and prints its transcript on stdout.
pub struct CommandRecognizer {
    program: Option<PathBuf>,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRecognizer {
    pub fn new(argv: &[String], timeout: Duration) -> Self {
        let program = argv.first().and_then(|name| which::which(name).ok());
        if program.is_none() {
            debug!("No transcription command available: {:?}", argv.first());
        }
        Self {
            program,
            args: argv.iter().skip(1).cloned().collect(),
            timeout,
        }
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    async fn listen(&self) -> Result<String> {
        let program = self
            .program
            .as_ref()
            .context("Transcription command is not available")?;

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.context("Failed to run transcription command")?,
            Err(_) => anyhow::bail!(
                "Transcription timed out after {} seconds",
                self.timeout.as_secs()
            ),
        };

        if !output.status.success() {
            anyhow::bail!(
                "Transcription command exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Synthesizer that speaks through a local TTS program (espeak, say, ...)
pub struct CommandSynthesizer {
    program: Option<PathBuf>,
}

impl CommandSynthesizer {
    /// Use `preferred` when given, otherwise the first known TTS program on PATH
    pub fn detect(preferred: Option<&str>) -> Self {
        let program = match preferred {
            Some(name) => which::which(name).ok(),
            None => TTS_PROGRAMS.iter().find_map(|name| which::which(name).ok()),
        };
        if program.is_none() {
            debug!("No text-to-speech program found");
        }
        Self { program }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn start(&self, text: &str) -> Result<Box<dyn Playback>> {
        let program = self
            .program
            .as_ref()
            .context("Text-to-speech program is not available")?;

        let handle = Handle::try_current().context("Speech playback needs a tokio runtime")?;

        let child = tokio::process::Command::new(program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", program.display()))?;

        Ok(Box::new(ChildPlayback::watch(&handle, child)))
    }
}

/// Playback backed by a TTS process.
///
/// A background task owns the child and reaps it as soon as it exits or is
/// cancelled, so neither path blocks the caller.
struct ChildPlayback {
    finished: Arc<AtomicBool>,
    kill: Option<oneshot::Sender<()>>,
}

impl ChildPlayback {
    fn watch(handle: &Handle, mut child: Child) -> Self {
        let finished = Arc::new(AtomicBool::new(false));
        let (kill, killed) = oneshot::channel::<()>();

        let done = Arc::clone(&finished);
        handle.spawn(async move {
            tokio::select! {
                status = child.wait() => debug!("Speech playback exited: {:?}", status),
                // Fires on an explicit cancel and when the playback is dropped
                _ = killed => {
                    let _ = child.kill().await;
                    debug!("Speech playback cancelled");
                }
            }
            done.store(true, Ordering::Release);
        });

        Self {
            finished,
            kill: Some(kill),
        }
    }
}

impl Playback for ChildPlayback {
    fn is_active(&mut self) -> bool {
        self.kill.is_some() && !self.finished.load(Ordering::Acquire)
    }

    fn cancel(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

impl Drop for ChildPlayback {
    fn drop(&mut self) {
        self.cancel();
    }
}

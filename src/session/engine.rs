use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use super::attachment::AttachmentComposer;
use super::ledger::{Annotation, ConversationLedger, Feedback, Turn, TurnRole};
use crate::constants::APOLOGY_MESSAGE;
use crate::provider::{ImageMeta, ImagePayload, ProviderGateway};
use crate::speech::SpeechBridge;
use crate::utils::{ErrorKind, SessionError};

/// Request lifecycle state. Failures resolve back to `Idle` with `last_error` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Idle,
    Submitting,
}

/// What a call to `submit` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmitOutcome {
    Answered { question: usize, answer: usize },
    /// The provider failed; `answer` holds the fallback apology turn
    Failed { question: usize, answer: usize, error: ErrorKind },
    /// Another submission was already in flight; nothing changed
    Busy,
}

/// What a call to `start_listening` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListenOutcome {
    /// No transcript was delivered (unavailable, already listening, failed, or silence)
    Ignored,
    /// Transcript staged in the composer without submitting
    Transcribed,
    Submitted(SubmitOutcome),
}

/// Observable session state published after every change
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub turns: Vec<Turn>,
    pub annotations: BTreeMap<usize, Annotation>,
    pub bookmarks: Vec<usize>,
    pub in_flight: bool,
    pub last_error: Option<ErrorKind>,
    pub pending_text: String,
    pub pending_image: Option<ImageMeta>,
}

#[derive(Debug, Default)]
struct Session {
    ledger: ConversationLedger,
    composer: AttachmentComposer,
    in_flight: bool,
    last_error: Option<ErrorKind>,
}

impl Session {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            turns: self.ledger.turns().to_vec(),
            annotations: self.ledger.annotations().clone(),
            bookmarks: self.ledger.list_bookmarked(),
            in_flight: self.in_flight,
            last_error: self.last_error,
            pending_text: self.composer.text().to_string(),
            pending_image: self.composer.image().map(ImagePayload::meta),
        }
    }

    fn record_failure(&mut self, kind: ErrorKind) -> usize {
        let answer = self.ledger.append(TurnRole::Answer, APOLOGY_MESSAGE, None);
        self.last_error = Some(kind);
        self.in_flight = false;
        answer
    }
}

/// Owns one conversation and funnels every mutation through itself.
///
/// At most one provider request is in flight per engine; a `submit` issued
/// while one is pending returns `SubmitOutcome::Busy` without touching state.
/// The lock is never held across an await.
pub struct SessionEngine {
    session: Mutex<Session>,
    gateway: Arc<ProviderGateway>,
    speech: SpeechBridge,
    auto_submit: bool,
    updates: watch::Sender<SessionSnapshot>,
}

/// Resolves the session back to `Idle` if a submission future is dropped
/// before the provider answers, so the ledger keeps its question/answer pairing.
struct InFlightGuard<'a> {
    engine: &'a SessionEngine,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("Submission dropped before completion; recording failure");
            self.engine.mutate(|session| {
                session.record_failure(ErrorKind::ProviderError);
            });
        }
    }
}

impl SessionEngine {
    pub fn new(gateway: Arc<ProviderGateway>, speech: SpeechBridge) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        Self {
            session: Mutex::new(Session::default()),
            gateway,
            speech,
            auto_submit: true,
            updates,
        }
    }

    /// Whether a non-empty dictation submits on its own
    pub fn with_auto_submit(mut self, auto_submit: bool) -> Self {
        self.auto_submit = auto_submit;
        self
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    pub fn speech(&self) -> &SpeechBridge {
        &self.speech
    }

    /// Apply a mutation and publish the resulting snapshot
    fn mutate<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut session = self.session.lock();
        let result = f(&mut session);
        self.updates.send_replace(session.snapshot());
        result
    }

    // ---- observation ----

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    pub fn state(&self) -> EngineState {
        if self.session.lock().in_flight {
            EngineState::Submitting
        } else {
            EngineState::Idle
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.session.lock().in_flight
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.session.lock().last_error
    }

    pub fn turn(&self, ordinal: usize) -> Result<Turn, SessionError> {
        self.session.lock().ledger.get(ordinal).cloned()
    }

    pub fn is_submittable(&self) -> bool {
        self.session.lock().composer.is_submittable()
    }

    pub fn transcript_markdown(&self) -> String {
        self.session.lock().ledger.to_markdown()
    }

    // ---- composition ----

    pub fn compose_text(&self, value: impl Into<String>) {
        let value = value.into();
        self.mutate(|session| session.composer.set_text(value));
    }

    pub fn compose_image(&self, payload: ImagePayload) -> Result<(), SessionError> {
        // Rejections leave the session untouched, so validate before publishing
        let mut session = self.session.lock();
        session.composer.set_image(payload)?;
        self.updates.send_replace(session.snapshot());
        Ok(())
    }

    pub fn clear_composed_image(&self) {
        self.mutate(|session| session.composer.clear_image());
    }

    // ---- request lifecycle ----

    /// Submit the composed input.
    ///
    /// Appends the question, asks the provider, then appends either its
    /// answer or the fixed apology. Provider failures are reported through
    /// the outcome and `last_error`, never as an `Err`.
    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        let (prompt, image, question) = {
            let mut session = self.session.lock();
            if session.in_flight {
                debug!("Submission already in flight; ignoring submit");
                return Ok(SubmitOutcome::Busy);
            }
            if !session.composer.is_submittable() {
                return Err(SessionError::NotSubmittable);
            }

            session.in_flight = true;
            let prompt = session.composer.text().trim().to_string();
            let image = session.composer.image().cloned();
            let question = session.ledger.append(
                TurnRole::Question,
                prompt.clone(),
                image.as_ref().map(ImagePayload::meta),
            );
            // The staged image stays visible until explicitly cleared
            session.composer.clear_text();
            self.updates.send_replace(session.snapshot());
            (prompt, image, question)
        };
        debug!("Idle -> Submitting (question {})", question);

        let mut guard = InFlightGuard {
            engine: self,
            armed: true,
        };
        let result = self.gateway.ask(&prompt, image.as_ref()).await;
        guard.armed = false;

        let outcome = self.mutate(|session| match result {
            Ok(text) => {
                let answer = session.ledger.append(TurnRole::Answer, text, None);
                session.last_error = None;
                session.in_flight = false;
                SubmitOutcome::Answered { question, answer }
            }
            Err(e) => {
                let error = e.kind().unwrap_or(ErrorKind::ProviderError);
                let answer = session.record_failure(error);
                SubmitOutcome::Failed {
                    question,
                    answer,
                    error,
                }
            }
        });

        match outcome {
            SubmitOutcome::Failed { error, .. } => info!("Submitting -> Idle ({})", error),
            _ => debug!("Submitting -> Idle"),
        }
        Ok(outcome)
    }

    // ---- annotations ----

    pub fn set_feedback(
        &self,
        ordinal: usize,
        kind: Feedback,
    ) -> Result<Option<Feedback>, SessionError> {
        self.mutate(|session| session.ledger.set_feedback(ordinal, kind))
    }

    pub fn toggle_bookmark(&self, ordinal: usize) -> Result<bool, SessionError> {
        self.mutate(|session| session.ledger.toggle_bookmark(ordinal))
    }

    pub fn list_bookmarked(&self) -> Vec<usize> {
        self.session.lock().ledger.list_bookmarked()
    }

    // ---- speech ----

    /// Dictate into the composer.
    ///
    /// A non-empty transcript replaces the pending text and, when auto-submit
    /// is on and nothing is in flight, is submitted straight away.
    pub async fn start_listening(&self) -> Result<ListenOutcome, SessionError> {
        let Some(transcript) = self.speech.listen().await else {
            return Ok(ListenOutcome::Ignored);
        };

        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            debug!("Empty transcript; nothing delivered");
            return Ok(ListenOutcome::Ignored);
        }

        self.compose_text(transcript);

        if self.auto_submit && !self.is_in_flight() {
            return Ok(ListenOutcome::Submitted(self.submit().await?));
        }
        Ok(ListenOutcome::Transcribed)
    }

    pub fn speak(&self, text: &str) -> bool {
        self.speech.speak(text)
    }

    /// Read a ledger turn aloud
    pub fn speak_turn(&self, ordinal: usize) -> Result<bool, SessionError> {
        let turn = self.turn(ordinal)?;
        Ok(self.speech.speak(&turn.content))
    }

    pub fn stop_speaking(&self) {
        self.speech.stop_speaking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GREETING_RESPONSE;
    use crate::provider::{GenerateRequest, Provider};
    use crate::speech::{SpeechRecognizer, Unavailable};
    use anyhow::Result;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Provider that replays scripted replies, optionally waiting on a gate first
    #[derive(Clone, Default)]
    struct ScriptedProvider {
        replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        fn replying(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                )),
                ..Self::default()
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn generate(&self, _request: GenerateRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.replies.lock().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(anyhow::anyhow!(message)),
                None => Err(anyhow::anyhow!("no scripted reply")),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct FixedRecognizer {
        transcript: &'static str,
        release: Option<Arc<Notify>>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        fn is_available(&self) -> bool {
            true
        }

        async fn listen(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(release) = &self.release {
                release.notified().await;
            }
            Ok(self.transcript.to_string())
        }
    }

    fn engine_with(provider: ScriptedProvider) -> SessionEngine {
        engine_with_speech(provider, SpeechBridge::unavailable())
    }

    fn engine_with_speech(provider: ScriptedProvider, speech: SpeechBridge) -> SessionEngine {
        let gateway = ProviderGateway::new(Box::new(provider), Duration::ZERO, None);
        SessionEngine::new(Arc::new(gateway), speech)
    }

    fn png() -> ImagePayload {
        ImagePayload::new(vec![0x89u8, b'P', b'N', b'G'], "image/png")
    }

    #[tokio::test]
    async fn test_greeting_answered_locally() {
        let provider = ScriptedProvider::default();
        let calls = provider.calls.clone();
        let engine = engine_with(provider);

        engine.compose_text("hey");
        let outcome = engine.submit().await.unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Answered {
                question: 0,
                answer: 1
            }
        );
        assert_eq!(engine.turn(1).unwrap().content, GREETING_RESPONSE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!engine.is_in_flight());
        assert_eq!(engine.last_error(), None);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_empty_response_becomes_apology() {
        let engine = engine_with(ScriptedProvider::replying(vec![Ok("")]));

        engine.compose_text("explain recursion");
        let outcome = engine.submit().await.unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                question: 0,
                answer: 1,
                error: ErrorKind::EmptyResponse
            }
        );
        let answer = engine.turn(1).unwrap();
        assert_eq!(answer.role, TurnRole::Answer);
        assert_eq!(answer.content, APOLOGY_MESSAGE);
        assert_eq!(engine.last_error(), Some(ErrorKind::EmptyResponse));
        assert!(!engine.is_in_flight());
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let engine = engine_with(ScriptedProvider::replying(vec![
            Err("503 unavailable"),
            Ok("Recursion is self-reference."),
        ]));

        engine.compose_text("explain recursion");
        engine.submit().await.unwrap();
        assert_eq!(engine.last_error(), Some(ErrorKind::ProviderError));

        engine.compose_text("explain recursion");
        let outcome = engine.submit().await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Answered {
                question: 2,
                answer: 3
            }
        );
        assert_eq!(engine.last_error(), None);
        assert_eq!(engine.turn(3).unwrap().content, "Recursion is self-reference.");
    }

    #[tokio::test]
    async fn test_submit_while_in_flight_is_noop() {
        let gate = Arc::new(Notify::new());
        let provider =
            ScriptedProvider::replying(vec![Err("timeout"), Ok("done")]).gated(gate.clone());
        let engine = engine_with(provider);

        // Establish a last_error first
        engine.compose_text("first");
        let (first, _) = tokio::join!(engine.submit(), async { gate.notify_one() });
        assert!(matches!(first.unwrap(), SubmitOutcome::Failed { .. }));
        assert_eq!(engine.last_error(), Some(ErrorKind::ProviderError));

        engine.compose_text("second");
        let (second, busy) = tokio::join!(engine.submit(), async {
            assert!(engine.is_in_flight());
            assert_eq!(engine.state(), EngineState::Submitting);
            let turns_before = engine.snapshot().turns.len();

            engine.compose_text("third");
            let busy = engine.submit().await;

            assert_eq!(engine.snapshot().turns.len(), turns_before);
            assert_eq!(engine.last_error(), Some(ErrorKind::ProviderError));
            gate.notify_one();
            busy
        });

        assert_eq!(busy.unwrap(), SubmitOutcome::Busy);
        assert_eq!(
            second.unwrap(),
            SubmitOutcome::Answered {
                question: 2,
                answer: 3
            }
        );
        // The refused submission's text is still staged
        assert_eq!(engine.snapshot().pending_text, "third");
    }

    #[tokio::test]
    async fn test_turns_alternate_and_are_gapless() {
        let engine = engine_with(ScriptedProvider::replying(vec![
            Ok("one"),
            Err("boom"),
            Ok("   "),
            Ok("four"),
        ]));

        for prompt in ["a question", "another", "hello", "more", "last"] {
            engine.compose_text(prompt);
            engine.submit().await.unwrap();
        }

        let turns = engine.snapshot().turns;
        assert_eq!(turns.len(), 10);
        for (index, turn) in turns.iter().enumerate() {
            assert_eq!(turn.created_at, index);
            let expected = if index % 2 == 0 {
                TurnRole::Question
            } else {
                TurnRole::Answer
            };
            assert_eq!(turn.role, expected);
        }
    }

    #[tokio::test]
    async fn test_not_submittable_is_rejected_locally() {
        let provider = ScriptedProvider::default();
        let calls = provider.calls.clone();
        let engine = engine_with(provider);

        assert_eq!(engine.submit().await.unwrap_err(), SessionError::NotSubmittable);
        engine.compose_text("   ");
        assert_eq!(engine.submit().await.unwrap_err(), SessionError::NotSubmittable);

        assert!(engine.snapshot().turns.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!engine.is_in_flight());
    }

    #[tokio::test]
    async fn test_image_only_submission() {
        let engine = engine_with(ScriptedProvider::replying(vec![Ok("A PNG header.")]));

        engine.compose_image(png()).unwrap();
        assert!(engine.is_submittable());
        engine.submit().await.unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.turns[0].content, "");
        assert_eq!(
            snapshot.turns[0].image,
            Some(ImageMeta {
                media_type: "image/png".to_string(),
                size_bytes: 4
            })
        );
        assert_eq!(snapshot.turns[1].content, "A PNG header.");
        // Image persists until cleared; text was consumed
        assert!(snapshot.pending_image.is_some());
        assert_eq!(snapshot.pending_text, "");

        engine.clear_composed_image();
        assert!(!engine.is_submittable());
    }

    #[tokio::test]
    async fn test_invalid_attachment_never_enters_session() {
        let engine = engine_with(ScriptedProvider::default());
        let err = engine
            .compose_image(ImagePayload::new(b"hello".to_vec(), "text/plain"))
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidAttachment("text/plain".to_string()));
        assert!(engine.snapshot().pending_image.is_none());
    }

    #[tokio::test]
    async fn test_question_text_is_trimmed_and_cleared() {
        let engine = engine_with(ScriptedProvider::replying(vec![Ok("ok")]));
        engine.compose_text("  explain recursion \n");
        engine.submit().await.unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.turns[0].content, "explain recursion");
        assert_eq!(snapshot.pending_text, "");
    }

    #[tokio::test]
    async fn test_annotations_through_engine() {
        let engine = engine_with(ScriptedProvider::replying(vec![Ok("answer")]));
        engine.compose_text("question");
        engine.submit().await.unwrap();

        assert_eq!(
            engine.set_feedback(0, Feedback::Like).unwrap_err(),
            SessionError::InvalidTarget(0)
        );
        assert_eq!(engine.set_feedback(1, Feedback::Like).unwrap(), Some(Feedback::Like));
        assert_eq!(engine.set_feedback(1, Feedback::Like).unwrap(), None);
        assert_eq!(
            engine.set_feedback(1, Feedback::Dislike).unwrap(),
            Some(Feedback::Dislike)
        );

        assert!(engine.toggle_bookmark(1).unwrap());
        assert!(engine.toggle_bookmark(0).unwrap());
        assert_eq!(engine.list_bookmarked(), vec![0, 1]);
        assert!(!engine.toggle_bookmark(0).unwrap());
        assert_eq!(engine.snapshot().bookmarks, vec![1]);
        assert_eq!(engine.toggle_bookmark(5).unwrap_err(), SessionError::OutOfRange(5));
    }

    #[tokio::test]
    async fn test_subscribers_see_in_flight_and_completion() {
        let gate = Arc::new(Notify::new());
        let engine =
            engine_with(ScriptedProvider::replying(vec![Ok("answer")]).gated(gate.clone()));
        let mut updates = engine.subscribe();

        engine.compose_text("question");
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().pending_text, "question");

        let (outcome, _) = tokio::join!(engine.submit(), async {
            let during = updates.borrow_and_update().clone();
            assert!(during.in_flight);
            assert_eq!(during.turns.len(), 1);
            gate.notify_one();
        });
        outcome.unwrap();

        let after = updates.borrow_and_update().clone();
        assert!(!after.in_flight);
        assert_eq!(after.turns.len(), 2);
    }

    #[tokio::test]
    async fn test_dropped_submission_resolves_to_idle() {
        let gate = Arc::new(Notify::new());
        let engine = engine_with(ScriptedProvider::replying(vec![Ok("late")]).gated(gate));

        engine.compose_text("question");
        let pending = engine.submit();
        let timed_out = tokio::time::timeout(Duration::from_millis(20), pending).await;
        assert!(timed_out.is_err());

        assert!(!engine.is_in_flight());
        assert_eq!(engine.last_error(), Some(ErrorKind::ProviderError));
        let turns = engine.snapshot().turns;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].content, APOLOGY_MESSAGE);
    }

    #[tokio::test]
    async fn test_double_listen_delivers_once() {
        let release = Arc::new(Notify::new());
        let listens = Arc::new(AtomicUsize::new(0));
        let speech = SpeechBridge::new(
            Box::new(FixedRecognizer {
                transcript: "  explain recursion ",
                release: Some(release.clone()),
                calls: listens.clone(),
            }),
            Box::new(Unavailable),
        );
        let provider = ScriptedProvider::replying(vec![Ok("Self reference.")]);
        let calls = provider.calls.clone();
        let engine = engine_with_speech(provider, speech);

        let (first, second) = tokio::join!(engine.start_listening(), async {
            let second = engine.start_listening().await;
            release.notify_one();
            second
        });

        assert_eq!(second.unwrap(), ListenOutcome::Ignored);
        assert_eq!(
            first.unwrap(),
            ListenOutcome::Submitted(SubmitOutcome::Answered {
                question: 0,
                answer: 1
            })
        );
        assert_eq!(listens.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.turn(0).unwrap().content, "explain recursion");
    }

    #[tokio::test]
    async fn test_listen_without_auto_submit_only_stages_text() {
        let speech = SpeechBridge::new(
            Box::new(FixedRecognizer {
                transcript: "what is rust",
                release: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(Unavailable),
        );
        let engine = engine_with_speech(ScriptedProvider::default(), speech).with_auto_submit(false);

        assert_eq!(engine.start_listening().await.unwrap(), ListenOutcome::Transcribed);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.pending_text, "what is rust");
        assert!(snapshot.turns.is_empty());
    }

    #[tokio::test]
    async fn test_blank_transcript_is_not_delivered() {
        let speech = SpeechBridge::new(
            Box::new(FixedRecognizer {
                transcript: "   ",
                release: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(Unavailable),
        );
        let engine = engine_with_speech(ScriptedProvider::default(), speech);
        engine.compose_text("typed text");

        assert_eq!(engine.start_listening().await.unwrap(), ListenOutcome::Ignored);
        assert_eq!(engine.snapshot().pending_text, "typed text");
    }

    #[tokio::test]
    async fn test_listen_while_in_flight_does_not_submit() {
        let gate = Arc::new(Notify::new());
        let speech = SpeechBridge::new(
            Box::new(FixedRecognizer {
                transcript: "follow up",
                release: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(Unavailable),
        );
        let provider = ScriptedProvider::replying(vec![Ok("answer")]).gated(gate.clone());
        let engine = engine_with_speech(provider, speech);

        engine.compose_text("question");
        let (outcome, listened) = tokio::join!(engine.submit(), async {
            let listened = engine.start_listening().await;
            gate.notify_one();
            listened
        });

        outcome.unwrap();
        assert_eq!(listened.unwrap(), ListenOutcome::Transcribed);
        assert_eq!(engine.snapshot().turns.len(), 2);
        assert_eq!(engine.snapshot().pending_text, "follow up");
    }

    #[tokio::test]
    async fn test_speak_without_capability_is_silent() {
        let engine = engine_with(ScriptedProvider::replying(vec![Ok("answer")]));
        engine.compose_text("question");
        engine.submit().await.unwrap();

        assert!(!engine.speak_turn(1).unwrap());
        assert_eq!(engine.speak_turn(4).unwrap_err(), SessionError::OutOfRange(4));
        assert!(!engine.speak("hello"));
        engine.stop_speaking();
    }
}

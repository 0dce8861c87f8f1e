use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::image::load_image;
use super::render::{render_turn, turn_header};
use super::repl::{ReplCommand, HELP_TEXT};
use crate::{
    app::{load_config, load_config_from, Config, UIConfig},
    cli::{handle_command, Cli},
    provider::ProviderGateway,
    session::{Feedback, ListenOutcome, SessionEngine, SessionSnapshot, SubmitOutcome},
    speech::SpeechBridge,
};

/// Load configuration for a run: `--config` file if given, otherwise the
/// layered defaults, with `--model` applied on top
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config_from(config_path)?
    } else {
        match load_config() {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("[WARNING] Failed to load config: {}. Using defaults.", e);
                Config::default()
            }
        }
    };

    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    Ok(config)
}

/// Build an engine wired to the configured provider and speech backends
pub fn build_engine(config: &Config) -> Result<SessionEngine> {
    let gateway = Arc::new(ProviderGateway::from_config(config)?);
    let speech = SpeechBridge::from_settings(&config.speech);
    Ok(SessionEngine::new(gateway, speech).with_auto_submit(config.speech.auto_submit))
}

enum Flow {
    Continue,
    Quit,
}

/// Main runtime orchestrator for interactive chat
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let config = resolve_config(&cli)?;
        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(());
            }
        }

        let engine = match build_engine(&self.config) {
            Ok(engine) => Arc::new(engine),
            Err(e) => {
                eprintln!("[ERROR] Failed to initialize provider: {}", e);
                eprintln!("   Run `aiconnect status` to check your configuration.");
                std::process::exit(1);
            }
        };

        println!(
            "Starting AI Connect with {} ({})",
            self.config.provider.model.green(),
            engine.gateway().provider_name()
        );
        println!("{}", "Type a question, or /help for commands.".bright_black());
        println!();

        let renderer = spawn_renderer(engine.subscribe(), self.config.ui.clone());
        let result = self.repl(&engine).await;

        engine.stop_speaking();
        renderer.abort();
        result
    }

    async fn repl(&self, engine: &Arc<SessionEngine>) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt();
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                break;
            };
            let Some(command) = ReplCommand::parse(&line) else {
                continue;
            };
            debug!("REPL command: {:?}", command);

            if let Flow::Quit = dispatch(engine, command).await {
                break;
            }
        }
        println!();
        Ok(())
    }
}

fn prompt() {
    print!("{} ", ">".cyan().bold());
    let _ = std::io::stdout().flush();
}

fn notice(message: impl std::fmt::Display) {
    println!("{}", message.to_string().bright_black());
}

fn failure(message: impl std::fmt::Display) {
    println!("{}", message.to_string().red());
}

/// Run a submission in the background so the prompt stays responsive
fn spawn_submit(engine: &Arc<SessionEngine>) {
    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        match engine.submit().await {
            Ok(SubmitOutcome::Busy) => {
                notice("Still waiting on the previous answer; your input is kept.")
            }
            Ok(_) => {}
            Err(e) => failure(e),
        }
    });
}

async fn dispatch(engine: &Arc<SessionEngine>, command: ReplCommand) -> Flow {
    match command {
        ReplCommand::Message(text) => {
            engine.compose_text(text);
            spawn_submit(engine);
        }
        ReplCommand::Send => spawn_submit(engine),
        ReplCommand::Image(path) => attach_image(engine, &path).await,
        ReplCommand::ClearImage => {
            engine.clear_composed_image();
            notice("Image removed.");
        }
        ReplCommand::Like(ordinal) => feedback(engine, ordinal, Feedback::Like),
        ReplCommand::Dislike(ordinal) => feedback(engine, ordinal, Feedback::Dislike),
        ReplCommand::Bookmark(ordinal) => match engine.toggle_bookmark(ordinal) {
            Ok(true) => notice(format!("Bookmarked turn {}.", ordinal)),
            Ok(false) => notice(format!("Removed bookmark from turn {}.", ordinal)),
            Err(e) => failure(e),
        },
        ReplCommand::Bookmarks => show_bookmarks(engine),
        ReplCommand::Listen => listen(engine),
        ReplCommand::Speak(ordinal) => match engine.speak_turn(ordinal) {
            Ok(true) => notice(format!("Reading turn {} aloud. /stop to cancel.", ordinal)),
            Ok(false) => notice("Read aloud is unavailable."),
            Err(e) => failure(e),
        },
        ReplCommand::Stop => engine.stop_speaking(),
        ReplCommand::Export(path) => export(engine, path.as_deref()).await,
        ReplCommand::Help => println!("{}", HELP_TEXT),
        ReplCommand::Quit => return Flow::Quit,
        ReplCommand::Invalid(message) => failure(message),
    }
    Flow::Continue
}

async fn attach_image(engine: &SessionEngine, path: &Path) {
    let payload = match load_image(path).await {
        Ok(payload) => payload,
        Err(e) => return failure(format!("{:#}", e)),
    };
    let meta = payload.meta();
    match engine.compose_image(payload) {
        Ok(()) => notice(format!(
            "Attached {} ({} bytes). It stays attached until /clear-image.",
            meta.media_type, meta.size_bytes
        )),
        Err(e) => failure(e),
    }
}

fn feedback(engine: &SessionEngine, ordinal: usize, kind: Feedback) {
    match engine.set_feedback(ordinal, kind) {
        Ok(Some(Feedback::Like)) => notice(format!("Liked answer {}.", ordinal)),
        Ok(Some(Feedback::Dislike)) => notice(format!("Disliked answer {}.", ordinal)),
        Ok(None) => notice(format!("Cleared feedback on answer {}.", ordinal)),
        Err(e) => failure(e),
    }
}

fn show_bookmarks(engine: &SessionEngine) {
    let snapshot = engine.snapshot();
    if snapshot.bookmarks.is_empty() {
        return notice("No bookmarks yet.");
    }
    let ui = UIConfig {
        render_markdown: false,
        show_timestamps: true,
    };
    for ordinal in snapshot.bookmarks {
        let Some(turn) = snapshot.turns.get(ordinal) else {
            continue;
        };
        let annotation = snapshot.annotations.get(&ordinal).copied().unwrap_or_default();
        println!("{}", turn_header(turn, &annotation, &ui));
        let first_line = turn.content.lines().next().unwrap_or("");
        println!("  {}", first_line);
    }
}

fn listen(engine: &Arc<SessionEngine>) {
    if !engine.speech().can_listen() {
        return notice("Dictation is unavailable. Set speech.listen_command in the config.");
    }
    if engine.speech().is_listening() {
        return notice("Already listening.");
    }

    notice("Listening...");
    let engine = Arc::clone(engine);
    tokio::spawn(async move {
        match engine.start_listening().await {
            Ok(ListenOutcome::Ignored) => notice("Nothing was heard."),
            Ok(ListenOutcome::Transcribed) => notice(format!(
                "Heard: \"{}\". /send to submit it.",
                engine.snapshot().pending_text
            )),
            Ok(ListenOutcome::Submitted(SubmitOutcome::Busy)) => {
                notice("Still waiting on the previous answer; your input is kept.")
            }
            Ok(ListenOutcome::Submitted(_)) => {}
            Err(e) => failure(e),
        }
    });
}

async fn export(engine: &SessionEngine, path: Option<&Path>) {
    let markdown = engine.transcript_markdown();
    let Some(path) = path else {
        println!("{}", markdown);
        return;
    };
    match tokio::fs::write(path, markdown).await {
        Ok(()) => notice(format!("Transcript written to {}.", path.display())),
        Err(e) => {
            warn!("Failed to write transcript: {}", e);
            failure(format!("Failed to write {}: {}", path.display(), e));
        }
    }
}

/// Print turns as they land in the ledger
fn spawn_renderer(mut updates: watch::Receiver<SessionSnapshot>, ui: UIConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rendered = 0;
        let mut was_in_flight = false;

        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();

            let fresh = snapshot.turns.len() > rendered;
            if fresh {
                println!();
            }
            for turn in snapshot.turns.iter().skip(rendered) {
                let annotation = snapshot
                    .annotations
                    .get(&turn.created_at)
                    .copied()
                    .unwrap_or_default();
                println!("{}", render_turn(turn, &annotation, &ui));
                println!();
            }
            rendered = snapshot.turns.len();

            if snapshot.in_flight && !was_in_flight {
                notice("Thinking...");
            }
            if fresh && !snapshot.in_flight {
                if let Some(error) = snapshot.last_error {
                    failure(format!("Request failed: {}", error));
                }
                prompt();
            }
            was_in_flight = snapshot.in_flight;
        }
    })
}

/// Terminal runtime module - Gateway

mod image;
mod markdown;
mod non_interactive;
mod orchestrator;
mod render;
mod repl;

pub use image::{load_image, media_type_for};
pub use markdown::render_markdown;
pub use non_interactive::{ExecutionMetadata, NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::{build_engine, resolve_config, Orchestrator};
pub use render::{render_turn, turn_header};
pub use repl::{ReplCommand, HELP_TEXT};

/// Speech module - Gateway

mod bridge;
mod command;
mod traits;
mod unavailable;

pub use bridge::SpeechBridge;
pub use command::{CommandRecognizer, CommandSynthesizer};
pub use traits::{Playback, SpeechRecognizer, SpeechSynthesizer};
pub use unavailable::Unavailable;

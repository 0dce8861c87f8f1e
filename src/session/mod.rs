/// Session management module - Gateway

mod attachment;
mod engine;
mod ledger;

pub use attachment::AttachmentComposer;
pub use engine::{EngineState, ListenOutcome, SessionEngine, SessionSnapshot, SubmitOutcome};
pub use ledger::{Annotation, ConversationLedger, Feedback, Turn, TurnRole};

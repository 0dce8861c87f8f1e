use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::provider::ImageMeta;
use crate::utils::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Question,
    Answer,
}

/// One immutable entry in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    /// Append index in the ledger: dense, zero-based
    pub created_at: usize,
    pub timestamp: DateTime<Local>,
    /// Image that accompanied a question, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Like,
    Dislike,
}

/// User-supplied metadata attached to a turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub feedback: Option<Feedback>,
    pub bookmarked: bool,
}

/// Append-only log of turns plus their annotations
#[derive(Debug, Clone, Default)]
pub struct ConversationLedger {
    turns: Vec<Turn>,
    annotations: BTreeMap<usize, Annotation>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return its ordinal
    pub fn append(&mut self, role: TurnRole, content: impl Into<String>, image: Option<ImageMeta>) -> usize {
        let ordinal = self.turns.len();
        self.turns.push(Turn {
            role,
            content: content.into(),
            created_at: ordinal,
            timestamp: Local::now(),
            image,
        });
        ordinal
    }

    pub fn get(&self, ordinal: usize) -> Result<&Turn, SessionError> {
        self.turns.get(ordinal).ok_or(SessionError::OutOfRange(ordinal))
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Annotation for a turn; untouched turns report the default
    pub fn annotation(&self, ordinal: usize) -> Annotation {
        self.annotations.get(&ordinal).copied().unwrap_or_default()
    }

    pub fn annotations(&self) -> &BTreeMap<usize, Annotation> {
        &self.annotations
    }

    /// Toggle feedback on an answer turn.
    ///
    /// Repeating the current kind clears it; a different kind overwrites it.
    /// Returns the feedback now in effect.
    pub fn set_feedback(
        &mut self,
        ordinal: usize,
        kind: Feedback,
    ) -> Result<Option<Feedback>, SessionError> {
        if self.get(ordinal)?.role != TurnRole::Answer {
            return Err(SessionError::InvalidTarget(ordinal));
        }

        let annotation = self.annotations.entry(ordinal).or_default();
        annotation.feedback = if annotation.feedback == Some(kind) {
            None
        } else {
            Some(kind)
        };
        Ok(annotation.feedback)
    }

    /// Flip the bookmark on any turn; returns the new state
    pub fn toggle_bookmark(&mut self, ordinal: usize) -> Result<bool, SessionError> {
        self.get(ordinal)?;
        let annotation = self.annotations.entry(ordinal).or_default();
        annotation.bookmarked = !annotation.bookmarked;
        Ok(annotation.bookmarked)
    }

    /// Bookmarked ordinals, ascending
    pub fn list_bookmarked(&self) -> Vec<usize> {
        self.annotations
            .iter()
            .filter(|(_, annotation)| annotation.bookmarked)
            .map(|(ordinal, _)| *ordinal)
            .collect()
    }

    /// Render the conversation as a markdown document
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            let annotation = self.annotation(turn.created_at);
            let heading = match turn.role {
                TurnRole::Question => "Your Question",
                TurnRole::Answer => "AI Response",
            };
            out.push_str(&format!("## [{}] {}", turn.created_at, heading));
            if annotation.bookmarked {
                out.push_str(" (bookmarked)");
            }
            match annotation.feedback {
                Some(Feedback::Like) => out.push_str(" 👍"),
                Some(Feedback::Dislike) => out.push_str(" 👎"),
                None => {}
            }
            out.push_str("\n\n");
            if let Some(image) = &turn.image {
                out.push_str(&format!(
                    "_Attached image: {} ({} bytes)_\n\n",
                    image.media_type, image.size_bytes
                ));
            }
            if !turn.content.is_empty() {
                out.push_str(&turn.content);
                out.push_str("\n\n");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger_with_exchange() -> ConversationLedger {
        let mut ledger = ConversationLedger::new();
        ledger.append(TurnRole::Question, "explain recursion", None);
        ledger.append(TurnRole::Answer, "A function that calls itself.", None);
        ledger
    }

    #[test]
    fn test_ordinals_are_dense() {
        let mut ledger = ConversationLedger::new();
        assert_eq!(ledger.append(TurnRole::Question, "a", None), 0);
        assert_eq!(ledger.append(TurnRole::Answer, "b", None), 1);
        assert_eq!(ledger.append(TurnRole::Question, "c", None), 2);
        assert_eq!(ledger.get(2).unwrap().created_at, 2);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_get_out_of_range() {
        let ledger = ledger_with_exchange();
        assert_eq!(ledger.get(2).unwrap_err(), SessionError::OutOfRange(2));
    }

    #[test]
    fn test_feedback_toggle_and_overwrite() {
        let mut ledger = ledger_with_exchange();

        assert_eq!(ledger.set_feedback(1, Feedback::Like).unwrap(), Some(Feedback::Like));
        assert_eq!(ledger.set_feedback(1, Feedback::Like).unwrap(), None);
        assert_eq!(ledger.annotation(1).feedback, None);

        ledger.set_feedback(1, Feedback::Like).unwrap();
        assert_eq!(
            ledger.set_feedback(1, Feedback::Dislike).unwrap(),
            Some(Feedback::Dislike)
        );
        assert_eq!(ledger.annotation(1).feedback, Some(Feedback::Dislike));
    }

    #[test]
    fn test_feedback_only_on_answers() {
        let mut ledger = ledger_with_exchange();
        assert_eq!(
            ledger.set_feedback(0, Feedback::Like).unwrap_err(),
            SessionError::InvalidTarget(0)
        );
        assert_eq!(
            ledger.set_feedback(7, Feedback::Like).unwrap_err(),
            SessionError::OutOfRange(7)
        );
        assert_eq!(ledger.annotation(0), Annotation::default());
    }

    #[test]
    fn test_bookmark_involution_and_listing() {
        let mut ledger = ledger_with_exchange();
        ledger.append(TurnRole::Question, "and iteration?", None);
        ledger.append(TurnRole::Answer, "Loops.", None);

        assert!(ledger.toggle_bookmark(3).unwrap());
        assert!(ledger.toggle_bookmark(0).unwrap());
        assert!(ledger.toggle_bookmark(1).unwrap());
        assert_eq!(ledger.list_bookmarked(), vec![0, 1, 3]);

        assert!(!ledger.toggle_bookmark(1).unwrap());
        assert_eq!(ledger.list_bookmarked(), vec![0, 3]);
        // The turn itself is untouched
        assert_eq!(ledger.get(1).unwrap().content, "A function that calls itself.");

        assert_eq!(ledger.toggle_bookmark(9).unwrap_err(), SessionError::OutOfRange(9));
    }

    #[test]
    fn test_bookmark_and_feedback_are_independent() {
        let mut ledger = ledger_with_exchange();
        ledger.set_feedback(1, Feedback::Like).unwrap();
        ledger.toggle_bookmark(1).unwrap();
        ledger.set_feedback(1, Feedback::Like).unwrap();

        assert_eq!(
            ledger.annotation(1),
            Annotation {
                feedback: None,
                bookmarked: true
            }
        );
    }

    #[test]
    fn test_markdown_export() {
        let mut ledger = ConversationLedger::new();
        ledger.append(
            TurnRole::Question,
            "",
            Some(ImageMeta {
                media_type: "image/png".to_string(),
                size_bytes: 12,
            }),
        );
        ledger.append(TurnRole::Answer, "A red square.", None);
        ledger.toggle_bookmark(1).unwrap();

        assert_eq!(
            ledger.to_markdown(),
            "## [0] Your Question\n\n_Attached image: image/png (12 bytes)_\n\n\
             ## [1] AI Response (bookmarked)\n\nA red square.\n\n"
        );
    }
}

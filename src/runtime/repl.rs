use std::path::PathBuf;

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text to compose and submit
    Message(String),
    /// Submit whatever is staged (dictated text, or an image alone)
    Send,
    Image(PathBuf),
    ClearImage,
    Like(usize),
    Dislike(usize),
    Bookmark(usize),
    Bookmarks,
    Listen,
    Speak(usize),
    Stop,
    /// Print the transcript, or write it to a file
    Export(Option<PathBuf>),
    Help,
    Quit,
    /// Malformed command; carries the message to show
    Invalid(String),
}

pub const HELP_TEXT: &str = "Commands:\n\
    /send           - Submit the staged text and image\n\
    /image <path>   - Attach an image to the next question\n\
    /clear-image    - Remove the attached image\n\
    /like <n>       - Toggle a like on answer n\n\
    /dislike <n>    - Toggle a dislike on answer n\n\
    /bookmark <n>   - Toggle a bookmark on turn n\n\
    /bookmarks      - List bookmarked turns\n\
    /listen         - Dictate a question\n\
    /speak <n>      - Read turn n aloud\n\
    /stop           - Stop reading aloud\n\
    /export [path]  - Print or save the transcript as markdown\n\
    /help/h         - Show this help\n\
    /quit/q         - Quit\n\
    \n\
    Anything else is sent as a question.";

fn ordinal(command: &str, arg: Option<&str>) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| format!("Usage: /{} <turn number>", command))?;
    arg.parse()
        .map_err(|_| format!("Not a turn number: {}", arg))
}

impl ReplCommand {
    /// Parse a line; `None` for blank input
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Some(Self::Message(line.to_string()));
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (command, None),
        };

        let by_ordinal = |make: fn(usize) -> Self| match ordinal(name, rest) {
            Ok(n) => make(n),
            Err(message) => Self::Invalid(message),
        };

        let parsed = match name {
            "image" => match rest {
                Some(path) => Self::Image(PathBuf::from(path)),
                None => Self::Invalid("Usage: /image <path>".to_string()),
            },
            "send" => Self::Send,
            "clear-image" => Self::ClearImage,
            "like" => by_ordinal(Self::Like),
            "dislike" => by_ordinal(Self::Dislike),
            "bookmark" => by_ordinal(Self::Bookmark),
            "bookmarks" => Self::Bookmarks,
            "listen" => Self::Listen,
            "speak" => by_ordinal(Self::Speak),
            "stop" => Self::Stop,
            "export" => Self::Export(rest.map(PathBuf::from)),
            "help" | "h" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => Self::Invalid(format!("Unknown command: /{}", other)),
        };
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            ReplCommand::parse("  explain recursion \n"),
            Some(ReplCommand::Message("explain recursion".to_string()))
        );
        assert_eq!(ReplCommand::parse("   "), None);
    }

    #[test]
    fn test_ordinal_commands() {
        assert_eq!(ReplCommand::parse("/like 3"), Some(ReplCommand::Like(3)));
        assert_eq!(ReplCommand::parse("/dislike 1"), Some(ReplCommand::Dislike(1)));
        assert_eq!(ReplCommand::parse("/bookmark  0"), Some(ReplCommand::Bookmark(0)));
        assert_eq!(ReplCommand::parse("/speak 5"), Some(ReplCommand::Speak(5)));
        assert_eq!(
            ReplCommand::parse("/like"),
            Some(ReplCommand::Invalid("Usage: /like <turn number>".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("/like two"),
            Some(ReplCommand::Invalid("Not a turn number: two".to_string()))
        );
    }

    #[test]
    fn test_path_commands() {
        assert_eq!(
            ReplCommand::parse("/image ~/Pictures/my cat.png"),
            Some(ReplCommand::Image(PathBuf::from("~/Pictures/my cat.png")))
        );
        assert_eq!(ReplCommand::parse("/export"), Some(ReplCommand::Export(None)));
        assert_eq!(
            ReplCommand::parse("/export chat.md"),
            Some(ReplCommand::Export(Some(PathBuf::from("chat.md"))))
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(ReplCommand::parse("/send"), Some(ReplCommand::Send));
        assert_eq!(ReplCommand::parse("/clear-image"), Some(ReplCommand::ClearImage));
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/h"), Some(ReplCommand::Help));
        assert_eq!(
            ReplCommand::parse("/model gpt"),
            Some(ReplCommand::Invalid("Unknown command: /model".to_string()))
        );
    }
}

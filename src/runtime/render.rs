use colored::Colorize;

use super::markdown::render_markdown;
use crate::app::UIConfig;
use crate::session::{Annotation, Feedback, Turn, TurnRole};

/// Header line for a turn: ordinal, role label and annotation markers
pub fn turn_header(turn: &Turn, annotation: &Annotation, ui: &UIConfig) -> String {
    let label = match turn.role {
        TurnRole::Question => "You".cyan().bold(),
        TurnRole::Answer => "AI".green().bold(),
    };
    let mut header = format!("{} {}", format!("[{}]", turn.created_at).bright_black(), label);

    if ui.show_timestamps {
        header.push_str(&format!(
            " {}",
            turn.timestamp.format("%H:%M:%S").to_string().bright_black()
        ));
    }
    match annotation.feedback {
        Some(Feedback::Like) => header.push_str(&format!(" {}", "+1".green())),
        Some(Feedback::Dislike) => header.push_str(&format!(" {}", "-1".red())),
        None => {}
    }
    if annotation.bookmarked {
        header.push_str(&format!(" {}", "*".yellow()));
    }
    header
}

/// Full terminal rendering of a turn
pub fn render_turn(turn: &Turn, annotation: &Annotation, ui: &UIConfig) -> String {
    let mut lines = vec![turn_header(turn, annotation, ui)];

    if let Some(image) = &turn.image {
        lines.push(
            format!("  [image: {}, {} bytes]", image.media_type, image.size_bytes)
                .bright_black()
                .to_string(),
        );
    }

    let body = if ui.render_markdown && turn.role == TurnRole::Answer {
        render_markdown(&turn.content)
    } else {
        turn.content.lines().map(str::to_string).collect()
    };
    lines.extend(body.into_iter().map(|line| format!("  {}", line)));
    lines.join("\n")
}

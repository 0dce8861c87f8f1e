use colored::{Color, ColoredString, Colorize};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Text attributes accumulated while walking nested markdown tags
#[derive(Debug, Clone, Copy, Default)]
struct Style {
    color: Option<Color>,
    bold: bool,
    italic: bool,
    strikethrough: bool,
    underline: bool,
}

impl Style {
    fn fg(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    fn apply(&self, text: &str) -> ColoredString {
        let mut styled: ColoredString = text.normal();
        if let Some(color) = self.color {
            styled = styled.color(color);
        }
        if self.bold {
            styled = styled.bold();
        }
        if self.italic {
            styled = styled.italic();
        }
        if self.strikethrough {
            styled = styled.strikethrough();
        }
        if self.underline {
            styled = styled.underline();
        }
        styled
    }
}

fn flush(lines: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        lines.push(std::mem::take(current));
    }
}

/// Render markdown into styled terminal lines
pub fn render_markdown(input: &str) -> Vec<String> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(input, options);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut style_stack = vec![Style::default()];
    let mut in_code_block = false;
    let mut code_block_content = String::new();
    let mut list_depth: usize = 0;

    for event in parser {
        let top = style_stack.last().copied().unwrap_or_default();
        match event {
            Event::Start(tag) => {
                let new_style = match tag {
                    Tag::Heading { level, .. } => {
                        flush(&mut lines, &mut current);
                        let (prefix, color) = match level {
                            HeadingLevel::H1 => ("# ", Color::Cyan),
                            HeadingLevel::H2 => ("## ", Color::Blue),
                            HeadingLevel::H3 => ("### ", Color::Green),
                            _ => ("#### ", Color::Yellow),
                        };
                        let style = Style {
                            bold: true,
                            ..Style::fg(color)
                        };
                        current.push_str(&style.apply(prefix).to_string());
                        style
                    }
                    Tag::Emphasis => Style { italic: true, ..top },
                    Tag::Strong => Style { bold: true, ..top },
                    Tag::Strikethrough => Style {
                        strikethrough: true,
                        ..top
                    },
                    Tag::CodeBlock(kind) => {
                        in_code_block = true;
                        code_block_content.clear();
                        flush(&mut lines, &mut current);
                        let lang = match kind {
                            CodeBlockKind::Fenced(lang) => lang.to_string(),
                            CodeBlockKind::Indented => String::new(),
                        };
                        lines.push(format!(
                            "{}{}",
                            "```".bright_black(),
                            lang.magenta()
                        ));
                        Style::fg(Color::White)
                    }
                    Tag::List(_) => {
                        list_depth += 1;
                        flush(&mut lines, &mut current);
                        top
                    }
                    Tag::Item => {
                        let indent = "  ".repeat(list_depth.saturating_sub(1));
                        current.push_str(&indent);
                        current.push_str(&"• ".yellow().to_string());
                        top
                    }
                    Tag::Link { .. } => {
                        current.push_str(&"[".blue().to_string());
                        Style {
                            underline: true,
                            ..Style::fg(Color::Blue)
                        }
                    }
                    Tag::BlockQuote(_) => {
                        flush(&mut lines, &mut current);
                        current.push_str(&"│ ".bright_black().to_string());
                        Style {
                            italic: true,
                            ..Style::fg(Color::White)
                        }
                    }
                    _ => top,
                };
                style_stack.push(new_style);
            }
            Event::End(tag) => {
                style_stack.pop();
                match tag {
                    TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item | TagEnd::BlockQuote(_) => {
                        flush(&mut lines, &mut current);
                    }
                    TagEnd::CodeBlock => {
                        in_code_block = false;
                        for line in code_block_content.lines() {
                            lines.push(line.white().to_string());
                        }
                        lines.push("```".bright_black().to_string());
                        code_block_content.clear();
                    }
                    TagEnd::List(_) => {
                        list_depth = list_depth.saturating_sub(1);
                    }
                    TagEnd::Link => {
                        current.push_str(&"]".blue().to_string());
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if in_code_block {
                    code_block_content.push_str(&text);
                } else {
                    current.push_str(&top.apply(&text).to_string());
                }
            }
            Event::Code(code) => {
                current.push_str(&format!(" {} ", code).yellow().on_truecolor(40, 40, 40).to_string());
            }
            Event::SoftBreak | Event::HardBreak => {
                flush(&mut lines, &mut current);
            }
            _ => {}
        }
    }

    flush(&mut lines, &mut current);
    lines
}

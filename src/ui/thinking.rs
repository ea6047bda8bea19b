use crate::activity::adapters::ToolIcon;
use crate::ui::accordion::Accordion;

pub const THINKING_HEADER: &str = "Agent Thinking";

/// Transcript panel; renders nothing while the transcript is empty.
pub fn render_thinking(content: &str, expanded: bool) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    let body: Vec<String> = content.lines().map(|l| l.to_string()).collect();
    Accordion::new(THINKING_HEADER)
        .with_icon(ToolIcon::Brain)
        .controlled(expanded)
        .render(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transcript_renders_nothing() {
        assert!(render_thinking("", true).is_empty());
    }

    #[test]
    fn expanded_transcript_keeps_blank_separator() {
        let lines = render_thinking("A\n\nB", true);
        assert_eq!(lines[0], "▾ ✦ Agent Thinking");
        assert_eq!(&lines[1..], &["  A".to_string(), "  ".to_string(), "  B".to_string()]);
    }
}

use crate::activity::adapters::AdapterRegistry;
use crate::models::activity::ActivitySnapshot;
use crate::ui::thinking::render_thinking;
use crate::ui::tool_calls::render_tool_calls;

/// Composite thinking + tool-call panel.
///
/// Owns the expanded state of both sub-panels and drives them as controlled
/// accordions. Both expand when work starts; neither collapses on its own.
#[derive(Debug, Clone, Default)]
pub struct AgentActivityPanel {
    thinking_expanded: bool,
    tools_expanded: bool,
    was_working: bool,
}

impl AgentActivityPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest `is_working`; a false-to-true edge expands both sub-panels.
    pub fn observe(&mut self, is_working: bool) {
        if is_working && !self.was_working {
            self.thinking_expanded = true;
            self.tools_expanded = true;
        }
        self.was_working = is_working;
    }

    pub fn toggle_thinking(&mut self) -> bool {
        self.thinking_expanded = !self.thinking_expanded;
        self.thinking_expanded
    }

    pub fn toggle_tools(&mut self) -> bool {
        self.tools_expanded = !self.tools_expanded;
        self.tools_expanded
    }

    pub fn thinking_expanded(&self) -> bool {
        self.thinking_expanded
    }

    pub fn tools_expanded(&self) -> bool {
        self.tools_expanded
    }

    pub fn render(&mut self, snapshot: &ActivitySnapshot, adapters: &AdapterRegistry, key_argument_max_chars: usize) -> Vec<String> {
        self.observe(snapshot.is_working());
        if !snapshot.has_activity() {
            return Vec::new();
        }
        let mut lines = render_thinking(&snapshot.thinking, self.thinking_expanded);
        lines.extend(render_tool_calls(
            &snapshot.tool_calls,
            adapters,
            self.tools_expanded,
            key_argument_max_chars,
        ));
        lines
    }
}

use crate::activity::adapters::{AdapterRegistry, ToolIcon};
use crate::models::activity::ToolCallRecord;
use crate::ui::accordion::Accordion;
use crate::ui::tool_item::render_tool_item;

pub fn tools_header(count: usize) -> String {
    format!("Tools Used ({count})")
}

/// Tool-call list panel; renders nothing when there are no calls.
pub fn render_tool_calls(
    tool_calls: &[ToolCallRecord],
    adapters: &AdapterRegistry,
    expanded: bool,
    key_argument_max_chars: usize,
) -> Vec<String> {
    if tool_calls.is_empty() {
        return Vec::new();
    }
    let body: Vec<String> = tool_calls
        .iter()
        .flat_map(|tc| render_tool_item(tc, adapters.icon(&tc.name), key_argument_max_chars))
        .collect();
    Accordion::new(tools_header(tool_calls.len()))
        .with_icon(ToolIcon::Wrench)
        .controlled(expanded)
        .render(&body)
}

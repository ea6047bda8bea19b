pub mod accordion;
pub mod panel;
pub mod thinking;
pub mod tool_calls;
pub mod tool_item;

pub use accordion::Accordion;
pub use panel::AgentActivityPanel;

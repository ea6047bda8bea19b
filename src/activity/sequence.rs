use std::collections::HashMap;

/// Synthesizes call ids when the event source does not supply one.
///
/// Counters are per tool name and per instance, so two aggregators never share ids
/// and calls started within the same instant never collide.
#[derive(Debug, Default, Clone)]
pub struct CallSequence {
    counters: HashMap<String, u64>,
}

impl CallSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, tool_name: &str) -> String {
        let counter = self.counters.entry(tool_name.to_string()).or_insert(0);
        *counter += 1;
        format!("{tool_name}-{counter}")
    }
}

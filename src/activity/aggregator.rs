use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

use crate::activity::adapters::AdapterRegistry;
use crate::models::activity::{ActivitySnapshot, NewToolCall, ToolCallRecord, ToolCallStatus};

const THINKING_SEPARATOR: &str = "\n\n";

/// Canonical owner of the tool-call records and the thinking transcript of one turn.
///
/// Mutations are idempotent towards duplicate or late events: a repeated id is
/// ignored, a completion for an untracked id is ignored, and a terminal record
/// never changes status again.
#[derive(Debug)]
pub struct ActivityAggregator {
    adapters: Arc<AdapterRegistry>,
    turn_id: Uuid,
    records: Vec<ToolCallRecord>,
    index: HashMap<String, usize>,
    start_times: HashMap<String, Instant>,
    thinking: String,
}

impl ActivityAggregator {
    pub fn new(adapters: Arc<AdapterRegistry>) -> Self {
        Self {
            adapters,
            turn_id: Uuid::new_v4(),
            records: Vec::new(),
            index: HashMap::new(),
            start_times: HashMap::new(),
            thinking: String::new(),
        }
    }

    pub fn adapters(&self) -> &Arc<AdapterRegistry> {
        &self.adapters
    }

    /// Returns false when the id is already tracked.
    pub fn add_tool_call(&mut self, call: NewToolCall, started_at: Option<Instant>) -> bool {
        if self.index.contains_key(&call.id) {
            tracing::debug!(id = %call.id, "ignoring duplicate tool call id");
            return false;
        }

        let record = ToolCallRecord {
            display_name: self.adapters.display_name(&call.name),
            key_argument: self.adapters.key_argument(&call.name, &call.args),
            id: call.id.clone(),
            name: call.name,
            status: ToolCallStatus::Executing,
            args: call.args,
            result: None,
            result_summary: None,
            error: None,
            duration_ms: None,
        };

        if let Some(started_at) = started_at {
            self.start_times.insert(call.id.clone(), started_at);
        }
        self.index.insert(call.id, self.records.len());
        self.records.push(record);
        true
    }

    /// Returns false when the id is unknown or the record is already terminal.
    pub fn complete_tool_call(
        &mut self,
        id: &str,
        result: Value,
        error: Option<String>,
        ended_at: Instant,
    ) -> bool {
        let Some(&idx) = self.index.get(id) else {
            tracing::warn!(id, "completion for untracked tool call");
            return false;
        };
        let duration_ms = self
            .start_times
            .get(id)
            .map(|started| ended_at.saturating_duration_since(*started).as_millis().min(u128::from(u64::MAX)) as u64);

        let record = &mut self.records[idx];
        if record.status.is_terminal() {
            tracing::debug!(id, "tool call already terminal");
            return false;
        }

        match error {
            Some(message) => {
                record.status = ToolCallStatus::Error;
                record.error = Some(message);
                record.result_summary = None;
            }
            None => {
                record.status = ToolCallStatus::Complete;
                record.result_summary = Some(self.adapters.summarize(&record.name, &result));
            }
        }
        record.result = Some(result);
        record.duration_ms = duration_ms;
        true
    }

    pub fn append_thinking(&mut self, fragment: &str) {
        if self.thinking.is_empty() {
            self.thinking.push_str(fragment);
        } else {
            self.thinking.push_str(THINKING_SEPARATOR);
            self.thinking.push_str(fragment);
        }
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.index.clear();
        self.start_times.clear();
        self.thinking.clear();
        self.turn_id = Uuid::new_v4();
    }

    pub fn is_working(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.status == ToolCallStatus::Executing)
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        &self.records
    }

    pub fn thinking(&self) -> &str {
        &self.thinking
    }

    pub fn turn_id(&self) -> Uuid {
        self.turn_id
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            turn_id: self.turn_id,
            tool_calls: self.records.clone(),
            thinking: self.thinking.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use serde_json::json;

    fn aggregator() -> ActivityAggregator {
        ActivityAggregator::new(Arc::new(AdapterRegistry::builtin()))
    }

    fn call(id: &str, name: &str) -> NewToolCall {
        NewToolCall {
            id: id.to_string(),
            name: name.to_string(),
            args: json!({"query": "q"}),
        }
    }

    #[test]
    fn add_resolves_display_name_and_key_argument() {
        let mut agg = aggregator();
        assert!(agg.add_tool_call(call("1", "tavily_search"), Some(Instant::now())));
        let rec = &agg.tool_calls()[0];
        assert_eq!(rec.display_name, "Web Search");
        assert_eq!(rec.key_argument.as_deref(), Some("q"));
        assert_eq!(rec.status, ToolCallStatus::Executing);
        assert!(agg.is_working());
    }

    #[test]
    fn duplicate_ids_yield_one_record() {
        let mut agg = aggregator();
        assert!(agg.add_tool_call(call("1", "tavily_search"), None));
        assert!(!agg.add_tool_call(call("1", "fetch_url"), None));
        assert_eq!(agg.tool_calls().len(), 1);
        assert_eq!(agg.tool_calls()[0].name, "tavily_search");
    }

    #[test]
    fn completing_unknown_id_is_a_no_op() {
        let mut agg = aggregator();
        agg.add_tool_call(call("1", "tavily_search"), None);
        let before = agg.snapshot();
        assert!(!agg.complete_tool_call("nope", json!({}), None, Instant::now()));
        assert_eq!(agg.snapshot(), before);
    }

    #[test]
    fn completion_computes_summary_and_duration() {
        let mut agg = aggregator();
        let started = Instant::now();
        agg.add_tool_call(call("1", "tavily_search"), Some(started));
        let ended = started + Duration::from_millis(1250);
        assert!(agg.complete_tool_call("1", json!({"results": [1, 2, 3]}), None, ended));

        let rec = &agg.tool_calls()[0];
        assert_eq!(rec.status, ToolCallStatus::Complete);
        assert_eq!(rec.result_summary.as_deref(), Some("Found 3 results"));
        assert_eq!(rec.duration_ms, Some(1250));
        assert!(!agg.is_working());
    }

    #[test]
    fn duration_absent_without_start_time() {
        let mut agg = aggregator();
        agg.add_tool_call(call("1", "tavily_search"), None);
        agg.complete_tool_call("1", json!({}), None, Instant::now());
        assert_eq!(agg.tool_calls()[0].duration_ms, None);
    }

    #[test]
    fn error_skips_summary() {
        let mut agg = aggregator();
        agg.add_tool_call(call("1", "tavily_search"), Some(Instant::now()));
        agg.complete_tool_call("1", json!({"results": []}), Some("rate limited".to_string()), Instant::now());
        let rec = &agg.tool_calls()[0];
        assert_eq!(rec.status, ToolCallStatus::Error);
        assert_eq!(rec.error.as_deref(), Some("rate limited"));
        assert!(rec.result_summary.is_none());
    }

    #[test]
    fn terminal_status_is_final() {
        let mut agg = aggregator();
        agg.add_tool_call(call("1", "tavily_search"), None);
        agg.complete_tool_call("1", json!({"results": [1]}), None, Instant::now());
        assert!(!agg.complete_tool_call("1", json!({}), Some("late".to_string()), Instant::now()));
        assert_eq!(agg.tool_calls()[0].status, ToolCallStatus::Complete);
        assert!(agg.tool_calls()[0].error.is_none());
    }

    #[test]
    fn thinking_fragments_are_joined_by_blank_line() {
        let mut agg = aggregator();
        agg.append_thinking("A");
        agg.append_thinking("B");
        assert_eq!(agg.thinking(), "A\n\nB");
    }

    #[test]
    fn reset_clears_everything_and_starts_new_turn() {
        let mut agg = aggregator();
        let turn = agg.turn_id();
        agg.add_tool_call(call("1", "tavily_search"), Some(Instant::now()));
        agg.append_thinking("plan");
        agg.reset();
        assert!(agg.tool_calls().is_empty());
        assert_eq!(agg.thinking(), "");
        assert!(!agg.is_working());
        assert_ne!(agg.turn_id(), turn);
        assert!(agg.add_tool_call(call("1", "tavily_search"), None));
    }
}

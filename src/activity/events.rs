use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::dedup::{complete_key, start_key, think_key};
use crate::activity::throttle::ActivityHandle;
use crate::models::activity::NewToolCall;

/// One render callback from the chat runtime for a single tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderEvent {
    #[serde(alias = "name")]
    pub tool: String,
    pub status: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default, alias = "toolCallId")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Executing,
    Complete,
    Error,
}

impl EventStatus {
    /// Anything outside the known set counts as a failure.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "executing" | "inProgress" => EventStatus::Executing,
            "complete" => EventStatus::Complete,
            _ => EventStatus::Error,
        }
    }
}

/// What a delivered event did to the activity state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Started(String),
    Completed(String),
    Failed(String),
    Thought,
    /// Duplicate, think event not yet complete, empty thought, or no call to attach to.
    Ignored,
}

/// Synthetic ids issued for one logical call signature (tool name plus canonical args).
#[derive(Debug, Default)]
struct SyntheticCalls {
    ids: Vec<String>,
    open: bool,
}

/// Translates render callbacks into aggregator mutations, applying each logical
/// lifecycle transition at most once.
///
/// When the runtime supplies no call id, identity comes from the tool name and the
/// canonical form of its args. Every render of that call maps back to the same
/// sequence id until the next reset, including repeated terminal renders that
/// arrive after a later call of the same tool has started. An `executing` render
/// for a signature whose last call already finished starts a new call.
pub struct ToolRenderBridge {
    activity: ActivityHandle,
    synthetic: HashMap<(String, String), SyntheticCalls>,
    generation: u64,
}

impl ToolRenderBridge {
    pub fn new(activity: ActivityHandle) -> Self {
        let generation = activity.generation();
        Self {
            activity,
            synthetic: HashMap::new(),
            generation,
        }
    }

    pub fn activity(&self) -> &ActivityHandle {
        &self.activity
    }

    pub fn deliver(&mut self, event: RenderEvent) -> Delivery {
        self.sync_generation();

        let status = EventStatus::from_wire(&event.status);
        let args = normalize_args(event.args);
        if self.activity.adapters().is_think(&event.tool) {
            return self.deliver_thought(event.tool, args, event.tool_call_id, status);
        }

        match status {
            EventStatus::Executing => {
                let id = match event.tool_call_id {
                    Some(id) => id,
                    None => self.synthetic_start(&event.tool, &args),
                };
                if !self.activity.should_process(&start_key(&id)) {
                    return Delivery::Ignored;
                }
                self.activity.add_tool_call(NewToolCall {
                    id: id.clone(),
                    name: event.tool,
                    args,
                });
                Delivery::Started(id)
            }
            EventStatus::Complete | EventStatus::Error => {
                let id = match event.tool_call_id {
                    Some(id) => id,
                    None => match self.synthetic_end(&event.tool, &args, false) {
                        Some(id) => id,
                        None => {
                            tracing::debug!(tool = %event.tool, "terminal event with no known call");
                            return Delivery::Ignored;
                        }
                    },
                };
                if !self.activity.should_process(&complete_key(&id)) {
                    return Delivery::Ignored;
                }

                // Sources that re-mount mid-call may never show the executing phase.
                if self.activity.should_process(&start_key(&id)) {
                    tracing::debug!(id = %id, "terminal event before start; tracking it now");
                    self.activity.add_tool_call(NewToolCall {
                        id: id.clone(),
                        name: event.tool.clone(),
                        args,
                    });
                }

                if status == EventStatus::Complete {
                    self.activity.complete_tool_call(&id, event.result, None);
                    Delivery::Completed(id)
                } else {
                    let message = error_message(&event.status, &event.result);
                    self.activity.complete_tool_call(&id, event.result, Some(message));
                    Delivery::Failed(id)
                }
            }
        }
    }

    fn deliver_thought(&mut self, tool: String, args: Value, call_id: Option<String>, status: EventStatus) -> Delivery {
        if status != EventStatus::Complete {
            if status == EventStatus::Executing && call_id.is_none() {
                self.synthetic_start(&tool, &args);
            }
            return Delivery::Ignored;
        }
        let Some(thought) = args
            .get("thought")
            .and_then(|v| v.as_str())
            .filter(|t| !t.trim().is_empty())
        else {
            return Delivery::Ignored;
        };
        // A finished thought may be the first render the source shows for that call.
        let id = match call_id {
            Some(id) => id,
            None => match self.synthetic_end(&tool, &args, true) {
                Some(id) => id,
                None => return Delivery::Ignored,
            },
        };
        if !self.activity.should_process(&think_key(&id)) {
            return Delivery::Ignored;
        }
        self.activity.set_thinking(thought);
        Delivery::Thought
    }

    fn sync_generation(&mut self) {
        let current = self.activity.generation();
        if current != self.generation {
            self.synthetic.clear();
            self.generation = current;
        }
    }

    /// Id for an `executing` render: the open call of this signature, or a new one.
    fn synthetic_start(&mut self, tool: &str, args: &Value) -> String {
        let calls = self
            .synthetic
            .entry((tool.to_string(), canonical_args(args)))
            .or_default();
        if calls.open {
            if let Some(id) = calls.ids.last() {
                return id.clone();
            }
        }
        let id = self.activity.next_call_id(tool);
        calls.ids.push(id.clone());
        calls.open = true;
        id
    }

    /// Id for a terminal render. Closes the open call of this signature; otherwise
    /// returns the last finished one so the repeat is absorbed by the dedup gate.
    /// An unseen signature gets a fresh id only when `track_unseen` is set.
    fn synthetic_end(&mut self, tool: &str, args: &Value, track_unseen: bool) -> Option<String> {
        let key = (tool.to_string(), canonical_args(args));
        if let Some(calls) = self.synthetic.get_mut(&key) {
            calls.open = false;
            return calls.ids.last().cloned();
        }
        if !track_unseen {
            return None;
        }
        let id = self.activity.next_call_id(tool);
        self.synthetic.insert(
            key,
            SyntheticCalls {
                ids: vec![id.clone()],
                open: false,
            },
        );
        Some(id)
    }
}

fn normalize_args(args: Value) -> Value {
    if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    }
}

// Object keys sorted at every level, so key order never changes a call's identity.
fn canonical_args(args: &Value) -> String {
    fn sorted(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                Value::Object(entries.into_iter().map(|(k, v)| (k.clone(), sorted(v))).collect())
            }
            Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
            other => other.clone(),
        }
    }
    sorted(args).to_string()
}

fn error_message(status: &str, result: &Value) -> String {
    if let Some(text) = result.as_str().filter(|s| !s.trim().is_empty()) {
        return text.to_string();
    }
    if let Some(text) = result.get("error").and_then(|v| v.as_str()) {
        return text.to_string();
    }
    format!("Tool call ended with status '{status}'")
}

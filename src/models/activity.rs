use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Executing,
    Complete,
    Error,
}

impl ToolCallStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ToolCallStatus::Executing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub status: ToolCallStatus,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_argument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Request to start tracking one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// Committed, observable activity state for one agent turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub turn_id: Uuid,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default)]
    pub thinking: String,
}

impl ActivitySnapshot {
    pub fn empty(turn_id: Uuid) -> Self {
        Self {
            turn_id,
            tool_calls: Vec::new(),
            thinking: String::new(),
        }
    }

    pub fn is_working(&self) -> bool {
        self.tool_calls
            .iter()
            .any(|tc| tc.status == ToolCallStatus::Executing)
    }

    pub fn has_activity(&self) -> bool {
        !self.tool_calls.is_empty() || !self.thinking.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ToolCallRecord> {
        self.tool_calls.iter().find(|tc| tc.id == id)
    }
}

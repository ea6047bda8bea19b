use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GENERIC_SUMMARY: &str = "Completed";

const CODE_OUTPUT_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolIcon {
    Search,
    Globe,
    File,
    Code,
    Brain,
    Wrench,
}

impl ToolIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            ToolIcon::Search => "⌕",
            ToolIcon::Globe => "◍",
            ToolIcon::File => "▤",
            ToolIcon::Code => "</>",
            ToolIcon::Brain => "✦",
            ToolIcon::Wrench => "⚒",
        }
    }
}

/// Translates one tool kind's opaque payloads into the aggregator's vocabulary.
///
/// Both extraction functions must be total: unexpected shapes yield `None` or the
/// generic summary instead of failing.
pub trait ToolAdapter: Send + Sync {
    fn display_name(&self) -> &str;

    fn icon(&self) -> ToolIcon {
        ToolIcon::Wrench
    }

    fn extract_key_argument(&self, args: &Value) -> Option<String>;

    fn summarize_result(&self, result: &Value) -> String;
}

pub struct SearchAdapter;

impl ToolAdapter for SearchAdapter {
    fn display_name(&self) -> &str {
        "Web Search"
    }

    fn icon(&self) -> ToolIcon {
        ToolIcon::Search
    }

    fn extract_key_argument(&self, args: &Value) -> Option<String> {
        as_str(args, "query")
    }

    fn summarize_result(&self, result: &Value) -> String {
        if !is_structured(result) {
            return GENERIC_SUMMARY.to_string();
        }
        match result.get("results").and_then(|v| v.as_array()) {
            Some(items) => format!("Found {} results", items.len()),
            None => "Search completed".to_string(),
        }
    }
}

pub struct FetchAdapter;

impl ToolAdapter for FetchAdapter {
    fn display_name(&self) -> &str {
        "Fetch Page"
    }

    fn icon(&self) -> ToolIcon {
        ToolIcon::Globe
    }

    fn extract_key_argument(&self, args: &Value) -> Option<String> {
        as_str(args, "url")
    }

    fn summarize_result(&self, result: &Value) -> String {
        if !is_structured(result) {
            return GENERIC_SUMMARY.to_string();
        }
        match result.get("content").and_then(|v| v.as_str()) {
            Some(content) => format!("Extracted {} words", group_thousands(word_segments(content))),
            None => "Page fetched".to_string(),
        }
    }
}

pub struct DocumentAdapter {
    label: &'static str,
}

impl DocumentAdapter {
    pub fn pdf() -> Self {
        Self { label: "Analyze PDF" }
    }

    pub fn document() -> Self {
        Self { label: "Analyze Doc" }
    }
}

impl ToolAdapter for DocumentAdapter {
    fn display_name(&self) -> &str {
        self.label
    }

    fn icon(&self) -> ToolIcon {
        ToolIcon::File
    }

    fn extract_key_argument(&self, args: &Value) -> Option<String> {
        as_str(args, "url").or_else(|| as_str(args, "file_path"))
    }

    fn summarize_result(&self, result: &Value) -> String {
        if !is_structured(result) {
            return GENERIC_SUMMARY.to_string();
        }
        match result.get("pages").and_then(|v| v.as_f64()) {
            Some(pages) => format!("Analyzed {} pages", format_number(pages)),
            None => "Analysis completed".to_string(),
        }
    }
}

pub struct CodeAdapter;

impl ToolAdapter for CodeAdapter {
    fn display_name(&self) -> &str {
        "Run Code"
    }

    fn icon(&self) -> ToolIcon {
        ToolIcon::Code
    }

    fn extract_key_argument(&self, args: &Value) -> Option<String> {
        as_str(args, "code").map(|code| first_line(&code).to_string())
    }

    fn summarize_result(&self, result: &Value) -> String {
        if !is_structured(result) {
            return GENERIC_SUMMARY.to_string();
        }
        match result.get("output").and_then(|v| v.as_str()) {
            Some(output) if !output.is_empty() => {
                let line = first_line(output);
                if line.chars().count() > CODE_OUTPUT_MAX_CHARS {
                    let head: String = line.chars().take(CODE_OUTPUT_MAX_CHARS).collect();
                    format!("{head}...")
                } else {
                    line.to_string()
                }
            }
            _ => "Execution completed".to_string(),
        }
    }
}

pub struct ThinkAdapter;

impl ToolAdapter for ThinkAdapter {
    fn display_name(&self) -> &str {
        "Thinking"
    }

    fn icon(&self) -> ToolIcon {
        ToolIcon::Brain
    }

    fn extract_key_argument(&self, _args: &Value) -> Option<String> {
        None
    }

    fn summarize_result(&self, _result: &Value) -> String {
        GENERIC_SUMMARY.to_string()
    }
}

/// Name-indexed adapter table. Unregistered names fall back to the raw name,
/// no key argument, the generic summary and the default icon.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ToolAdapter>>,
    think_tools: Vec<String>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
            think_tools: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut reg = Self::empty();
        reg.register("tavily_search", Arc::new(SearchAdapter));
        reg.register("fetch_url", Arc::new(FetchAdapter));
        reg.register("analyze_pdf", Arc::new(DocumentAdapter::pdf()));
        reg.register("analyze_document", Arc::new(DocumentAdapter::document()));
        reg.register("e2b_execute", Arc::new(CodeAdapter));
        reg.register("think_tool", Arc::new(ThinkAdapter));
        reg.register("think", Arc::new(ThinkAdapter));
        reg.think_tools = vec!["think".to_string(), "think_tool".to_string()];
        reg
    }

    pub fn register(&mut self, name: &str, adapter: Arc<dyn ToolAdapter>) {
        self.adapters.insert(name.to_string(), adapter);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolAdapter>> {
        self.adapters.get(name)
    }

    pub fn is_think(&self, name: &str) -> bool {
        self.think_tools.iter().any(|t| t == name)
    }

    pub fn display_name(&self, name: &str) -> String {
        self.get(name)
            .map(|a| a.display_name().to_string())
            .unwrap_or_else(|| name.to_string())
    }

    pub fn icon(&self, name: &str) -> ToolIcon {
        self.get(name).map(|a| a.icon()).unwrap_or(ToolIcon::Wrench)
    }

    pub fn key_argument(&self, name: &str, args: &Value) -> Option<String> {
        self.get(name).and_then(|a| a.extract_key_argument(args))
    }

    pub fn summarize(&self, name: &str, result: &Value) -> String {
        self.get(name)
            .map(|a| a.summarize_result(result))
            .unwrap_or_else(|| GENERIC_SUMMARY.to_string())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.adapters.keys().collect();
        names.sort();
        f.debug_struct("AdapterRegistry").field("tools", &names).finish()
    }
}

fn as_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn is_structured(result: &Value) -> bool {
    result.is_object() || result.is_array()
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("")
}

// Segments produced by splitting on whitespace runs, empty edge segments included.
fn word_segments(text: &str) -> usize {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE
        .get_or_init(|| Regex::new(r"\s+").unwrap())
        .split(text)
        .count()
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_summary_counts_results() {
        let reg = AdapterRegistry::builtin();
        assert_eq!(reg.summarize("tavily_search", &json!({"results": [1, 2, 3]})), "Found 3 results");
        assert_eq!(reg.summarize("tavily_search", &json!({"answer": "x"})), "Search completed");
    }

    #[test]
    fn non_structured_results_get_generic_summary() {
        let reg = AdapterRegistry::builtin();
        for name in ["tavily_search", "fetch_url", "analyze_pdf", "e2b_execute"] {
            assert_eq!(reg.summarize(name, &Value::Null), GENERIC_SUMMARY);
            assert_eq!(reg.summarize(name, &json!("plain text")), GENERIC_SUMMARY);
            assert_eq!(reg.summarize(name, &json!(42)), GENERIC_SUMMARY);
        }
    }

    #[test]
    fn fetch_summary_counts_words_with_grouping() {
        let reg = AdapterRegistry::builtin();
        assert_eq!(reg.summarize("fetch_url", &json!({"content": "one two  three"})), "Extracted 3 words");
        let long = vec!["w"; 1234].join(" ");
        assert_eq!(reg.summarize("fetch_url", &json!({ "content": long })), "Extracted 1,234 words");
        assert_eq!(reg.summarize("fetch_url", &json!({"status": 200})), "Page fetched");
    }

    #[test]
    fn document_summary_reports_pages() {
        let reg = AdapterRegistry::builtin();
        assert_eq!(reg.summarize("analyze_pdf", &json!({"pages": 12})), "Analyzed 12 pages");
        assert_eq!(reg.summarize("analyze_document", &json!({"pages": "many"})), "Analysis completed");
    }

    #[test]
    fn code_summary_uses_first_output_line() {
        let reg = AdapterRegistry::builtin();
        assert_eq!(reg.summarize("e2b_execute", &json!({"output": "42\nmore"})), "42");
        let wide = "x".repeat(60);
        assert_eq!(
            reg.summarize("e2b_execute", &json!({ "output": wide })),
            format!("{}...", "x".repeat(50))
        );
        assert_eq!(reg.summarize("e2b_execute", &json!({"output": ""})), "Execution completed");
    }

    #[test]
    fn key_arguments_per_tool_kind() {
        let reg = AdapterRegistry::builtin();
        assert_eq!(reg.key_argument("tavily_search", &json!({"query": "rust"})).as_deref(), Some("rust"));
        assert_eq!(reg.key_argument("fetch_url", &json!({"url": "https://a.b"})).as_deref(), Some("https://a.b"));
        assert_eq!(
            reg.key_argument("analyze_pdf", &json!({"file_path": "/tmp/x.pdf"})).as_deref(),
            Some("/tmp/x.pdf")
        );
        assert_eq!(
            reg.key_argument("e2b_execute", &json!({"code": "import os\nprint(1)"})).as_deref(),
            Some("import os")
        );
        assert_eq!(reg.key_argument("tavily_search", &json!({"query": 5})), None);
        assert_eq!(reg.key_argument("tavily_search", &json!("not an object")), None);
    }

    #[test]
    fn unregistered_tools_fall_back() {
        let reg = AdapterRegistry::builtin();
        assert_eq!(reg.display_name("custom_tool"), "custom_tool");
        assert_eq!(reg.key_argument("custom_tool", &json!({"query": "q"})), None);
        assert_eq!(reg.summarize("custom_tool", &json!({"results": []})), GENERIC_SUMMARY);
        assert_eq!(reg.icon("custom_tool"), ToolIcon::Wrench);
    }

    #[test]
    fn registering_a_new_kind_takes_effect() {
        struct Echo;
        impl ToolAdapter for Echo {
            fn display_name(&self) -> &str {
                "Echo"
            }
            fn extract_key_argument(&self, args: &Value) -> Option<String> {
                as_str(args, "text")
            }
            fn summarize_result(&self, _result: &Value) -> String {
                "Echoed".to_string()
            }
        }

        let mut reg = AdapterRegistry::builtin();
        reg.register("echo", Arc::new(Echo));
        assert_eq!(reg.display_name("echo"), "Echo");
        assert_eq!(reg.key_argument("echo", &json!({"text": "hi"})).as_deref(), Some("hi"));
        assert_eq!(reg.summarize("echo", &Value::Null), "Echoed");
    }

    #[test]
    fn think_kinds_are_recognized() {
        let reg = AdapterRegistry::builtin();
        assert!(reg.is_think("think"));
        assert!(reg.is_think("think_tool"));
        assert!(!reg.is_think("tavily_search"));
        assert_eq!(reg.display_name("think_tool"), "Thinking");
    }

    #[test]
    fn word_segments_match_whitespace_split() {
        assert_eq!(word_segments(""), 1);
        assert_eq!(word_segments(" a b"), 3);
        assert_eq!(word_segments("a\n\tb "), 3);
    }
}

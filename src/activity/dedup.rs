use std::collections::HashSet;

/// Idempotency gate for lifecycle notifications that may be delivered more than once.
#[derive(Debug, Default, Clone)]
pub struct DedupRegistry {
    seen: HashSet<String>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time `key` is offered, false afterwards.
    pub fn should_process(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            tracing::debug!(key, "suppressed duplicate notification");
            return false;
        }
        self.seen.insert(key.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

pub fn start_key(id: &str) -> String {
    format!("start:{id}")
}

pub fn complete_key(id: &str) -> String {
    format!("complete:{id}")
}

pub fn think_key(id: &str) -> String {
    format!("think:{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_passes_the_gate() {
        let mut reg = DedupRegistry::new();
        assert!(reg.should_process("start:1"));
        assert!(!reg.should_process("start:1"));
        assert!(!reg.should_process("start:1"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn start_and_complete_are_independent() {
        let mut reg = DedupRegistry::new();
        assert!(reg.should_process(&start_key("a")));
        assert!(reg.should_process(&complete_key("a")));
        assert!(reg.should_process(&think_key("a")));
        assert!(!reg.should_process(&complete_key("a")));
    }

    #[test]
    fn clear_reopens_every_key() {
        let mut reg = DedupRegistry::new();
        reg.should_process("start:1");
        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.should_process("start:1"));
    }
}

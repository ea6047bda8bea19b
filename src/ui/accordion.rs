use crate::activity::adapters::ToolIcon;

type ToggleObserver = Box<dyn FnMut(bool) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    /// Panel owns its state.
    Uncontrolled(bool),
    /// Caller supplies the state on every render and owns all transitions.
    Controlled(bool),
}

/// Collapsible panel with a header line and an indented body.
pub struct Accordion {
    header: String,
    icon: Option<ToolIcon>,
    expansion: Expansion,
    on_toggle: Option<ToggleObserver>,
}

impl Accordion {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            icon: None,
            expansion: Expansion::Uncontrolled(false),
            on_toggle: None,
        }
    }

    pub fn default_expanded(mut self, expanded: bool) -> Self {
        self.expansion = Expansion::Uncontrolled(expanded);
        self
    }

    pub fn controlled(mut self, expanded: bool) -> Self {
        self.expansion = Expansion::Controlled(expanded);
        self
    }

    pub fn with_icon(mut self, icon: ToolIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn on_toggle(mut self, observer: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_toggle = Some(Box::new(observer));
        self
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    /// Caller-driven update; ignored for uncontrolled panels.
    pub fn set_expanded(&mut self, expanded: bool) {
        if let Expansion::Controlled(_) = self.expansion {
            self.expansion = Expansion::Controlled(expanded);
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.expansion, Expansion::Controlled(_))
    }

    pub fn is_expanded(&self) -> bool {
        match self.expansion {
            Expansion::Uncontrolled(v) | Expansion::Controlled(v) => v,
        }
    }

    /// Returns the requested new value. Uncontrolled panels flip locally;
    /// controlled panels only notify.
    pub fn toggle(&mut self) -> bool {
        let next = !self.is_expanded();
        if let Expansion::Uncontrolled(_) = self.expansion {
            self.expansion = Expansion::Uncontrolled(next);
        }
        if let Some(observer) = self.on_toggle.as_mut() {
            observer(next);
        }
        next
    }

    pub fn render(&self, body: &[String]) -> Vec<String> {
        let chevron = if self.is_expanded() { "▾" } else { "▸" };
        let header = match self.icon {
            Some(icon) => format!("{chevron} {} {}", icon.glyph(), self.header),
            None => format!("{chevron} {}", self.header),
        };
        let mut lines = vec![header];
        if self.is_expanded() {
            lines.extend(body.iter().map(|line| format!("  {line}")));
        }
        lines
    }
}

impl std::fmt::Debug for Accordion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accordion")
            .field("header", &self.header)
            .field("expansion", &self.expansion)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn uncontrolled_starts_collapsed_and_flips() {
        let mut acc = Accordion::new("Header");
        assert!(!acc.is_expanded());
        assert!(acc.toggle());
        assert!(acc.is_expanded());
        assert!(!acc.toggle());
    }

    #[test]
    fn uncontrolled_notifies_observer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut acc = Accordion::new("Header")
            .default_expanded(true)
            .on_toggle(move |v| sink.lock().unwrap().push(v));
        acc.toggle();
        acc.toggle();
        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn controlled_only_notifies() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut acc = Accordion::new("Header")
            .controlled(false)
            .on_toggle(move |v| sink.lock().unwrap().push(v));
        assert!(acc.toggle());
        assert!(!acc.is_expanded());
        assert_eq!(*seen.lock().unwrap(), vec![true]);

        acc.set_expanded(true);
        assert!(acc.is_expanded());
    }

    #[test]
    fn set_expanded_ignored_when_uncontrolled() {
        let mut acc = Accordion::new("Header");
        acc.set_expanded(true);
        assert!(!acc.is_expanded());
    }

    #[test]
    fn body_rendered_only_when_expanded() {
        let body = vec!["line".to_string()];
        let collapsed = Accordion::new("Tools").render(&body);
        assert_eq!(collapsed, vec!["▸ Tools".to_string()]);

        let expanded = Accordion::new("Tools")
            .default_expanded(true)
            .with_icon(ToolIcon::Wrench)
            .render(&body);
        assert_eq!(expanded, vec!["▾ ⚒ Tools".to_string(), "  line".to_string()]);
    }
}

//! Preview modal state

use super::listeners::ElementId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewModal {
    content: Option<String>,
    return_focus: Option<ElementId>,
}

impl PreviewModal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show rendered content; focus goes back to `trigger` on close
    pub fn open(&mut self, content: String, trigger: Option<ElementId>) {
        self.content = Some(content);
        self.return_focus = trigger;
    }

    /// Close and return the element to focus
    pub fn close(&mut self) -> Option<ElementId> {
        self.content = None;
        self.return_focus.take()
    }

    /// Key handler; only Escape does anything, and only while open
    pub fn handle_key(&mut self, key: &str) -> Option<ElementId> {
        if key == "Escape" && self.is_open() {
            self.close()
        } else {
            None
        }
    }

    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_returns_focus() {
        let mut modal = PreviewModal::new();
        assert_eq!(modal.handle_key("Escape"), None);

        modal.open("<p>preview</p>".into(), Some("preview-btn".into()));
        assert!(modal.is_open());
        assert_eq!(modal.handle_key("Enter"), None);
        assert_eq!(modal.handle_key("Escape"), Some(ElementId::new("preview-btn")));
        assert!(!modal.is_open());
        assert_eq!(modal.content(), None);
    }
}

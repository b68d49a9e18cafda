//! Listener registry
//!
//! Map from element identity to the handlers attached to it, so teardown can
//! remove exactly what was installed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identity of a page element
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listener<H> {
    pub event: String,
    pub handler: H,
}

#[derive(Debug)]
pub struct ListenerRegistry<H> {
    listeners: HashMap<ElementId, Vec<Listener<H>>>,
}

impl<H> Default for ListenerRegistry<H> {
    fn default() -> Self {
        Self { listeners: HashMap::new() }
    }
}

impl<H> ListenerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, element: ElementId, event: impl Into<String>, handler: H) {
        self.listeners
            .entry(element)
            .or_default()
            .push(Listener { event: event.into(), handler });
    }

    /// Handlers for one event on one element, in attach order
    pub fn handlers_for<'a>(&'a self, element: &ElementId, event: &'a str) -> impl Iterator<Item = &'a H> + 'a {
        self.listeners
            .get(element)
            .into_iter()
            .flatten()
            .filter(move |l| l.event == event)
            .map(|l| &l.handler)
    }

    /// Every element listening for an event
    pub fn elements_for<'a>(&'a self, event: &'a str) -> impl Iterator<Item = (&'a ElementId, &'a H)> + 'a {
        self.listeners.iter().flat_map(move |(element, listeners)| {
            listeners
                .iter()
                .filter(move |l| l.event == event)
                .map(move |l| (element, &l.handler))
        })
    }

    /// Remove and return everything attached to an element
    pub fn detach_all(&mut self, element: &ElementId) -> Vec<Listener<H>> {
        self.listeners.remove(element).unwrap_or_default()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.len();
        self.listeners.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_detach() {
        let mut registry = ListenerRegistry::new();
        let button = ElementId::new("save");
        registry.attach(button.clone(), "click", 1);
        registry.attach(button.clone(), "click", 2);
        registry.attach(button.clone(), "keydown", 3);
        registry.attach(ElementId::new("other"), "click", 4);

        let clicks: Vec<_> = registry.handlers_for(&button, "click").copied().collect();
        assert_eq!(clicks, vec![1, 2]);
        assert_eq!(registry.elements_for("click").count(), 3);

        let removed = registry.detach_all(&button);
        assert_eq!(removed.len(), 3);
        assert_eq!(registry.len(), 1);
        assert!(registry.detach_all(&button).is_empty());
        assert_eq!(registry.clear(), 1);
        assert!(registry.is_empty());
    }
}

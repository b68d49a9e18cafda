//! Accessible dropdown menus
//!
//! At most one menu is open. Clicking outside closes everything; Escape
//! closes and hands focus back to the toggle.

use super::listeners::ElementId;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Dropdown {
    toggle: ElementId,
    menu: ElementId,
    open: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropdownGroup {
    dropdowns: Vec<Dropdown>,
}

impl DropdownGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, toggle: ElementId, menu: ElementId) {
        self.dropdowns.push(Dropdown { toggle, menu, open: false });
    }

    /// Toggle click: close every other menu, flip this one
    pub fn toggle(&mut self, toggle: &ElementId) -> bool {
        let Some(index) = self.dropdowns.iter().position(|d| &d.toggle == toggle) else {
            return false;
        };
        let was_open = self.dropdowns[index].open;
        for dropdown in &mut self.dropdowns {
            dropdown.open = false;
        }
        self.dropdowns[index].open = !was_open;
        !was_open
    }

    pub fn is_empty(&self) -> bool {
        self.dropdowns.is_empty()
    }

    /// Close all menus; returns whether any was open
    pub fn outside_click(&mut self) -> bool {
        let was_open = self.dropdowns.iter().any(|d| d.open);
        for dropdown in &mut self.dropdowns {
            dropdown.open = false;
        }
        was_open
    }

    /// Close all menus; returns the toggle that should regain focus
    pub fn escape(&mut self) -> Option<ElementId> {
        let focus = self
            .dropdowns
            .iter()
            .find(|d| d.open)
            .map(|d| d.toggle.clone());
        self.outside_click();
        focus
    }

    pub fn is_open(&self, menu: &ElementId) -> bool {
        self.dropdowns.iter().any(|d| &d.menu == menu && d.open)
    }

    pub fn open_menu(&self) -> Option<&ElementId> {
        self.dropdowns.iter().find(|d| d.open).map(|d| &d.menu)
    }

    /// `aria-expanded` value for a toggle
    pub fn aria_expanded(&self, toggle: &ElementId) -> &'static str {
        let open = self.dropdowns.iter().any(|d| &d.toggle == toggle && d.open);
        if open { "true" } else { "false" }
    }
}

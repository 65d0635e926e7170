//! Sidebar selection state.

use crate::catalog::{ToolCategory, ToolDefinition};
use log::debug;
use std::collections::BTreeSet;

/// Which tool is active and how the tool list is being browsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSelector {
    active_tool: String,
    expanded: BTreeSet<ToolCategory>,
    query: String,
    overlay_open: bool,
}

impl ToolSelector {
    /// Start with `tool` active and its category expanded.
    pub fn new(tool: &ToolDefinition) -> Self {
        Self {
            active_tool: tool.id.clone(),
            expanded: BTreeSet::from([tool.category]),
            query: String::new(),
            overlay_open: false,
        }
    }

    pub fn active_tool(&self) -> &str {
        &self.active_tool
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    /// Make `tool` active, reveal its category and close the overlay.
    pub fn select(&mut self, tool: &ToolDefinition) {
        debug!(
            "tool selected (from={}, to={})",
            self.active_tool, tool.id
        );
        self.active_tool = tool.id.clone();
        self.expanded.insert(tool.category);
        self.overlay_open = false;
    }

    /// Flip a category open or closed; returns the new state.
    pub fn toggle_category(&mut self, category: ToolCategory) -> bool {
        if self.expanded.remove(&category) {
            false
        } else {
            self.expanded.insert(category);
            true
        }
    }

    pub fn expand(&mut self, category: ToolCategory) {
        self.expanded.insert(category);
    }

    pub fn collapse(&mut self, category: ToolCategory) {
        self.expanded.remove(&category);
    }

    /// An active search shows every category expanded.
    pub fn is_expanded(&self, category: ToolCategory) -> bool {
        !self.query.trim().is_empty() || self.expanded.contains(&category)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn open_overlay(&mut self) {
        self.overlay_open = true;
    }

    pub fn close_overlay(&mut self) {
        self.overlay_open = false;
    }

    pub fn toggle_overlay(&mut self) {
        self.overlay_open = !self.overlay_open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolCatalog;
    use pretty_assertions::assert_eq;

    #[test]
    fn active_category_starts_expanded() {
        let catalog = ToolCatalog::builtin();
        let tool = catalog.find_tool("translator").expect("tool");
        let selector = ToolSelector::new(tool);
        assert!(selector.is_expanded(ToolCategory::Translation));
        assert!(!selector.is_expanded(ToolCategory::AdminHr));
    }

    #[test]
    fn query_expands_every_category() {
        let catalog = ToolCatalog::builtin();
        let mut selector = ToolSelector::new(catalog.find_tool("translator").expect("tool"));
        selector.set_query("report");
        assert!(ToolCategory::ALL
            .iter()
            .all(|category| selector.is_expanded(*category)));
        selector.clear_query();
        assert!(!selector.is_expanded(ToolCategory::AdminHr));
    }

    #[test]
    fn select_closes_overlay_and_reveals_category() {
        let catalog = ToolCatalog::builtin();
        let mut selector = ToolSelector::new(catalog.find_tool("translator").expect("tool"));
        selector.open_overlay();
        assert!(!selector.toggle_category(ToolCategory::Translation));
        selector.select(catalog.find_tool("video").expect("tool"));
        assert_eq!(selector.active_tool(), "video");
        assert!(!selector.overlay_open());
        assert!(selector.is_expanded(ToolCategory::CreativeMedia));
        assert!(!selector.is_expanded(ToolCategory::Translation));
    }
}

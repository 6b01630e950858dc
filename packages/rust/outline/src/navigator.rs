//! Selection and expansion state over an [`Outline`].

use std::collections::HashSet;

use tracing::debug;

use crate::tree::visible_nodes;
use crate::{NavLink, Outline};

/// What a sidebar row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A structured-mode category heading; not selectable.
    Category,
    /// A selectable entry (item or section).
    Entry,
}

/// One visible line of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub depth: usize,
    pub kind: RowKind,
    /// Selection key for entries, group key for categories.
    pub key: String,
    pub label: String,
    /// Whether the row has children that can be shown or hidden.
    pub expandable: bool,
    pub expanded: bool,
    pub active: bool,
}

/// A viewer's state over one outline: active entry plus open groups.
#[derive(Debug, Clone)]
pub struct Navigator {
    outline: Outline,
    active: Option<String>,
    expanded: HashSet<String>,
}

impl Navigator {
    pub fn new(outline: Outline) -> Self {
        let active = outline.initial_key().map(str::to_string);
        let expanded = outline.expanded_groups().into_iter().collect();
        debug!(mode = outline.mode(), ?active, "navigator initialized");
        Self {
            outline,
            active,
            expanded,
        }
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Make `key` active. Unknown keys are ignored and return `false`.
    pub fn select(&mut self, key: &str) -> bool {
        if !self.outline.contains(key) {
            return false;
        }
        self.active = Some(key.to_string());
        true
    }

    pub fn is_expanded(&self, group: &str) -> bool {
        self.expanded.contains(group)
    }

    /// Flip a legacy group open/closed and return the new state.
    ///
    /// Structured categories are always open; toggling them does nothing.
    pub fn toggle_group(&mut self, group: &str) -> bool {
        if matches!(self.outline, Outline::Structured(_)) {
            return true;
        }
        if self.expanded.remove(group) {
            false
        } else {
            self.expanded.insert(group.to_string());
            true
        }
    }

    pub fn active_content(&self) -> Option<&str> {
        self.active.as_deref().and_then(|k| self.outline.content(k))
    }

    pub fn active_title(&self) -> Option<&str> {
        self.active.as_deref().and_then(|k| self.outline.title(k))
    }

    pub fn active_breadcrumb(&self) -> Option<String> {
        self.active.as_deref().and_then(|k| self.outline.breadcrumb(k))
    }

    pub fn previous(&self) -> Option<NavLink<'_>> {
        self.active.as_deref().and_then(|k| self.outline.previous(k))
    }

    pub fn next(&self) -> Option<NavLink<'_>> {
        self.active.as_deref().and_then(|k| self.outline.next(k))
    }

    /// Move to the next entry; `false` at the end or in legacy mode.
    pub fn go_next(&mut self) -> bool {
        match self.next().map(|link| link.key.to_string()) {
            Some(key) => {
                self.active = Some(key);
                true
            }
            None => false,
        }
    }

    /// Move to the previous entry; `false` at the start or in legacy mode.
    pub fn go_previous(&mut self) -> bool {
        match self.previous().map(|link| link.key.to_string()) {
            Some(key) => {
                self.active = Some(key);
                true
            }
            None => false,
        }
    }

    /// Entry count for footers ("12 sections").
    pub fn section_count(&self) -> usize {
        self.outline.entry_count()
    }

    /// Sidebar lines currently visible, in display order.
    pub fn visible_rows(&self) -> Vec<SidebarRow> {
        let active = self.active.as_deref();
        match &self.outline {
            Outline::Structured(o) => {
                let mut rows = Vec::new();
                for category in &o.sidebar().categories {
                    rows.push(SidebarRow {
                        depth: 0,
                        kind: RowKind::Category,
                        key: category.name.clone(),
                        label: format!("{} {}", category.icon, category.display_name())
                            .trim()
                            .to_string(),
                        expandable: false,
                        expanded: true,
                        active: false,
                    });
                    rows.extend(category.items.iter().map(|item| SidebarRow {
                        depth: 1,
                        kind: RowKind::Entry,
                        key: item.slug.clone(),
                        label: item.title.clone(),
                        expandable: false,
                        expanded: false,
                        active: active == Some(item.slug.as_str()),
                    }));
                }
                rows
            }
            Outline::Legacy(o) => visible_nodes(o.tree(), &|id| self.is_expanded(id))
                .into_iter()
                .map(|(depth, node)| SidebarRow {
                    depth,
                    kind: RowKind::Entry,
                    key: node.id.clone(),
                    label: node.title.clone(),
                    expandable: !node.children.is_empty(),
                    expanded: self.is_expanded(&node.id),
                    active: active == Some(node.id.as_str()),
                })
                .collect(),
        }
    }
}

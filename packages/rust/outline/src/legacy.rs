//! Legacy mode: outline parsed out of one flat Markdown body.

use crate::sections::{DocSection, ID_SEPARATOR, parse_sections};
use crate::tree::{SidebarNode, build_tree};

/// Sections shorter than this are skipped when picking the initial view.
pub const MIN_INITIAL_CONTENT_CHARS: usize = 50;

/// Parsed sections plus their sidebar tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyOutline {
    sections: Vec<DocSection>,
    tree: Vec<SidebarNode>,
}

impl LegacyOutline {
    pub fn parse(markdown: &str) -> Self {
        let sections = parse_sections(markdown);
        let tree = build_tree(&sections);
        Self { sections, tree }
    }

    pub fn sections(&self) -> &[DocSection] {
        &self.sections
    }

    pub fn tree(&self) -> &[SidebarNode] {
        &self.tree
    }

    pub fn section(&self, id: &str) -> Option<&DocSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// First section with more than [`MIN_INITIAL_CONTENT_CHARS`] characters,
    /// else the first section.
    pub fn initial_id(&self) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.content.chars().count() > MIN_INITIAL_CONTENT_CHARS)
            .or_else(|| self.sections.first())
            .map(|s| s.id.as_str())
    }

    pub fn content(&self, id: &str) -> Option<&str> {
        self.section(id).map(|s| s.content.as_str())
    }

    pub fn title(&self, id: &str) -> Option<&str> {
        self.section(id).map(|s| s.title.as_str())
    }

    /// Enclosing section titles joined with `" > "`; `None` for top level.
    pub fn breadcrumb(&self, id: &str) -> Option<String> {
        let section = self.section(id)?;
        if section.ancestors.is_empty() {
            None
        } else {
            Some(section.ancestors.join(ID_SEPARATOR))
        }
    }

    /// Ids of all level-1 and level-2 sections.
    pub fn expanded_groups(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|s| s.level <= 2)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

//! Navigable outlines for generated documentation.
//!
//! Two organizations are supported, chosen by the shape of the job result:
//! - structured: a server-provided sidebar plus per-module documents
//! - legacy: one flat Markdown body, split at its headings
//!
//! [`Outline`] resolves content, titles and neighbours by key in either mode;
//! [`Navigator`] adds the selection and group-expansion state a viewer needs.

pub mod legacy;
mod navigator;
pub mod sections;
mod source;
pub mod structured;
pub mod tree;

use docview_shared::SidebarItem;

pub use legacy::LegacyOutline;
pub use navigator::{Navigator, RowKind, SidebarRow};
pub use sections::{DocSection, parse_sections};
pub use source::OutlineSource;
pub use structured::StructuredOutline;
pub use tree::{SidebarNode, build_tree};

/// A previous/next navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink<'a> {
    pub key: &'a str,
    pub title: &'a str,
}

impl<'a> From<&'a SidebarItem> for NavLink<'a> {
    fn from(item: &'a SidebarItem) -> Self {
        Self {
            key: &item.slug,
            title: &item.title,
        }
    }
}

/// An outline in one of the two modes.
///
/// Keys are item slugs in structured mode and section ids in legacy mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Structured(StructuredOutline),
    Legacy(LegacyOutline),
}

impl Outline {
    pub fn build(source: OutlineSource) -> Self {
        match source {
            OutlineSource::Structured(docs) => Self::Structured(StructuredOutline::new(docs)),
            OutlineSource::Flat(markdown) => Self::Legacy(LegacyOutline::parse(&markdown)),
        }
    }

    /// Short mode name for display.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::Legacy(_) => "legacy",
        }
    }

    /// Key selected when the outline is first shown.
    pub fn initial_key(&self) -> Option<&str> {
        match self {
            Self::Structured(o) => o.initial_slug(),
            Self::Legacy(o) => o.initial_id(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        match self {
            Self::Structured(o) => o.find(key).is_some(),
            Self::Legacy(o) => o.section(key).is_some(),
        }
    }

    /// Markdown body for `key`; `None` means "no content".
    pub fn content(&self, key: &str) -> Option<&str> {
        match self {
            Self::Structured(o) => o.content(key),
            Self::Legacy(o) => o.content(key),
        }
    }

    pub fn title(&self, key: &str) -> Option<&str> {
        match self {
            Self::Structured(o) => o.title(key),
            Self::Legacy(o) => o.title(key),
        }
    }

    pub fn breadcrumb(&self, key: &str) -> Option<String> {
        match self {
            Self::Structured(o) => o.breadcrumb(key),
            Self::Legacy(o) => o.breadcrumb(key),
        }
    }

    /// Previous entry in navigation order. Legacy outlines have none.
    pub fn previous(&self, key: &str) -> Option<NavLink<'_>> {
        match self {
            Self::Structured(o) => o.previous(key).map(NavLink::from),
            Self::Legacy(_) => None,
        }
    }

    /// Next entry in navigation order. Legacy outlines have none.
    pub fn next(&self, key: &str) -> Option<NavLink<'_>> {
        match self {
            Self::Structured(o) => o.next(key).map(NavLink::from),
            Self::Legacy(_) => None,
        }
    }

    /// Groups that start out expanded.
    pub fn expanded_groups(&self) -> Vec<String> {
        match self {
            Self::Structured(o) => o.expanded_groups(),
            Self::Legacy(o) => o.expanded_groups(),
        }
    }

    /// Number of navigable entries (items or sections).
    pub fn entry_count(&self) -> usize {
        match self {
            Self::Structured(o) => o.item_count(),
            Self::Legacy(o) => o.section_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

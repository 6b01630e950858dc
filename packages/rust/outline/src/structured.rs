//! Structured mode: server-provided sidebar plus per-module documents.

use docview_shared::{Category, SidebarItem, SidebarStructure, StructuredDocs, document_key};

/// Outline driven by a [`SidebarStructure`] and its [`docview_shared::DocumentMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredOutline {
    docs: StructuredDocs,
}

impl StructuredOutline {
    pub fn new(docs: StructuredDocs) -> Self {
        Self { docs }
    }

    pub fn sidebar(&self) -> &SidebarStructure {
        &self.docs.sidebar
    }

    /// Slug of the first item of the first category.
    ///
    /// Only the first category is considered; if it is empty there is no
    /// initial selection.
    pub fn initial_slug(&self) -> Option<&str> {
        self.docs
            .sidebar
            .categories
            .first()
            .and_then(|c| c.items.first())
            .map(|item| item.slug.as_str())
    }

    /// First item with `slug`, along with its category.
    pub fn find(&self, slug: &str) -> Option<(&Category, &SidebarItem)> {
        self.docs.sidebar.categories.iter().find_map(|category| {
            category
                .items
                .iter()
                .find(|item| item.slug == slug)
                .map(|item| (category, item))
        })
    }

    /// Markdown body for `slug`, looked up by its derived filename.
    pub fn content(&self, slug: &str) -> Option<&str> {
        self.docs
            .documents
            .get(&document_key(slug))
            .map(String::as_str)
    }

    pub fn title(&self, slug: &str) -> Option<&str> {
        self.find(slug).map(|(_, item)| item.title.as_str())
    }

    /// Display name of the category owning `slug`.
    pub fn breadcrumb(&self, slug: &str) -> Option<String> {
        self.find(slug).map(|(category, _)| category.display_name())
    }

    /// Item before `slug` in navigation order.
    pub fn previous(&self, slug: &str) -> Option<&SidebarItem> {
        let items: Vec<&SidebarItem> = self.docs.sidebar.items().collect();
        let pos = items.iter().position(|item| item.slug == slug)?;
        pos.checked_sub(1).map(|i| items[i])
    }

    /// Item after `slug` in navigation order.
    pub fn next(&self, slug: &str) -> Option<&SidebarItem> {
        let mut items = self.docs.sidebar.items();
        items.find(|item| item.slug == slug)?;
        items.next()
    }

    /// Category names; all categories are always shown expanded.
    pub fn expanded_groups(&self) -> Vec<String> {
        self.docs
            .sidebar
            .categories
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.docs.sidebar.item_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docview_shared::DocumentMap;

    fn item(slug: &str, title: &str) -> SidebarItem {
        SidebarItem {
            title: title.into(),
            slug: slug.into(),
            ..Default::default()
        }
    }

    fn outline() -> StructuredOutline {
        let sidebar = SidebarStructure {
            project_name: "FreightHub".into(),
            categories: vec![
                Category {
                    name: "USER_GUIDES".into(),
                    items: vec![item("/docs/i1", "One"), item("/docs/i2", "Two")],
                    ..Default::default()
                },
                Category {
                    name: "TECHNICAL_REFERENCE".into(),
                    items: vec![item("/docs/i3", "Three")],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut documents = DocumentMap::new();
        documents.insert("i1.md".into(), "# One".into());
        documents.insert("i3.md".into(), "# Three".into());
        StructuredOutline::new(StructuredDocs { sidebar, documents })
    }

    #[test]
    fn previous_and_next_cross_categories() {
        let o = outline();
        assert_eq!(o.previous("/docs/i2").map(|i| i.slug.as_str()), Some("/docs/i1"));
        assert_eq!(o.next("/docs/i2").map(|i| i.slug.as_str()), Some("/docs/i3"));
        assert!(o.previous("/docs/i1").is_none());
        assert!(o.next("/docs/i3").is_none());
        assert!(o.next("/docs/unknown").is_none());
        assert!(o.previous("/docs/unknown").is_none());
    }

    #[test]
    fn content_uses_derived_filename() {
        let o = outline();
        assert_eq!(o.content("/docs/i1"), Some("# One"));
        // Listed in the sidebar but no document was generated.
        assert_eq!(o.content("/docs/i2"), None);
        assert_eq!(o.content("/docs/nope"), None);
    }

    #[test]
    fn title_and_breadcrumb() {
        let o = outline();
        assert_eq!(o.title("/docs/i3"), Some("Three"));
        assert_eq!(o.breadcrumb("/docs/i3").as_deref(), Some("TECHNICAL REFERENCE"));
        assert_eq!(o.title("/docs/nope"), None);
        assert_eq!(o.breadcrumb("/docs/nope"), None);
    }

    #[test]
    fn initial_slug_and_groups() {
        let o = outline();
        assert_eq!(o.initial_slug(), Some("/docs/i1"));
        assert_eq!(o.expanded_groups(), ["USER_GUIDES", "TECHNICAL_REFERENCE"]);
        assert_eq!(o.item_count(), 3);
    }

    #[test]
    fn empty_sidebar_has_no_selection() {
        let o = StructuredOutline::new(StructuredDocs::default());
        assert_eq!(o.initial_slug(), None);
        assert_eq!(o.item_count(), 0);
    }
}

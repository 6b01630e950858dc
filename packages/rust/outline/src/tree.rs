//! Re-nesting of flat sections into a sidebar tree.
//!
//! Level-1 sections become roots. A level-2 section hangs off the latest
//! level-1 root; a level-3 section hangs off the latest level-2 child of
//! that root. When the expected parent does not exist the section becomes a
//! root of its own.

use tracing::{debug, instrument};

use crate::sections::DocSection;

/// A node of the legacy-mode sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarNode {
    /// Same as the originating [`DocSection::id`].
    pub id: String,
    pub title: String,
    pub level: u8,
    pub children: Vec<SidebarNode>,
}

impl SidebarNode {
    fn leaf(section: &DocSection) -> Self {
        Self {
            id: section.id.clone(),
            title: section.title.clone(),
            level: section.level,
            children: Vec::new(),
        }
    }
}

/// Build the sidebar tree from sections in document order.
#[instrument(skip_all, fields(sections = sections.len()))]
pub fn build_tree(sections: &[DocSection]) -> Vec<SidebarNode> {
    let mut roots: Vec<SidebarNode> = Vec::new();
    // Index into `roots` of the latest level-1 root.
    let mut last_h1: Option<usize> = None;
    // Index into that root's children of its latest level-2 child.
    let mut last_h2: Option<usize> = None;

    for section in sections {
        let node = SidebarNode::leaf(section);
        match section.level {
            1 => {
                roots.push(node);
                last_h1 = Some(roots.len() - 1);
                last_h2 = None;
            }
            2 => match last_h1 {
                Some(r) => {
                    let children = &mut roots[r].children;
                    children.push(node);
                    last_h2 = Some(children.len() - 1);
                }
                None => roots.push(node),
            },
            _ => match (last_h1, last_h2) {
                (Some(r), Some(c)) => roots[r].children[c].children.push(node),
                _ => roots.push(node),
            },
        }
    }

    debug!(roots = roots.len(), "sidebar tree built");
    roots
}

/// Depth-first walk yielding `(depth, node)` for nodes whose ancestors are
/// all accepted by `is_open`.
pub fn visible_nodes<'a>(
    roots: &'a [SidebarNode],
    is_open: &dyn Fn(&str) -> bool,
) -> Vec<(usize, &'a SidebarNode)> {
    fn walk<'a>(
        nodes: &'a [SidebarNode],
        depth: usize,
        is_open: &dyn Fn(&str) -> bool,
        out: &mut Vec<(usize, &'a SidebarNode)>,
    ) {
        for node in nodes {
            out.push((depth, node));
            if !node.children.is_empty() && is_open(&node.id) {
                walk(&node.children, depth + 1, is_open, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(roots, 0, is_open, &mut out);
    out
}

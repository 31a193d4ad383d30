//! Arena-backed element tree.
//!
//! Elements are owned here, not by the animator: the animator only ever
//! holds [`ElementId`]s and asks the tree whether an id is still mounted and
//! where it sits among its siblings.  Removed elements keep their slot so
//! stale ids stay harmless.

/// Index into [`Document::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone)]
pub struct ElementNode {
    /// Short label for logs (`"features/card"`).
    pub label: String,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub mounted: bool,
}

/// Tree of visual elements with a single root.
#[derive(Debug, Clone)]
pub struct Document {
    pub nodes: Vec<ElementNode>,
    pub root: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![ElementNode {
                label: "root".into(),
                parent: None,
                children: Vec::new(),
                mounted: true,
            }],
            root: ElementId(0),
        }
    }

    /// Append a new element as the last child of `parent`.
    pub fn append(&mut self, parent: ElementId, label: impl Into<String>) -> ElementId {
        let id = ElementId(self.nodes.len());
        let mounted = self.is_mounted(parent);
        self.nodes.push(ElementNode {
            label: label.into(),
            parent: Some(parent),
            children: Vec::new(),
            mounted,
        });
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        id
    }

    /// Detach `id` and its whole subtree.  The root cannot be removed.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.root || !self.is_mounted(id) {
            return;
        }
        if let Some(parent) = self.nodes[id.0].parent {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current.0];
            node.mounted = false;
            stack.extend(node.children.iter().copied());
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.nodes.get(id.0)
    }

    pub fn is_mounted(&self, id: ElementId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.mounted)
    }

    /// Position among the parent's current children (0 when parentless).
    pub fn sibling_index(&self, id: ElementId) -> usize {
        self.get(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.nodes[p.0].children.iter().position(|&c| c == id))
            .unwrap_or(0)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn label(&self, id: ElementId) -> &str {
        self.get(id).map_or("?", |n| n.label.as_str())
    }
}

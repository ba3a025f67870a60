//! Read-only tree access
//!
//! The narrow interface the query engine consumes from the renderer. All
//! lookups on unknown ids return empty results rather than failing, so a
//! traversal over a half-torn-down tree degrades to fewer matches.

use crate::tree::capability::NodeCapabilities;
use crate::tree::node::NodeKind;
use crate::types::{NodeId, Revision, ViewId};
use std::collections::HashMap;

/// Read-only view over currently rendered nodes.
pub trait RenderedTree {
    fn root_view(&self) -> ViewId;

    /// Tree-wide structural revision.
    fn revision(&self) -> Revision;

    /// Revision of one view's own nodes; `None` if the view does not exist.
    fn view_revision(&self, view: ViewId) -> Option<Revision>;

    fn contains_view(&self, view: ViewId) -> bool;

    fn contains_node(&self, node: NodeId) -> bool;

    fn view_roots(&self, view: ViewId) -> &[NodeId];

    fn children(&self, node: NodeId) -> &[NodeId];

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn owning_view(&self, node: NodeId) -> Option<ViewId>;

    fn capabilities(&self, node: NodeId) -> Option<&NodeCapabilities>;

    /// Embedded views attached to an insertion point, in activation order.
    fn attached_views(&self, node: NodeId) -> &[ViewId];

    fn component_view(&self, node: NodeId) -> Option<ViewId>;

    /// Node a view hangs off: the container an embedded view is attached
    /// to, or the host of a component view. `None` for the root view and for
    /// detached views.
    fn view_anchor(&self, view: ViewId) -> Option<NodeId>;

    fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.capabilities(node).map(NodeCapabilities::kind)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = match self.parent(node) {
            Some(parent) => self.children(parent),
            None => self.view_roots(self.owning_view(node)?),
        };
        let position = siblings.iter().position(|n| *n == node)?;
        siblings.get(position + 1).copied()
    }
}

/// Pre-order position of every rendered node reachable from the root view.
///
/// Declared children come first, then views attached to an insertion point,
/// then the component view of a host.
pub fn document_order(tree: &dyn RenderedTree) -> HashMap<NodeId, usize> {
    let mut order = HashMap::new();
    let mut stack: Vec<NodeId> = Vec::new();
    push_reversed(&mut stack, tree.view_roots(tree.root_view()));

    while let Some(node) = stack.pop() {
        if order.contains_key(&node) {
            continue;
        }
        let position = order.len();
        order.insert(node, position);

        let mut next: Vec<NodeId> = tree.children(node).to_vec();
        for view in tree.attached_views(node) {
            next.extend_from_slice(tree.view_roots(*view));
        }
        if let Some(view) = tree.component_view(node) {
            next.extend_from_slice(tree.view_roots(view));
        }
        push_reversed(&mut stack, &next);
    }

    order
}

fn push_reversed(stack: &mut Vec<NodeId>, nodes: &[NodeId]) {
    stack.extend(nodes.iter().rev().copied());
}

/// Whether `node` is currently reachable from the root view.
pub fn is_rendered(tree: &dyn RenderedTree, node: NodeId) -> bool {
    let mut current = node;
    loop {
        if !tree.contains_node(current) {
            return false;
        }
        if let Some(parent) = tree.parent(current) {
            current = parent;
            continue;
        }
        let Some(view) = tree.owning_view(current) else {
            return false;
        };
        if view == tree.root_view() {
            return true;
        }
        match tree.view_anchor(view) {
            Some(anchor) => current = anchor,
            None => return false,
        }
    }
}

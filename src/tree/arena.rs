//! In-memory render tree
//!
//! An arena of nodes and view fragments with the mutation surface a renderer
//! exposes: create nodes inside a view, create component and embedded views,
//! attach/detach/move embedded views in insertion points, destroy views.
//! Every mutation bumps the tree revision and the revision of the view whose
//! own structure changed.

use crate::error::TreeError;
use crate::tree::capability::{BehaviorInstance, LocalAlias, NodeCapabilities, Provider};
use crate::tree::node::{NodeKind, RenderNode, ViewFragment, ViewKind};
use crate::tree::walk::RenderedTree;
use crate::types::{NodeId, Revision, TemplateId, ViewId};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Render tree arena
#[derive(Debug, Clone)]
pub struct RenderTree {
    nodes: HashMap<NodeId, RenderNode>,
    views: HashMap<ViewId, ViewFragment>,
    root_view: ViewId,
    next_node: u32,
    next_view: u32,
    next_template: u32,
    revision: Revision,
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTree {
    /// Empty tree with a single root view.
    pub fn new() -> Self {
        let root_view = ViewId(0);
        let mut views = HashMap::new();
        views.insert(
            root_view,
            ViewFragment {
                id: root_view,
                kind: ViewKind::Root,
                roots: Vec::new(),
                attached_to: None,
                revision: Revision::default(),
            },
        );
        Self {
            nodes: HashMap::new(),
            views,
            root_view,
            next_node: 0,
            next_view: 1,
            next_template: 0,
            revision: Revision::default(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(&id)
    }

    pub fn view(&self, id: ViewId) -> Option<&ViewFragment> {
        self.views.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate an inline template id for a deferred-template container.
    pub fn declare_template(&mut self) -> TemplateId {
        let id = TemplateId(self.next_template);
        self.next_template += 1;
        id
    }

    /// Append a node to `parent` (or to the view's roots when `parent` is `None`).
    pub fn create_node(
        &mut self,
        view: ViewId,
        parent: Option<NodeId>,
        kind: NodeKind,
    ) -> Result<NodeId, TreeError> {
        if !self.views.contains_key(&view) {
            return Err(TreeError::ViewNotFound(view));
        }
        if let Some(parent_id) = parent {
            let parent_node = self
                .nodes
                .get(&parent_id)
                .ok_or(TreeError::NodeNotFound(parent_id))?;
            if parent_node.view != view {
                return Err(TreeError::ForeignParent {
                    parent: parent_id,
                    parent_view: parent_node.view,
                    view,
                });
            }
            if !parent_node.kind().accepts_children() {
                return Err(TreeError::InvalidParent { parent: parent_id });
            }
        }

        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            RenderNode {
                id,
                view,
                parent,
                children: Vec::new(),
                capabilities: NodeCapabilities::new(kind),
                attached: Vec::new(),
                component_view: None,
            },
        );
        match parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                    parent_node.children.push(id);
                }
            }
            None => {
                if let Some(fragment) = self.views.get_mut(&view) {
                    fragment.roots.push(id);
                }
            }
        }
        self.touch_view(view);
        trace!(node = %id, view = %view, "Created node");
        Ok(id)
    }

    pub fn element(
        &mut self,
        view: ViewId,
        parent: Option<NodeId>,
        tag: &str,
    ) -> Result<NodeId, TreeError> {
        self.create_node(
            view,
            parent,
            NodeKind::Element {
                tag: tag.to_string(),
            },
        )
    }

    pub fn grouping(&mut self, view: ViewId, parent: Option<NodeId>) -> Result<NodeId, TreeError> {
        self.create_node(view, parent, NodeKind::Grouping)
    }

    /// Insertion point; pass a template for a deferred-template marker.
    pub fn container(
        &mut self,
        view: ViewId,
        parent: Option<NodeId>,
        template: Option<TemplateId>,
    ) -> Result<NodeId, TreeError> {
        self.create_node(view, parent, NodeKind::Container { template })
    }

    /// Declare a local alias on a node, in declaration order.
    pub fn add_alias(&mut self, node: NodeId, alias: LocalAlias) -> Result<(), TreeError> {
        let view = {
            let target = self
                .nodes
                .get_mut(&node)
                .ok_or(TreeError::NodeNotFound(node))?;
            target.capabilities.push_alias(alias);
            target.view
        };
        self.touch_view(view);
        Ok(())
    }

    /// Attach the node's behavior instances and the providers they publish.
    ///
    /// Runs once per node: matching sees either none or all of them.
    pub fn install_behaviors(
        &mut self,
        node: NodeId,
        behaviors: Vec<BehaviorInstance>,
        providers: Vec<Provider>,
    ) -> Result<(), TreeError> {
        let view = {
            let target = self
                .nodes
                .get_mut(&node)
                .ok_or(TreeError::NodeNotFound(node))?;
            if !target.capabilities.install(behaviors, providers) {
                return Err(TreeError::BehaviorsAlreadyInstalled(node));
            }
            target.view
        };
        self.touch_view(view);
        Ok(())
    }

    /// Create the component view rendered by `host`.
    pub fn create_component_view(&mut self, host: NodeId) -> Result<ViewId, TreeError> {
        let host_node = self.nodes.get(&host).ok_or(TreeError::NodeNotFound(host))?;
        if !matches!(host_node.kind(), NodeKind::Element { .. }) {
            return Err(TreeError::NotAnElement(host));
        }
        if host_node.component_view.is_some() {
            return Err(TreeError::ComponentViewExists(host));
        }
        let host_view = host_node.view;
        let view = self.allocate_view(ViewKind::Component { host });
        if let Some(host_node) = self.nodes.get_mut(&host) {
            host_node.component_view = Some(view);
        }
        self.touch_view(host_view);
        Ok(view)
    }

    /// Create a detached embedded view.
    pub fn create_embedded_view(&mut self, template: Option<TemplateId>) -> ViewId {
        let view = self.allocate_view(ViewKind::Embedded { template });
        self.bump();
        view
    }

    /// Attach an embedded view at `index` (append when `None`).
    pub fn insert_view(
        &mut self,
        container: NodeId,
        view: ViewId,
        index: Option<usize>,
    ) -> Result<usize, TreeError> {
        let fragment = self.views.get(&view).ok_or(TreeError::ViewNotFound(view))?;
        if !matches!(fragment.kind, ViewKind::Embedded { .. }) {
            return Err(TreeError::ViewNotAttachable(view));
        }
        if fragment.attached_to.is_some() {
            return Err(TreeError::ViewAlreadyAttached(view));
        }
        if self.is_within_view(container, view) {
            return Err(TreeError::ViewNotAttachable(view));
        }
        let container_view = {
            let node = self.container_mut(container)?;
            let len = node.attached.len();
            let index = index.unwrap_or(len);
            if index > len {
                return Err(TreeError::IndexOutOfBounds { index, len });
            }
            node.attached.insert(index, view);
            node.view
        };
        if let Some(fragment) = self.views.get_mut(&view) {
            fragment.attached_to = Some(container);
        }
        self.touch_view(container_view);
        let index = self.attached_index(container, view).unwrap_or_default();
        debug!(container = %container, view = %view, index, "Attached embedded view");
        Ok(index)
    }

    /// Detach the view at `index`; the view stays alive and can be re-attached.
    pub fn detach_view(&mut self, container: NodeId, index: usize) -> Result<ViewId, TreeError> {
        let (view, container_view) = {
            let node = self.container_mut(container)?;
            let len = node.attached.len();
            if index >= len {
                return Err(TreeError::IndexOutOfBounds { index, len });
            }
            (node.attached.remove(index), node.view)
        };
        if let Some(fragment) = self.views.get_mut(&view) {
            fragment.attached_to = None;
        }
        self.touch_view(container_view);
        debug!(container = %container, view = %view, index, "Detached embedded view");
        Ok(view)
    }

    /// Move an attached view to a new index within the same container.
    pub fn move_view(&mut self, container: NodeId, from: usize, to: usize) -> Result<(), TreeError> {
        let container_view = {
            let node = self.container_mut(container)?;
            let len = node.attached.len();
            if from >= len {
                return Err(TreeError::IndexOutOfBounds { index: from, len });
            }
            if to >= len {
                return Err(TreeError::IndexOutOfBounds { index: to, len });
            }
            let view = node.attached.remove(from);
            node.attached.insert(to, view);
            node.view
        };
        self.touch_view(container_view);
        Ok(())
    }

    /// Detach and destroy the view at `index`, returning the destroyed nodes.
    pub fn remove_view(&mut self, container: NodeId, index: usize) -> Result<Vec<NodeId>, TreeError> {
        let view = self.detach_view(container, index)?;
        self.destroy_view(view)
    }

    /// Destroy a view and everything rendered inside it.
    ///
    /// Returns the destroyed nodes in document order so callers can tear down
    /// the queries owned by behaviors on them.
    pub fn destroy_view(&mut self, view: ViewId) -> Result<Vec<NodeId>, TreeError> {
        if view == self.root_view {
            return Err(TreeError::RootViewImmutable);
        }
        let attached_to = self
            .views
            .get(&view)
            .ok_or(TreeError::ViewNotFound(view))?
            .attached_to;
        if let Some(container) = attached_to {
            if let Some(index) = self.attached_index(container, view) {
                self.detach_view(container, index)?;
            }
        }
        if let Some(ViewFragment {
            kind: ViewKind::Component { host },
            ..
        }) = self.views.get(&view)
        {
            let host = *host;
            if let Some(host_node) = self.nodes.get_mut(&host) {
                host_node.component_view = None;
            }
        }

        let mut destroyed = Vec::new();
        self.collect_view_nodes(view, &mut destroyed);
        let mut nested_views = vec![view];
        for node in &destroyed {
            if let Some(removed) = self.nodes.get(node) {
                nested_views.extend(removed.attached.iter().copied());
                nested_views.extend(removed.component_view);
            }
        }
        for node in &destroyed {
            self.nodes.remove(node);
        }
        for nested in nested_views {
            self.views.remove(&nested);
        }
        self.bump();
        debug!(view = %view, nodes = destroyed.len(), "Destroyed view");
        Ok(destroyed)
    }

    fn collect_view_nodes(&self, view: ViewId, out: &mut Vec<NodeId>) {
        let Some(fragment) = self.views.get(&view) else {
            return;
        };
        for root in &fragment.roots {
            self.collect_subtree(*root, out);
        }
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let Some(current) = self.nodes.get(&node) else {
            return;
        };
        out.push(node);
        for child in &current.children {
            self.collect_subtree(*child, out);
        }
        for attached in &current.attached {
            self.collect_view_nodes(*attached, out);
        }
        if let Some(component_view) = current.component_view {
            self.collect_view_nodes(component_view, out);
        }
    }

    /// Whether `node` lives inside `view` or any view nested under it.
    fn is_within_view(&self, node: NodeId, view: ViewId) -> bool {
        let mut current = self.nodes.get(&node).map(|n| n.view);
        while let Some(candidate) = current {
            if candidate == view {
                return true;
            }
            current = self
                .view_anchor(candidate)
                .and_then(|anchor| self.nodes.get(&anchor))
                .map(|n| n.view);
        }
        false
    }

    fn attached_index(&self, container: NodeId, view: ViewId) -> Option<usize> {
        self.nodes
            .get(&container)?
            .attached
            .iter()
            .position(|v| *v == view)
    }

    fn container_mut(&mut self, container: NodeId) -> Result<&mut RenderNode, TreeError> {
        let node = self
            .nodes
            .get_mut(&container)
            .ok_or(TreeError::NodeNotFound(container))?;
        if !node.kind().is_insertion_point() {
            return Err(TreeError::NotAContainer(container));
        }
        Ok(node)
    }

    fn allocate_view(&mut self, kind: ViewKind) -> ViewId {
        let id = ViewId(self.next_view);
        self.next_view += 1;
        self.views.insert(
            id,
            ViewFragment {
                id,
                kind,
                roots: Vec::new(),
                attached_to: None,
                revision: self.revision,
            },
        );
        id
    }

    fn bump(&mut self) {
        self.revision = self.revision.next();
    }

    fn touch_view(&mut self, view: ViewId) {
        self.bump();
        let revision = self.revision;
        if let Some(fragment) = self.views.get_mut(&view) {
            fragment.revision = revision;
        }
    }
}

impl RenderedTree for RenderTree {
    fn root_view(&self) -> ViewId {
        self.root_view
    }

    fn revision(&self) -> Revision {
        self.revision
    }

    fn view_revision(&self, view: ViewId) -> Option<Revision> {
        self.views.get(&view).map(|v| v.revision)
    }

    fn contains_view(&self, view: ViewId) -> bool {
        self.views.contains_key(&view)
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn view_roots(&self, view: ViewId) -> &[NodeId] {
        self.views.get(&view).map(|v| v.roots.as_slice()).unwrap_or(&[])
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node)?.parent
    }

    fn owning_view(&self, node: NodeId) -> Option<ViewId> {
        self.nodes.get(&node).map(|n| n.view)
    }

    fn capabilities(&self, node: NodeId) -> Option<&NodeCapabilities> {
        self.nodes.get(&node).map(|n| &n.capabilities)
    }

    fn attached_views(&self, node: NodeId) -> &[ViewId] {
        self.nodes
            .get(&node)
            .map(|n| n.attached.as_slice())
            .unwrap_or(&[])
    }

    fn component_view(&self, node: NodeId) -> Option<ViewId> {
        self.nodes.get(&node)?.component_view
    }

    fn view_anchor(&self, view: ViewId) -> Option<NodeId> {
        let fragment = self.views.get(&view)?;
        match fragment.kind {
            ViewKind::Component { host } => Some(host),
            ViewKind::Embedded { .. } => fragment.attached_to,
            ViewKind::Root => None,
        }
    }
}

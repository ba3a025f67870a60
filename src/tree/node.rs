//! Render tree node and view fragment types

use crate::tree::capability::NodeCapabilities;
use crate::types::{NodeId, Revision, TemplateId, ViewId};
use serde::{Deserialize, Serialize};

/// Closed set of node kinds the matcher distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum NodeKind {
    /// Plain element, possibly hosting a component
    Element { tag: String },
    /// Grouping marker with declared children but no native element
    Grouping,
    /// Insertion point; `template` is set for deferred-template markers
    Container { template: Option<TemplateId> },
}

impl NodeKind {
    /// Grouping and insertion-point markers.
    pub fn is_marker(&self) -> bool {
        matches!(self, NodeKind::Grouping | NodeKind::Container { .. })
    }

    /// Only insertion points carry attached embedded views.
    pub fn is_insertion_point(&self) -> bool {
        matches!(self, NodeKind::Container { .. })
    }

    pub fn accepts_children(&self) -> bool {
        matches!(self, NodeKind::Element { .. } | NodeKind::Grouping)
    }

    pub fn template(&self) -> Option<TemplateId> {
        match self {
            NodeKind::Container { template } => *template,
            NodeKind::Element { .. } | NodeKind::Grouping => None,
        }
    }
}

/// A rendered node
#[derive(Debug, Clone)]
pub struct RenderNode {
    pub id: NodeId,
    pub view: ViewId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub capabilities: NodeCapabilities,
    /// Embedded views currently attached, in activation order (insertion points only)
    pub attached: Vec<ViewId>,
    /// The component's own view when this node hosts a component
    pub component_view: Option<ViewId>,
}

impl RenderNode {
    pub fn kind(&self) -> &NodeKind {
        self.capabilities.kind()
    }
}

/// What a view fragment was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ViewKind {
    Root,
    Component { host: NodeId },
    Embedded { template: Option<TemplateId> },
}

/// A view fragment: an ordered list of root nodes rendered together
#[derive(Debug, Clone)]
pub struct ViewFragment {
    pub id: ViewId,
    pub kind: ViewKind,
    pub roots: Vec<NodeId>,
    /// Container this embedded view is attached to, if any
    pub attached_to: Option<NodeId>,
    /// Bumped on every structural change to this view's own nodes
    pub revision: Revision,
}

//! Values a query reads from its matches

use crate::tree::capability::{BehaviorInstance, ProvidedValue};
use crate::types::{NodeId, TemplateId};
use std::fmt;
use std::sync::Arc;

/// Handle to a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    pub node: NodeId,
}

/// Handle to the inline template of a deferred-template container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateHandle {
    pub node: NodeId,
    pub template: TemplateId,
}

/// Handle to a node's insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerHandle {
    pub node: NodeId,
}

/// One value in a query result.
///
/// Equality is identity for instances and provided values, and structural
/// for handles.
#[derive(Clone)]
pub enum QueryValue {
    Element(ElementHandle),
    Template(TemplateHandle),
    Container(ContainerHandle),
    Instance(Arc<BehaviorInstance>),
    Provided(ProvidedValue),
}

impl QueryValue {
    pub fn as_element(&self) -> Option<ElementHandle> {
        match self {
            QueryValue::Element(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_template(&self) -> Option<TemplateHandle> {
        match self {
            QueryValue::Template(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<ContainerHandle> {
        match self {
            QueryValue::Container(handle) => Some(*handle),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Arc<BehaviorInstance>> {
        match self {
            QueryValue::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Downcast a provided value or a behavior's state.
    pub fn downcast<S: 'static>(&self) -> Option<&S> {
        match self {
            QueryValue::Instance(instance) => instance.state::<S>(),
            QueryValue::Provided(value) => value.downcast_ref::<S>(),
            _ => None,
        }
    }

    /// Node a handle points at; `None` for instances and provided values.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            QueryValue::Element(h) => Some(h.node),
            QueryValue::Template(h) => Some(h.node),
            QueryValue::Container(h) => Some(h.node),
            QueryValue::Instance(_) | QueryValue::Provided(_) => None,
        }
    }
}

impl PartialEq for QueryValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (QueryValue::Element(a), QueryValue::Element(b)) => a == b,
            (QueryValue::Template(a), QueryValue::Template(b)) => a == b,
            (QueryValue::Container(a), QueryValue::Container(b)) => a == b,
            (QueryValue::Instance(a), QueryValue::Instance(b)) => Arc::ptr_eq(a, b),
            (QueryValue::Provided(a), QueryValue::Provided(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Element(h) => write!(f, "Element({})", h.node),
            QueryValue::Template(h) => write!(f, "Template({}, {})", h.node, h.template),
            QueryValue::Container(h) => write!(f, "Container({})", h.node),
            QueryValue::Instance(i) => write!(f, "Instance({})", i.type_tag()),
            QueryValue::Provided(_) => f.write_str("Provided(..)"),
        }
    }
}

//! Read-token resolution
//!
//! Stands in for the injection mechanism: given a node and a token, produce a
//! value or report NOT_FOUND (`None`). The matcher routes every read through a
//! resolver, structural defaults included, so a custom resolver is
//! authoritative for what a query observes.

use crate::query::descriptor::Token;
use crate::query::value::{ContainerHandle, ElementHandle, QueryValue, TemplateHandle};
use crate::tree::capability::Located;
use crate::tree::node::NodeKind;
use crate::tree::walk::RenderedTree;
use crate::types::NodeId;

/// Resolves read tokens against a node.
pub trait Resolver {
    fn resolve(&self, tree: &dyn RenderedTree, node: NodeId, token: &Token) -> Option<QueryValue>;

    /// Whether resolution is a function of the tree at its current revision.
    ///
    /// Refreshes are only skipped for unchanged revisions when this holds.
    /// Resolvers reading outside state keep the default and are re-run on
    /// every refresh.
    fn revision_bound(&self) -> bool {
        false
    }
}

impl<F> Resolver for F
where
    F: Fn(&dyn RenderedTree, NodeId, &Token) -> Option<QueryValue>,
{
    fn resolve(&self, tree: &dyn RenderedTree, node: NodeId, token: &Token) -> Option<QueryValue> {
        self(tree, node, token)
    }
}

/// Resolves built-in handles, behavior instances and node-level providers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeResolver;

impl Resolver for NodeResolver {
    fn revision_bound(&self) -> bool {
        true
    }

    fn resolve(&self, tree: &dyn RenderedTree, node: NodeId, token: &Token) -> Option<QueryValue> {
        let caps = tree.capabilities(node)?;
        match token {
            Token::ElementHandle => Some(QueryValue::Element(ElementHandle { node })),
            Token::TemplateHandle => match caps.kind() {
                NodeKind::Container {
                    template: Some(template),
                } => Some(QueryValue::Template(TemplateHandle {
                    node,
                    template: *template,
                })),
                _ => None,
            },
            // every node can anchor an insertion point
            Token::ContainerHandle => Some(QueryValue::Container(ContainerHandle { node })),
            Token::Type(tag) => caps.locate(tag).map(|located| match located {
                Located::Behavior(instance) => QueryValue::Instance(instance),
                Located::Provided(value) => QueryValue::Provided(value),
            }),
        }
    }
}

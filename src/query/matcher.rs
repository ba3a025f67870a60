//! Predicate matching against a single node

use crate::query::descriptor::{Predicate, QueryDescriptor, Token};
use crate::query::resolver::Resolver;
use crate::query::value::QueryValue;
use crate::tree::capability::{Located, NodeCapabilities};
use crate::tree::node::NodeKind;
use crate::tree::walk::RenderedTree;
use crate::types::NodeId;
use tracing::{trace, warn};

/// A node occurrence together with the value read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub node: NodeId,
    pub value: QueryValue,
}

/// Evaluate `descriptor` against one node.
///
/// Returns at most one match, except for multi-alias predicates, which yield
/// one match per matching alias in the predicate's order.
pub fn match_node(
    tree: &dyn RenderedTree,
    node: NodeId,
    descriptor: &QueryDescriptor,
    resolver: &dyn Resolver,
) -> Vec<RawMatch> {
    let Some(caps) = tree.capabilities(node) else {
        return Vec::new();
    };

    let defaults: Vec<Option<QueryValue>> = match descriptor.predicate() {
        Predicate::Type(token) => match_token(tree, node, caps, token, resolver)
            .into_iter()
            .collect(),
        Predicate::Alias(name) => match_alias(tree, node, caps, name, resolver)
            .into_iter()
            .collect(),
        Predicate::Aliases(names) => names
            .iter()
            .filter_map(|name| match_alias(tree, node, caps, name, resolver))
            .collect(),
    };

    defaults
        .into_iter()
        .filter_map(|default| {
            let value = match descriptor.read() {
                Some(token) => resolver.resolve(tree, node, token),
                None => default,
            };
            if value.is_none() {
                trace!(node = %node, "Match dropped: read resolved to nothing");
            }
            value.map(|value| RawMatch { node, value })
        })
        .collect()
}

/// Outer `None`: no structural match. Inner `None`: matched, default read not found.
fn match_token(
    tree: &dyn RenderedTree,
    node: NodeId,
    caps: &NodeCapabilities,
    token: &Token,
    resolver: &dyn Resolver,
) -> Option<Option<QueryValue>> {
    match token {
        Token::Type(tag) => caps.locate(tag).map(|located| {
            Some(match located {
                Located::Behavior(instance) => QueryValue::Instance(instance),
                Located::Provided(value) => QueryValue::Provided(value),
            })
        }),
        Token::ElementHandle => match caps.kind() {
            NodeKind::Element { .. } | NodeKind::Grouping => {
                Some(resolver.resolve(tree, node, token))
            }
            NodeKind::Container { .. } => None,
        },
        Token::TemplateHandle => match caps.kind() {
            NodeKind::Container { template: Some(_) } => Some(resolver.resolve(tree, node, token)),
            _ => None,
        },
        Token::ContainerHandle => match caps.kind() {
            NodeKind::Container { .. } => Some(resolver.resolve(tree, node, token)),
            _ => None,
        },
    }
}

fn match_alias(
    tree: &dyn RenderedTree,
    node: NodeId,
    caps: &NodeCapabilities,
    name: &str,
    resolver: &dyn Resolver,
) -> Option<Option<QueryValue>> {
    let alias = caps.has_local_alias(name)?;
    if let Some(export) = alias.export {
        return match caps.exported(export) {
            Some(instance) => Some(Some(QueryValue::Instance(instance.clone()))),
            None => {
                warn!(node = %node, alias = name, export, "No behavior exported under this name");
                None
            }
        };
    }
    Some(structural_default(tree, node, caps, resolver))
}

fn structural_default(
    tree: &dyn RenderedTree,
    node: NodeId,
    caps: &NodeCapabilities,
    resolver: &dyn Resolver,
) -> Option<QueryValue> {
    if let Some(component) = caps.component() {
        return Some(QueryValue::Instance(component.clone()));
    }
    let token = match caps.kind() {
        NodeKind::Container { template: Some(_) } => Token::TemplateHandle,
        NodeKind::Element { .. } | NodeKind::Grouping | NodeKind::Container { template: None } => {
            Token::ElementHandle
        }
    };
    resolver.resolve(tree, node, &token)
}

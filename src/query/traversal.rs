//! Scope traversal
//!
//! Walks the currently rendered nodes of one query scope in document order.
//! Views attached to an insertion point are walked inline at the container's
//! position and depth. Component views of nested hosts are never entered:
//! they belong to those components' own view queries.

use crate::error::QueryError;
use crate::query::descriptor::QueryDescriptor;
use crate::query::matcher::{match_node, RawMatch};
use crate::query::resolver::Resolver;
use crate::tree::walk::{is_rendered, RenderedTree};
use crate::types::{NodeId, ViewId};
use std::fmt;
use tracing::{instrument, trace};

/// Where a query looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// A component's own view; its root nodes are match targets
    View(ViewId),
    /// A host's declared content; the host itself never matches
    Content(NodeId),
}

impl fmt::Display for QueryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryScope::View(view) => write!(f, "view {}", view),
            QueryScope::Content(host) => write!(f, "content of {}", host),
        }
    }
}

/// Ordered matches of one traversal.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    pub matches: Vec<RawMatch>,
    /// Whether the walk reached an insertion point, making the result dynamic
    pub crossed_insertion_point: bool,
}

/// Collect every match for `descriptor` within `scope`, in document order.
#[instrument(skip(tree, descriptor, resolver), fields(scope = %scope, deep = descriptor.descendants()))]
pub fn collect_matches(
    tree: &dyn RenderedTree,
    scope: QueryScope,
    descriptor: &QueryDescriptor,
    resolver: &dyn Resolver,
) -> Result<Traversal, QueryError> {
    ensure_rendered(tree, scope)?;
    let mut matches = Vec::new();
    let crossed = walk_scope(tree, scope, descriptor.descendants(), |node| {
        let found = match_node(tree, node, descriptor, resolver);
        if !found.is_empty() {
            trace!(node = %node, count = found.len(), "Matched");
        }
        matches.extend(found);
    });
    Ok(Traversal {
        matches,
        crossed_insertion_point: crossed,
    })
}

/// Whether the nodes reachable in `scope` include no insertion point.
pub fn scope_is_static(tree: &dyn RenderedTree, scope: QueryScope, descendants: bool) -> bool {
    !walk_scope(tree, scope, descendants, |_| {})
}

fn ensure_rendered(tree: &dyn RenderedTree, scope: QueryScope) -> Result<(), QueryError> {
    let rendered = match scope {
        QueryScope::View(view) => {
            view == tree.root_view()
                || tree
                    .view_anchor(view)
                    .is_some_and(|anchor| is_rendered(tree, anchor))
        }
        QueryScope::Content(host) => is_rendered(tree, host),
    };
    if rendered {
        Ok(())
    } else {
        Err(QueryError::ScopeNotRendered(scope.to_string()))
    }
}

/// Pre-order walk of `scope`; returns whether an insertion point was reached.
fn walk_scope(
    tree: &dyn RenderedTree,
    scope: QueryScope,
    descendants: bool,
    mut visit: impl FnMut(NodeId),
) -> bool {
    let start = match scope {
        QueryScope::View(view) => tree.view_roots(view),
        QueryScope::Content(host) => tree.children(host),
    };
    let mut stack: Vec<NodeId> = start.iter().rev().copied().collect();
    let mut crossed = false;

    while let Some(node) = stack.pop() {
        visit(node);

        let mut next: Vec<NodeId> = Vec::new();
        if descendants {
            next.extend_from_slice(tree.children(node));
        }
        if tree.kind(node).is_some_and(|kind| kind.is_insertion_point()) {
            crossed = true;
            for view in tree.attached_views(node) {
                next.extend_from_slice(tree.view_roots(*view));
            }
        }
        stack.extend(next.into_iter().rev());
    }

    crossed
}

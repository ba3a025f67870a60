//! Query engine
//!
//! Owns one [`QueryRegistry`] per registered owner and drives the update pass:
//! a content phase followed by a view phase, owners visited in document order
//! of their host with the root owner first.

use crate::config::{EngineConfig, RefreshConfig};
use crate::error::{QueryError, TreeError};
use crate::query::descriptor::QueryDescriptor;
use crate::query::list::QueryList;
use crate::query::resolver::{NodeResolver, Resolver};
use crate::query::value::QueryValue;
use crate::registry::{QueryKind, QueryOwner, QueryRegistry};
use crate::tree::walk::{document_order, RenderedTree};
use crate::types::{NodeId, OwnerId, QueryId};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Callbacks invoked by [`QueryEngine::run_pass`].
///
/// `query_changed` is where results get assigned to user-visible state; it
/// only fires for queries whose contents changed during this pass.
pub trait PassHooks {
    fn query_changed(&mut self, _owner: OwnerId, _query: QueryId, _list: &QueryList<QueryValue>) {}

    fn after_content_checked(&mut self, _owner: OwnerId) {}

    fn after_view_checked(&mut self, _owner: OwnerId) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl PassHooks for NoHooks {}

/// A query whose contents changed during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangedQuery {
    pub owner: OwnerId,
    pub query: QueryId,
    pub kind: QueryKind,
}

/// Summary of one update pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Queries visited, including those skipped as unchanged
    pub refreshed: usize,
    pub changed: Vec<ChangedQuery>,
    /// Owners whose host or query scope is not currently rendered
    pub skipped_owners: Vec<OwnerId>,
}

/// Live queries over one render tree.
pub struct QueryEngine<R: Resolver = NodeResolver> {
    resolver: R,
    config: RefreshConfig,
    owners: Vec<QueryRegistry>,
}

impl QueryEngine<NodeResolver> {
    pub fn new() -> Self {
        Self::with_resolver(NodeResolver)
    }
}

impl Default for QueryEngine<NodeResolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resolver> QueryEngine<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            config: RefreshConfig::default(),
            owners: Vec::new(),
        }
    }

    /// Apply refresh settings to owners registered from now on.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.config = config.refresh;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn owner(&self, owner: OwnerId) -> Result<QueryOwner, QueryError> {
        Ok(self.registry(owner)?.owner())
    }

    pub fn registry(&self, owner: OwnerId) -> Result<&QueryRegistry, QueryError> {
        self.owners
            .get(owner.index() as usize)
            .ok_or(QueryError::UnknownOwner(owner))
    }

    fn registry_mut(&mut self, owner: OwnerId) -> Result<&mut QueryRegistry, QueryError> {
        self.owners
            .get_mut(owner.index() as usize)
            .ok_or(QueryError::UnknownOwner(owner))
    }

    /// Register a root, component or directive instance.
    pub fn register_owner(
        &mut self,
        tree: &dyn RenderedTree,
        owner: QueryOwner,
    ) -> Result<OwnerId, QueryError> {
        if let Some(host) = owner.host() {
            if !tree.contains_node(host) {
                return Err(TreeError::NodeNotFound(host).into());
            }
        }
        let id = OwnerId(self.owners.len() as u32);
        self.owners.push(QueryRegistry::new(id, owner, self.config));
        debug!(owner = %id, ?owner, "Registered query owner");
        Ok(id)
    }

    pub fn declare(
        &mut self,
        tree: &dyn RenderedTree,
        owner: OwnerId,
        kind: QueryKind,
        descriptor: QueryDescriptor,
    ) -> Result<QueryId, QueryError> {
        self.registry_mut(owner)?.declare(tree, kind, descriptor)
    }

    pub fn load(&self, owner: OwnerId, query: QueryId) -> Result<QueryList<QueryValue>, QueryError> {
        self.registry(owner)?.load(query)
    }

    /// Refresh a single query outside of a pass.
    pub fn refresh_query(
        &mut self,
        tree: &dyn RenderedTree,
        owner: OwnerId,
        query: QueryId,
    ) -> Result<bool, QueryError> {
        let resolver = &self.resolver;
        let registry = self
            .owners
            .get_mut(owner.index() as usize)
            .ok_or(QueryError::UnknownOwner(owner))?;
        registry.refresh(tree, resolver, query)
    }

    /// Run one update pass: every rendered owner's content queries, then
    /// every rendered owner's view queries.
    ///
    /// A query whose scope is not rendered leaves its list as it was and
    /// lists the owner in [`PassReport::skipped_owners`]; the pass goes on.
    #[instrument(skip(self, tree, hooks), fields(owners = self.owners.len()))]
    pub fn run_pass(
        &mut self,
        tree: &dyn RenderedTree,
        hooks: &mut dyn PassHooks,
    ) -> Result<PassReport, QueryError> {
        let mut report = PassReport::default();
        let order = self.pass_order(tree, &mut report);

        for kind in [QueryKind::Content, QueryKind::View] {
            for &owner in &order {
                let resolver = &self.resolver;
                let registry = &mut self.owners[owner.index() as usize];
                for query in registry.queries_of(kind) {
                    match registry.refresh(tree, resolver, query) {
                        Ok(false) => report.refreshed += 1,
                        Ok(true) => {
                            report.refreshed += 1;
                            let list = registry.load(query)?;
                            hooks.query_changed(owner, query, &list);
                            report.changed.push(ChangedQuery { owner, query, kind });
                        }
                        Err(QueryError::ScopeNotRendered(scope)) => {
                            debug!(owner = %owner, query = %query, %scope, "Query scope not rendered, skipped");
                            if !report.skipped_owners.contains(&owner) {
                                report.skipped_owners.push(owner);
                            }
                        }
                        Err(err) => return Err(err),
                    }
                }
                match kind {
                    QueryKind::Content => hooks.after_content_checked(owner),
                    QueryKind::View => hooks.after_view_checked(owner),
                }
            }
        }

        debug!(
            refreshed = report.refreshed,
            changed = report.changed.len(),
            skipped = report.skipped_owners.len(),
            "Update pass complete"
        );
        Ok(report)
    }

    /// Live owners with a rendered host, root first, then by host position.
    fn pass_order(&self, tree: &dyn RenderedTree, report: &mut PassReport) -> Vec<OwnerId> {
        let positions = document_order(tree);
        let mut keyed: Vec<((usize, usize), OwnerId)> = Vec::new();
        for registry in self.owners.iter().filter(|r| !r.is_torn_down()) {
            let id = registry.id();
            match registry.owner().host() {
                None => keyed.push(((0, 0), id)),
                Some(host) => match positions.get(&host) {
                    Some(position) => keyed.push(((1, *position), id)),
                    None => report.skipped_owners.push(id),
                },
            }
        }
        // stable sort keeps registration order between owners on one host
        keyed.sort_by_key(|(key, _)| *key);
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    /// Close every list of `owner`.
    pub fn teardown_owner(&mut self, owner: OwnerId) -> Result<(), QueryError> {
        self.registry_mut(owner)?.teardown();
        Ok(())
    }

    /// Tear down every owner hosted on one of `nodes`, e.g. the nodes
    /// returned by `RenderTree::destroy_view`.
    pub fn teardown_nodes(&mut self, nodes: &[NodeId]) -> Vec<OwnerId> {
        let destroyed: HashSet<NodeId> = nodes.iter().copied().collect();
        let mut closed = Vec::new();
        for registry in &mut self.owners {
            let hosted = registry
                .owner()
                .host()
                .is_some_and(|host| destroyed.contains(&host));
            if hosted && !registry.is_torn_down() {
                registry.teardown();
                closed.push(registry.id());
            }
        }
        closed
    }
}

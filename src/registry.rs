//! Per-owner query registry
//!
//! Holds the queries one component, directive or the root declared, resolves
//! each query's scope, and runs the refresh-or-skip protocol.

use crate::config::RefreshConfig;
use crate::error::QueryError;
use crate::query::descriptor::QueryDescriptor;
use crate::query::list::QueryList;
use crate::query::resolver::Resolver;
use crate::query::traversal::{collect_matches, scope_is_static, QueryScope};
use crate::query::value::QueryValue;
use crate::tree::walk::RenderedTree;
use crate::types::{NodeId, OwnerId, QueryId, Revision, ViewId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Who declares a set of queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "owner")]
pub enum QueryOwner {
    /// The top-level template; owns view queries over the root view
    Root,
    /// A component on `host`: view queries over its own view, content
    /// queries over the host's declared children
    Component { host: NodeId },
    /// A directive on `host`: content queries only
    Directive { host: NodeId },
}

impl QueryOwner {
    pub fn host(&self) -> Option<NodeId> {
        match self {
            QueryOwner::Root => None,
            QueryOwner::Component { host } | QueryOwner::Directive { host } => Some(*host),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    View,
    Content,
}

#[derive(Debug)]
struct DeclaredQuery {
    kind: QueryKind,
    descriptor: QueryDescriptor,
    scope: QueryScope,
    list: QueryList<QueryValue>,
    is_static: bool,
    /// Revision the current contents were computed at
    stamp: Option<Revision>,
}

/// Queries of one owner instance, in declaration order.
#[derive(Debug)]
pub struct QueryRegistry {
    id: OwnerId,
    owner: QueryOwner,
    config: RefreshConfig,
    queries: Vec<DeclaredQuery>,
    torn_down: bool,
}

impl QueryRegistry {
    pub fn new(id: OwnerId, owner: QueryOwner, config: RefreshConfig) -> Self {
        Self {
            id,
            owner,
            config,
            queries: Vec::new(),
            torn_down: false,
        }
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn owner(&self) -> QueryOwner {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Register a query and allocate its result list.
    pub fn declare(
        &mut self,
        tree: &dyn RenderedTree,
        kind: QueryKind,
        descriptor: QueryDescriptor,
    ) -> Result<QueryId, QueryError> {
        if self.torn_down {
            return Err(QueryError::OwnerTornDown(self.id));
        }
        let scope = self.scope_for(tree, kind)?;
        let is_static = scope_is_static(tree, scope, descriptor.descendants());
        let id = QueryId(self.queries.len() as u32);
        debug!(owner = %self.id, query = %id, ?kind, scope = %scope, is_static, "Declared query");
        self.queries.push(DeclaredQuery {
            kind,
            descriptor,
            scope,
            list: QueryList::new(),
            is_static,
            stamp: None,
        });
        Ok(id)
    }

    fn scope_for(&self, tree: &dyn RenderedTree, kind: QueryKind) -> Result<QueryScope, QueryError> {
        match (kind, self.owner) {
            (QueryKind::View, QueryOwner::Root) => Ok(QueryScope::View(tree.root_view())),
            (QueryKind::View, QueryOwner::Component { host }) => tree
                .component_view(host)
                .map(QueryScope::View)
                .ok_or(QueryError::NoComponentView(host)),
            (QueryKind::View, QueryOwner::Directive { .. }) => Err(QueryError::DirectiveViewQuery),
            (QueryKind::Content, QueryOwner::Root) => Err(QueryError::RootContentQuery),
            (QueryKind::Content, QueryOwner::Component { host })
            | (QueryKind::Content, QueryOwner::Directive { host }) => Ok(QueryScope::Content(host)),
        }
    }

    /// Live list of a query; stable for the owner's lifetime.
    pub fn load(&self, query: QueryId) -> Result<QueryList<QueryValue>, QueryError> {
        Ok(self.entry(query)?.list.clone())
    }

    pub fn kind(&self, query: QueryId) -> Result<QueryKind, QueryError> {
        Ok(self.entry(query)?.kind)
    }

    pub fn descriptor(&self, query: QueryId) -> Result<&QueryDescriptor, QueryError> {
        Ok(&self.entry(query)?.descriptor)
    }

    /// Whether the query's reachable scope has contained no insertion point so far.
    pub fn is_static(&self, query: QueryId) -> Result<bool, QueryError> {
        Ok(self.entry(query)?.is_static)
    }

    /// Ids of every query of `kind`, in declaration order.
    pub fn queries_of(&self, kind: QueryKind) -> Vec<QueryId> {
        self.queries
            .iter()
            .enumerate()
            .filter(|(_, q)| q.kind == kind)
            .map(|(index, _)| QueryId(index as u32))
            .collect()
    }

    /// Recompute one query; returns whether its contents changed.
    ///
    /// Skipped when the list is clean, the revision it was computed at is
    /// unchanged and the resolver is [`Resolver::revision_bound`]. A
    /// component's view query re-resolves its scope first; once the
    /// component view is destroyed the list is cleared. A torn-down owner
    /// always reports no change.
    pub fn refresh(
        &mut self,
        tree: &dyn RenderedTree,
        resolver: &dyn Resolver,
        query: QueryId,
    ) -> Result<bool, QueryError> {
        if self.torn_down {
            return Ok(false);
        }
        let owner = self.id;
        let declared_by = self.owner;
        let config = self.config;
        let entry = self
            .queries
            .get_mut(query.index() as usize)
            .ok_or(QueryError::UnknownQuery { owner, query })?;

        match live_scope(tree, declared_by, entry) {
            None => {
                // component view destroyed: nothing left to match
                let changed = entry.list.reset(Vec::new());
                entry.list.notify_on_changes();
                entry.stamp = Some(tree.revision());
                debug!(owner = %owner, query = %query, changed, "Query scope gone, cleared");
                return Ok(changed);
            }
            Some(scope) if scope != entry.scope => {
                debug!(owner = %owner, query = %query, from = %entry.scope, to = %scope, "Query scope moved");
                entry.scope = scope;
                entry.is_static = scope_is_static(tree, scope, entry.descriptor.descendants());
                entry.stamp = None;
            }
            Some(_) => {}
        }

        let stamp = current_stamp(tree, entry, config);
        if config.skip_unchanged
            && resolver.revision_bound()
            && !entry.list.is_dirty()
            && entry.stamp == Some(stamp)
        {
            trace!(owner = %owner, query = %query, "Refresh skipped: unchanged");
            return Ok(false);
        }

        let traversal = collect_matches(tree, entry.scope, &entry.descriptor, resolver)?;
        let stamp = if entry.is_static && traversal.crossed_insertion_point {
            entry.is_static = false;
            current_stamp(tree, entry, config)
        } else {
            stamp
        };

        let values: Vec<QueryValue> = traversal.matches.into_iter().map(|m| m.value).collect();
        let count = values.len();
        let changed = entry.list.reset(values);
        entry.list.notify_on_changes();
        entry.stamp = Some(stamp);
        debug!(owner = %owner, query = %query, count, changed, "Refreshed query");
        Ok(changed)
    }

    /// Refresh every query of `kind` in declaration order.
    pub fn refresh_kind(
        &mut self,
        tree: &dyn RenderedTree,
        resolver: &dyn Resolver,
        kind: QueryKind,
    ) -> Result<Vec<(QueryId, bool)>, QueryError> {
        let mut outcomes = Vec::new();
        for query in self.queries_of(kind) {
            let changed = self.refresh(tree, resolver, query)?;
            outcomes.push((query, changed));
        }
        Ok(outcomes)
    }

    /// Close every list. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        for entry in &self.queries {
            entry.list.destroy();
        }
        self.torn_down = true;
        debug!(owner = %self.id, queries = self.queries.len(), "Tore down query owner");
    }

    fn entry(&self, query: QueryId) -> Result<&DeclaredQuery, QueryError> {
        self.queries
            .get(query.index() as usize)
            .ok_or(QueryError::UnknownQuery {
                owner: self.id,
                query,
            })
    }
}

/// Scope a query should look at now. A component's view query follows the
/// host's current component view; `None` once that view is gone.
fn live_scope(tree: &dyn RenderedTree, owner: QueryOwner, entry: &DeclaredQuery) -> Option<QueryScope> {
    match (entry.kind, owner) {
        (QueryKind::View, QueryOwner::Component { host }) => {
            tree.component_view(host).map(QueryScope::View)
        }
        _ => Some(entry.scope),
    }
}

fn scope_view(tree: &dyn RenderedTree, scope: QueryScope) -> Option<ViewId> {
    match scope {
        QueryScope::View(view) => Some(view),
        QueryScope::Content(host) => tree.owning_view(host),
    }
}

fn current_stamp(tree: &dyn RenderedTree, entry: &DeclaredQuery, config: RefreshConfig) -> Revision {
    if entry.is_static && config.track_static {
        if let Some(revision) = scope_view(tree, entry.scope).and_then(|v| tree.view_revision(v)) {
            return revision;
        }
    }
    tree.revision()
}

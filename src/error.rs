//! Error types for the query engine and the render tree arena.

use crate::types::{NodeId, OwnerId, QueryId, ViewId};
use thiserror::Error;

/// Render tree mutation errors
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("View not found: {0}")]
    ViewNotFound(ViewId),

    #[error("Node {0} is not an insertion point")]
    NotAContainer(NodeId),

    #[error("Node {parent} cannot hold declared children")]
    InvalidParent { parent: NodeId },

    #[error("Parent {parent} belongs to {parent_view}, not {view}")]
    ForeignParent {
        parent: NodeId,
        parent_view: ViewId,
        view: ViewId,
    },

    #[error("View {0} is already attached to a container")]
    ViewAlreadyAttached(ViewId),

    #[error("View {0} cannot be attached to a container")]
    ViewNotAttachable(ViewId),

    #[error("Index {index} out of bounds for container with {len} views")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Behaviors already installed on node {0}")]
    BehaviorsAlreadyInstalled(NodeId),

    #[error("Node {0} is not an element and cannot host a component view")]
    NotAnElement(NodeId),

    #[error("Node {0} already hosts a component view")]
    ComponentViewExists(NodeId),

    #[error("The root view cannot be destroyed")]
    RootViewImmutable,
}

/// Query declaration and refresh errors
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Query predicate has an empty alias set")]
    EmptyAliasSet,

    #[error("Query predicate contains a blank alias name")]
    BlankAlias,

    #[error("Query predicate repeats alias '{0}'")]
    DuplicateAlias(String),

    #[error("Unknown query owner: {0}")]
    UnknownOwner(OwnerId),

    #[error("Unknown query {query} for owner {owner}")]
    UnknownQuery { owner: OwnerId, query: QueryId },

    #[error("Owner {0} has been torn down")]
    OwnerTornDown(OwnerId),

    #[error("Owner hosted on {0} has no component view to query")]
    NoComponentView(NodeId),

    #[error("Directives have no view of their own; declare a content query instead")]
    DirectiveViewQuery,

    #[error("The root owner has no projected content")]
    RootContentQuery,

    #[error("Query scope is not rendered: {0}")]
    ScopeNotRendered(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

impl From<config::ConfigError> for QueryError {
    fn from(err: config::ConfigError) -> Self {
        QueryError::ConfigError(err.to_string())
    }
}

//! Viewquery: live view and content queries
//!
//! Resolves declarative "find me these nodes" predicates (by behavior type,
//! provider token, exported name or local alias) against a render tree whose
//! views are created, attached, moved and destroyed at runtime, and keeps
//! each owner's result lists current across update passes.
//!
//! ```
//! use viewquery::{LocalAlias, QueryDescriptor, QueryEngine, QueryKind, QueryOwner, RenderTree, RenderedTree, NoHooks};
//!
//! let mut tree = RenderTree::new();
//! let root = tree.root_view();
//! let div = tree.element(root, None, "div").unwrap();
//! tree.add_alias(div, LocalAlias::new("item")).unwrap();
//!
//! let mut engine = QueryEngine::new();
//! let owner = engine.register_owner(&tree, QueryOwner::Root).unwrap();
//! let query = engine
//!     .declare(&tree, owner, QueryKind::View, QueryDescriptor::alias("item").unwrap())
//!     .unwrap();
//!
//! engine.run_pass(&tree, &mut NoHooks).unwrap();
//! assert_eq!(engine.load(owner, query).unwrap().len(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod query;
pub mod registry;
pub mod tree;
pub mod types;

pub use config::{ConfigLoader, EngineConfig, RefreshConfig};
pub use engine::{ChangedQuery, NoHooks, PassHooks, PassReport, QueryEngine};
pub use error::{QueryError, TreeError};
pub use query::{
    ContainerHandle, ElementHandle, Poll, Predicate, QueryChange, QueryDescriptor, QueryList,
    QueryScope, QueryValue, Resolver, NodeResolver, Subscription, TemplateHandle, Token,
};
pub use registry::{QueryKind, QueryOwner, QueryRegistry};
pub use tree::{
    BehaviorInstance, LocalAlias, NodeKind, Provider, RenderTree, RenderedTree,
};
pub use types::{NodeId, OwnerId, QueryId, Revision, TemplateId, TypeTag, ViewId};

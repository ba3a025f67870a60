//! Render tree
//!
//! The renderer-facing side of the crate: node kinds and capabilities, the
//! read-only [`RenderedTree`] interface queries traverse, and an in-memory
//! arena implementing it.

pub mod arena;
pub mod capability;
pub mod node;
pub mod walk;

pub use arena::RenderTree;
pub use capability::{
    AliasMatch, BehaviorInstance, Located, LocalAlias, NodeCapabilities, ProvidedValue, Provider,
};
pub use node::{NodeKind, RenderNode, ViewFragment, ViewKind};
pub use walk::{document_order, is_rendered, RenderedTree};

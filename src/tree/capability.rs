//! Node capability descriptors
//!
//! The static facts a query needs about one rendered node: its kind, the local
//! aliases declared on it, the behavior instances attached to it and the
//! providers those behaviors publish.

use crate::tree::node::NodeKind;
use crate::types::TypeTag;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque state carried by a behavior instance or a provider.
pub type ProvidedValue = Arc<dyn Any + Send + Sync>;

/// A local alias declared on a node, e.g. `#x` or `#x="someExport"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAlias {
    pub name: String,
    pub export: Option<String>,
}

impl LocalAlias {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            export: None,
        }
    }

    pub fn exported(name: impl Into<String>, export: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            export: Some(export.into()),
        }
    }
}

/// Result of looking up a local alias on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasMatch<'a> {
    /// Declaration position of the alias on the node
    pub position: usize,
    /// Export name the alias was bound to, if any
    pub export: Option<&'a str>,
}

/// A directive or component instance attached to a node.
pub struct BehaviorInstance {
    type_tag: TypeTag,
    implements: Vec<TypeTag>,
    export_as: Vec<String>,
    component: bool,
    state: ProvidedValue,
}

impl BehaviorInstance {
    /// Directive instance of the given type wrapping `state`.
    pub fn new<S: Any + Send + Sync>(type_tag: impl Into<TypeTag>, state: S) -> Self {
        Self {
            type_tag: type_tag.into(),
            implements: Vec::new(),
            export_as: Vec::new(),
            component: false,
            state: Arc::new(state),
        }
    }

    /// Declare an additional type this instance is assignable to.
    pub fn implementing(mut self, tag: impl Into<TypeTag>) -> Self {
        self.implements.push(tag.into());
        self
    }

    /// Declare a name local aliases can export this instance under.
    pub fn exported_as(mut self, name: impl Into<String>) -> Self {
        self.export_as.push(name.into());
        self
    }

    /// Mark this instance as the component rendered on its host.
    pub fn as_component(mut self) -> Self {
        self.component = true;
        self
    }

    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    pub fn is_component(&self) -> bool {
        self.component
    }

    pub fn export_names(&self) -> &[String] {
        &self.export_as
    }

    /// Exact type or declared capability match.
    pub fn is_assignable_to(&self, tag: &TypeTag) -> bool {
        self.type_tag == *tag || self.implements.iter().any(|t| t == tag)
    }

    pub fn state<S: Any>(&self) -> Option<&S> {
        self.state.downcast_ref::<S>()
    }
}

impl fmt::Debug for BehaviorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorInstance")
            .field("type_tag", &self.type_tag)
            .field("implements", &self.implements)
            .field("export_as", &self.export_as)
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}

/// A value published on a node under a token.
#[derive(Clone)]
pub struct Provider {
    pub token: TypeTag,
    pub value: ProvidedValue,
}

impl Provider {
    pub fn new<S: Any + Send + Sync>(token: impl Into<TypeTag>, value: S) -> Self {
        Self {
            token: token.into(),
            value: Arc::new(value),
        }
    }

    /// Publish an existing provider's value under another token.
    pub fn alias_of(token: impl Into<TypeTag>, existing: &Provider) -> Self {
        Self {
            token: token.into(),
            value: Arc::clone(&existing.value),
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Something a type token resolved to on a node.
#[derive(Debug, Clone)]
pub enum Located {
    Behavior(Arc<BehaviorInstance>),
    Provided(ProvidedValue),
}

/// Everything a query can observe about one node.
#[derive(Debug, Clone)]
pub struct NodeCapabilities {
    kind: NodeKind,
    aliases: Vec<LocalAlias>,
    /// `None` until setup has installed the node's behaviors
    behaviors: Option<Vec<Arc<BehaviorInstance>>>,
    providers: Vec<Provider>,
}

impl NodeCapabilities {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            aliases: Vec::new(),
            behaviors: None,
            providers: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_container_marker(&self) -> bool {
        self.kind.is_marker()
    }

    pub fn aliases(&self) -> &[LocalAlias] {
        &self.aliases
    }

    /// First declaration of `name` on this node.
    pub fn has_local_alias(&self, name: &str) -> Option<AliasMatch<'_>> {
        self.aliases
            .iter()
            .position(|a| a.name == name)
            .map(|position| AliasMatch {
                position,
                export: self.aliases[position].export.as_deref(),
            })
    }

    /// Installed behaviors in attachment order; empty before setup.
    pub fn behavior_instances(&self) -> &[Arc<BehaviorInstance>] {
        self.behaviors.as_deref().unwrap_or(&[])
    }

    pub fn behaviors_installed(&self) -> bool {
        self.behaviors.is_some()
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn component(&self) -> Option<&Arc<BehaviorInstance>> {
        self.behavior_instances().iter().find(|b| b.is_component())
    }

    /// Behavior exported under `name`.
    pub fn exported(&self, name: &str) -> Option<&Arc<BehaviorInstance>> {
        self.behavior_instances()
            .iter()
            .find(|b| b.export_names().iter().any(|e| e == name))
    }

    /// Behaviors take precedence over providers registered under the same token.
    pub fn locate(&self, tag: &TypeTag) -> Option<Located> {
        if let Some(behavior) = self
            .behavior_instances()
            .iter()
            .find(|b| b.is_assignable_to(tag))
        {
            return Some(Located::Behavior(Arc::clone(behavior)));
        }
        self.providers
            .iter()
            .find(|p| p.token == *tag)
            .map(|p| Located::Provided(Arc::clone(&p.value)))
    }

    pub(crate) fn push_alias(&mut self, alias: LocalAlias) {
        self.aliases.push(alias);
    }

    /// Install all behaviors and providers at once. Returns false if already installed.
    pub(crate) fn install(
        &mut self,
        behaviors: Vec<BehaviorInstance>,
        providers: Vec<Provider>,
    ) -> bool {
        if self.behaviors.is_some() {
            return false;
        }
        self.behaviors = Some(behaviors.into_iter().map(Arc::new).collect());
        self.providers = providers;
        true
    }
}

//! Query model and matching
//!
//! Descriptors say what to look for, the matcher evaluates one node, the
//! traversal walks a scope in document order, and `QueryList` holds the
//! live result.

pub mod descriptor;
pub mod list;
pub mod matcher;
pub mod resolver;
pub mod traversal;
pub mod value;

pub use descriptor::{Predicate, QueryDescriptor, Token};
pub use list::{Poll, QueryChange, QueryList, Subscription};
pub use matcher::{match_node, RawMatch};
pub use resolver::{NodeResolver, Resolver};
pub use traversal::{collect_matches, scope_is_static, QueryScope, Traversal};
pub use value::{ContainerHandle, ElementHandle, QueryValue, TemplateHandle};

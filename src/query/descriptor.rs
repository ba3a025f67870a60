//! Query descriptors
//!
//! What a query looks for (`predicate`), how far it looks (`descendants`) and
//! what it reads from each match (`read`). Descriptors are validated once at
//! construction and immutable afterwards.

use crate::error::QueryError;
use crate::types::TypeTag;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Token naming a behavior/provider type or a built-in structural handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Token {
    Type(TypeTag),
    ElementHandle,
    TemplateHandle,
    ContainerHandle,
}

impl Token {
    pub fn of(tag: impl Into<TypeTag>) -> Self {
        Token::Type(tag.into())
    }
}

/// Selector part of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Alias(String),
    /// Matches are flattened in this order, not the node's declaration order
    Aliases(Vec<String>),
    Type(Token),
}

/// An immutable, validated query declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorMetadata")]
pub struct QueryDescriptor {
    predicate: Predicate,
    descendants: bool,
    read: Option<Token>,
}

/// Unvalidated wire shape for descriptor metadata.
#[derive(Debug, Deserialize)]
struct DescriptorMetadata {
    predicate: Predicate,
    #[serde(default)]
    descendants: bool,
    #[serde(default)]
    read: Option<Token>,
}

impl TryFrom<DescriptorMetadata> for QueryDescriptor {
    type Error = QueryError;

    fn try_from(raw: DescriptorMetadata) -> Result<Self, Self::Error> {
        QueryDescriptor::new(raw.predicate, raw.descendants, raw.read)
    }
}

impl QueryDescriptor {
    pub fn new(
        predicate: Predicate,
        descendants: bool,
        read: Option<Token>,
    ) -> Result<Self, QueryError> {
        validate_predicate(&predicate)?;
        Ok(Self {
            predicate,
            descendants,
            read,
        })
    }

    /// Shallow single-alias query.
    pub fn alias(name: impl Into<String>) -> Result<Self, QueryError> {
        Self::new(Predicate::Alias(name.into()), false, None)
    }

    /// Shallow multi-alias query.
    pub fn aliases<I, S>(names: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect();
        Self::new(Predicate::Aliases(names), false, None)
    }

    /// Shallow query by token.
    pub fn token(token: Token) -> Result<Self, QueryError> {
        Self::new(Predicate::Type(token), false, None)
    }

    /// Shallow query by behavior or provider type.
    pub fn of_type(tag: impl Into<TypeTag>) -> Result<Self, QueryError> {
        Self::token(Token::of(tag))
    }

    pub fn deep(mut self) -> Self {
        self.descendants = true;
        self
    }

    pub fn reading(mut self, token: Token) -> Self {
        self.read = Some(token);
        self
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn descendants(&self) -> bool {
        self.descendants
    }

    pub fn read(&self) -> Option<&Token> {
        self.read.as_ref()
    }
}

fn validate_predicate(predicate: &Predicate) -> Result<(), QueryError> {
    match predicate {
        Predicate::Alias(name) => validate_alias(name),
        Predicate::Aliases(names) => {
            if names.is_empty() {
                return Err(QueryError::EmptyAliasSet);
            }
            let mut seen = HashSet::new();
            for name in names {
                validate_alias(name)?;
                if !seen.insert(name.as_str()) {
                    return Err(QueryError::DuplicateAlias(name.clone()));
                }
            }
            Ok(())
        }
        Predicate::Type(_) => Ok(()),
    }
}

fn validate_alias(name: &str) -> Result<(), QueryError> {
    if name.trim().is_empty() {
        return Err(QueryError::BlankAlias);
    }
    Ok(())
}

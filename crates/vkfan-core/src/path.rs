use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Dotted `{entity}.{submethod}` name, lowercased.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryPath {
    entity: String,
    submethod: String,
}

impl QueryPath {
    pub fn new(entity: &str, submethod: &str) -> Self {
        Self {
            entity: entity.to_ascii_lowercase(),
            submethod: submethod.to_ascii_lowercase(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn submethod(&self) -> &str {
        &self.submethod
    }
}

impl FromStr for QueryPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((entity, submethod)) if !entity.is_empty() && !submethod.is_empty() => {
                Ok(Self::new(entity, submethod))
            }
            _ => Err(CoreError::InvalidRoute(s.to_string())),
        }
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.submethod)
    }
}

impl fmt::Debug for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryPath({})", self)
    }
}

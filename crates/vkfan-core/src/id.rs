use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// An entity identifier as the API accepts it: a numeric id or a screen name.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ident {
    Id(i64),
    Name(String),
}

impl Ident {
    pub fn as_id(&self) -> Option<i64> {
        match self {
            Ident::Id(id) => Some(*id),
            Ident::Name(_) => None,
        }
    }
}

impl From<i64> for Ident {
    fn from(id: i64) -> Self {
        Ident::Id(id)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| Ident::Name(s.to_string()))
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident::from(s.as_str())
    }
}

impl FromStr for Ident {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(id) => Ident::Id(id),
            Err(_) => Ident::Name(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Id(id) => write!(f, "{id}"),
            Ident::Name(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({})", self)
    }
}

/// Opaque identifier a task pool assigns to each submitted request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(Ulid);

impl RequestId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Ulid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_become_ids() {
        assert_eq!(Ident::from("42"), Ident::Id(42));
        assert_eq!(Ident::from(" -7 "), Ident::Id(-7));
        assert_eq!(Ident::from("durov"), Ident::Name("durov".to_string()));
    }

    #[test]
    fn display_is_raw_text() {
        assert_eq!(Ident::Id(1).to_string(), "1");
        assert_eq!(Ident::Name("club1".into()).to_string(), "club1");
    }

    #[test]
    fn untagged_serde() {
        let ids: Vec<Ident> = serde_json::from_str(r#"[1, "apiclub"]"#).unwrap();
        assert_eq!(ids, vec![Ident::Id(1), Ident::Name("apiclub".into())]);
    }

    #[test]
    fn request_ids_are_distinct() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert_eq!(RequestId::from_bytes(a.as_bytes()), a);
    }
}

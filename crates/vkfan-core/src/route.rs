use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CoreError, QueryPath};

pub const API_URL: &str = "https://api.vk.com/method/";

/// Static routing data for one API section (`users`, `groups`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRoute {
    pub name: String,
    /// Section URL without the sub-method suffix, e.g. `https://api.vk.com/method/users`.
    pub url: String,
    /// Lowercase sub-method name to URL suffix (`getmembers` -> `.getMembers`).
    pub methods: BTreeMap<String, String>,
    /// Multi-identifier parameter names; the first one is the default.
    pub multi_ids: Vec<String>,
    /// Maximum identifiers per request for each multi-id parameter.
    /// Parameters without an entry send every identifier on its own.
    #[serde(default)]
    pub limits: BTreeMap<String, usize>,
}

impl EntityRoute {
    pub fn new(api_url: &str, name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        Self {
            url: format!("{}{}", api_url, name),
            name,
            methods: BTreeMap::new(),
            multi_ids: Vec::new(),
            limits: BTreeMap::new(),
        }
    }

    pub fn method(mut self, submethod: &str) -> Self {
        self.methods
            .insert(submethod.to_ascii_lowercase(), format!(".{submethod}"));
        self
    }

    pub fn multi_id(mut self, param: &str, limit: Option<usize>) -> Self {
        self.multi_ids.push(param.to_string());
        if let Some(limit) = limit {
            self.limits.insert(param.to_string(), limit);
        }
        self
    }

    pub fn has_method(&self, submethod: &str) -> bool {
        self.methods.contains_key(&submethod.to_ascii_lowercase())
    }

    pub fn endpoint(&self, submethod: &str) -> Result<String, CoreError> {
        self.methods
            .get(&submethod.to_ascii_lowercase())
            .map(|suffix| format!("{}{}", self.url, suffix))
            .ok_or_else(|| CoreError::InvalidRoute(format!("{}.{}", self.name, submethod)))
    }

    pub fn default_param(&self) -> Result<&str, CoreError> {
        self.multi_ids
            .first()
            .map(String::as_str)
            .ok_or_else(|| CoreError::UnknownParameter {
                entity: self.name.clone(),
                param: String::new(),
            })
    }

    /// Batch limit for `param`; parameters the section does not declare are rejected.
    pub fn limit(&self, param: &str) -> Result<Option<usize>, CoreError> {
        if !self.multi_ids.iter().any(|p| p == param) {
            return Err(CoreError::UnknownParameter {
                entity: self.name.clone(),
                param: param.to_string(),
            });
        }
        Ok(self.limits.get(param).copied())
    }

    /// Match a request URL against this section and return the sub-method it targets.
    fn match_url(&self, url: &str) -> Option<&str> {
        let rest = url.strip_prefix(self.url.as_str())?;
        let suffix = rest.split(['?', '#']).next().unwrap_or(rest);
        self.methods
            .iter()
            .find(|(_, s)| s.eq_ignore_ascii_case(suffix))
            .map(|(name, _)| name.as_str())
    }
}

/// All known API sections, keyed by lowercase name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(flatten)]
    entities: BTreeMap<String, EntityRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }

    /// The sections this crate ships handlers for.
    pub fn vk(api_url: &str) -> Self {
        let mut table = Self::new();
        table.insert(
            EntityRoute::new(api_url, "users")
                .method("get")
                .method("getSubscriptions")
                .method("getFollowers")
                .multi_id("user_ids", Some(1000)),
        );
        table.insert(
            EntityRoute::new(api_url, "groups")
                .method("getById")
                .method("getMembers")
                .method("isMember")
                .multi_id("group_ids", Some(500))
                .multi_id("user_ids", Some(500)),
        );
        table.insert(
            EntityRoute::new(api_url, "friends")
                .method("get")
                .multi_id("user_ids", None),
        );
        table.insert(
            EntityRoute::new(api_url, "wall")
                .method("get")
                .multi_id("owner_ids", Some(1)),
        );
        table
    }

    pub fn insert(&mut self, route: EntityRoute) {
        self.entities.insert(route.name.clone(), route);
    }

    pub fn get(&self, entity: &str) -> Result<&EntityRoute, CoreError> {
        self.entities
            .get(&entity.to_ascii_lowercase())
            .ok_or_else(|| CoreError::InvalidRoute(entity.to_string()))
    }

    pub fn endpoint(&self, path: &QueryPath) -> Result<String, CoreError> {
        self.get(path.entity())?.endpoint(path.submethod())
    }

    pub fn contains(&self, path: &QueryPath) -> bool {
        self.get(path.entity())
            .map(|route| route.has_method(path.submethod()))
            .unwrap_or(false)
    }

    /// Find the `{entity}.{submethod}` a request URL was sent to.
    pub fn resolve(&self, url: &str) -> Option<QueryPath> {
        self.entities.values().find_map(|route| {
            route
                .match_url(url)
                .map(|submethod| QueryPath::new(&route.name, submethod))
        })
    }

    pub fn paths(&self) -> impl Iterator<Item = QueryPath> + '_ {
        self.entities.values().flat_map(|route| {
            route
                .methods
                .keys()
                .map(move |submethod| QueryPath::new(&route.name, submethod))
        })
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityRoute> {
        self.entities.values()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::vk(API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_uses_suffix_case() {
        let table = RouteTable::default();
        let path = QueryPath::new("groups", "getmembers");
        assert_eq!(
            table.endpoint(&path).unwrap(),
            "https://api.vk.com/method/groups.getMembers"
        );
    }

    #[test]
    fn unknown_entity_and_submethod_are_invalid_routes() {
        let table = RouteTable::default();
        assert!(matches!(
            table.endpoint(&QueryPath::new("photos", "get")),
            Err(CoreError::InvalidRoute(_))
        ));
        assert!(matches!(
            table.endpoint(&QueryPath::new("users", "delete")),
            Err(CoreError::InvalidRoute(_))
        ));
    }

    #[test]
    fn resolve_matches_url_with_query() {
        let table = RouteTable::default();
        let path = table
            .resolve("https://api.vk.com/method/users.getSubscriptions?user_id=1&v=5.132")
            .unwrap();
        assert_eq!(path, QueryPath::new("users", "getsubscriptions"));
        assert!(table
            .resolve("https://api.vk.com/method/users.getSubscriptionsX")
            .is_none());
        assert!(table.resolve("https://example.com/users.get").is_none());
    }

    #[test]
    fn limits_are_per_parameter() {
        let table = RouteTable::default();
        let groups = table.get("groups").unwrap();
        assert_eq!(groups.limit("group_ids").unwrap(), Some(500));
        assert_eq!(table.get("friends").unwrap().limit("user_ids").unwrap(), None);
        assert!(matches!(
            groups.limit("owner_ids"),
            Err(CoreError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn table_roundtrips_through_toml() {
        let table = RouteTable::vk("http://127.0.0.1:9000/method/");
        let text = toml::to_string_pretty(&table).unwrap();
        let back: RouteTable = toml::from_str(&text).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.paths().count(), 8);
    }
}

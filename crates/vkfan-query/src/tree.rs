use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vkfan_core::QueryPath;

/// Results of one logical call, keyed `entity -> submethod -> values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTree(BTreeMap<String, BTreeMap<String, Vec<Value>>>);

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree with an empty list under every path in `paths`.
    pub fn seeded<'a>(paths: impl IntoIterator<Item = &'a QueryPath>) -> Self {
        let mut tree = Self::new();
        for path in paths {
            tree.entry(path);
        }
        tree
    }

    pub fn get(&self, path: &QueryPath) -> &[Value] {
        self.0
            .get(path.entity())
            .and_then(|subs| subs.get(path.submethod()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn entry(&mut self, path: &QueryPath) -> &mut Vec<Value> {
        self.0
            .entry(path.entity().to_string())
            .or_default()
            .entry(path.submethod().to_string())
            .or_default()
    }

    /// Arrays are spliced in element by element; anything else is appended whole.
    pub fn extend(&mut self, path: &QueryPath, value: Value) {
        let slot = self.entry(path);
        match value {
            Value::Array(items) => slot.extend(items),
            other => slot.push(other),
        }
    }

    /// Replace the list at `path`.
    pub fn set(&mut self, path: &QueryPath, values: Vec<Value>) {
        *self.entry(path) = values;
    }

    pub fn take(&mut self, path: &QueryPath) -> Vec<Value> {
        std::mem::take(self.entry(path))
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every `(entity, submethod, values)` in key order.
    pub fn lists(&self) -> impl Iterator<Item = (&str, &str, &[Value])> {
        self.0.iter().flat_map(|(entity, subs)| {
            subs.iter()
                .map(move |(sub, values)| (entity.as_str(), sub.as_str(), values.as_slice()))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().flat_map(BTreeMap::values).all(Vec::is_empty)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seeded_paths_start_empty() {
        let paths = [QueryPath::new("users", "get"), QueryPath::new("wall", "get")];
        let tree = ResultTree::seeded(&paths);
        assert_eq!(tree.to_json(), json!({"users": {"get": []}, "wall": {"get": []}}));
        assert!(tree.is_empty());
    }

    #[test]
    fn extend_splices_arrays() {
        let path = QueryPath::new("friends", "get");
        let mut tree = ResultTree::new();
        tree.extend(&path, json!([1, 2]));
        tree.extend(&path, json!({"id": 3}));
        assert_eq!(tree.get(&path), &[json!(1), json!(2), json!({"id": 3})]);
    }

    #[test]
    fn missing_path_reads_empty() {
        let tree = ResultTree::new();
        assert!(tree.get(&QueryPath::new("groups", "getbyid")).is_empty());
    }

    #[test]
    fn set_overwrites() {
        let path = QueryPath::new("users", "get");
        let mut tree = ResultTree::new();
        tree.extend(&path, json!([1]));
        tree.set(&path, vec![json!(9)]);
        assert_eq!(tree.take(&path), vec![json!(9)]);
        assert!(tree.get(&path).is_empty());
    }
}

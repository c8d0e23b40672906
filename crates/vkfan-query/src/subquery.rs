use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use vkfan_core::{Params, QueryPath, RequestId};

use crate::ResultTree;

/// Named buckets for a grouped sub-query: group name -> request ids routed there.
pub type GroupSpec = BTreeMap<String, Vec<RequestId>>;

/// Follow-up work spawned while handling a response.
///
/// Tracks which request ids are still outstanding and collects their payloads.
/// Once every id has reported, [`push`](SubQuery::push) writes the collected
/// values into the result tree at `path`, exactly once.
#[derive(Debug, Clone)]
pub struct SubQuery {
    ids: HashSet<RequestId>,
    pending: HashSet<RequestId>,
    path: QueryPath,
    params: Params,
    groups: Vec<BTreeMap<String, Vec<Value>>>,
    membership: HashMap<RequestId, (usize, String)>,
    flat: Vec<Value>,
    pushed: bool,
}

impl SubQuery {
    pub fn builder(ids: impl IntoIterator<Item = RequestId>, path: QueryPath) -> SubQueryBuilder {
        SubQueryBuilder {
            ids: ids.into_iter().collect(),
            path,
            params: Params::new(),
            seed: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn path(&self) -> &QueryPath {
        &self.path
    }

    /// Request parameters the follow-ups were sent with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn tracks(&self, id: &RequestId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &RequestId> {
        self.ids.iter()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Record the payload for `id`. Untracked ids are ignored.
    ///
    /// Arrays are spliced into the bucket so a page of items extends it.
    pub fn update(&mut self, id: RequestId, value: Value) {
        if !self.ids.contains(&id) {
            return;
        }
        self.pending.remove(&id);

        let bucket = match self.membership.get(&id) {
            Some((index, name)) => self.groups[*index].entry(name.clone()).or_default(),
            None => &mut self.flat,
        };
        match value {
            Value::Array(items) => bucket.extend(items),
            other => bucket.push(other),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pushed(&self) -> bool {
        self.pushed
    }

    /// Collected values: one object per group spec, then ungrouped values.
    pub fn results(&self) -> Vec<Value> {
        let mut out: Vec<Value> = self
            .groups
            .iter()
            .map(|group| {
                Value::Object(
                    group
                        .iter()
                        .map(|(name, values)| (name.clone(), Value::Array(values.clone())))
                        .collect(),
                )
            })
            .collect();
        out.extend(self.flat.iter().cloned());
        out
    }

    /// Take over `other`'s ids, pending set and collected values so both
    /// push as one list. Group buckets keep their own names.
    pub fn absorb(&mut self, other: SubQuery) {
        let offset = self.groups.len();
        self.ids.extend(other.ids);
        self.pending.extend(other.pending);
        self.groups.extend(other.groups);
        for (id, (index, name)) in other.membership {
            self.membership.insert(id, (index + offset, name));
        }
        self.flat.extend(other.flat);
        for (key, value) in other.params {
            self.params.entry(key).or_insert(value);
        }
    }

    /// Write the results into `tree`. Returns whether anything was written.
    pub fn push(&mut self, tree: &mut ResultTree) -> bool {
        if self.pushed || !self.is_complete() {
            return false;
        }
        tree.set(&self.path, self.results());
        self.pushed = true;
        true
    }
}

#[derive(Debug)]
pub struct SubQueryBuilder {
    ids: Vec<RequestId>,
    path: QueryPath,
    params: Params,
    seed: Vec<(RequestId, Value)>,
    groups: Vec<GroupSpec>,
}

impl SubQueryBuilder {
    pub fn path(mut self, path: QueryPath) -> Self {
        self.path = path;
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// A value already in hand for `id`, folded in as if it had just arrived.
    /// `id` is added to the tracked set if it is not there yet.
    pub fn seed(mut self, id: RequestId, value: Value) -> Self {
        self.seed.push((id, value));
        self
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    pub fn build(self) -> SubQuery {
        let ids: HashSet<RequestId> = self.ids.into_iter().collect();
        let mut membership = HashMap::new();
        let groups: Vec<BTreeMap<String, Vec<Value>>> = self
            .groups
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.into_iter()
                    .map(|(name, members)| {
                        for id in members {
                            membership.entry(id).or_insert_with(|| (index, name.clone()));
                        }
                        (name, Vec::new())
                    })
                    .collect::<BTreeMap<_, _>>()
            })
            .collect();

        let mut subquery = SubQuery {
            pending: ids.clone(),
            ids,
            path: self.path,
            params: self.params,
            groups,
            membership,
            flat: Vec::new(),
            pushed: false,
        };
        for (id, value) in self.seed {
            subquery.ids.insert(id);
            subquery.update(id, value);
        }
        subquery
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(n: usize) -> Vec<RequestId> {
        (0..n).map(|_| RequestId::new()).collect()
    }

    fn path() -> QueryPath {
        QueryPath::new("friends", "get")
    }

    #[test]
    fn completes_after_every_tracked_id() {
        let ids = ids(3);
        let mut sq = SubQuery::builder(ids.clone(), path()).build();
        let mut tree = ResultTree::new();

        sq.update(RequestId::new(), json!("stray"));
        assert_eq!(sq.pending(), 3);

        sq.update(ids[0], json!("a"));
        sq.update(ids[1], json!("b"));
        assert!(!sq.is_complete());
        assert!(!sq.push(&mut tree));
        assert_eq!(tree, ResultTree::new());

        sq.update(ids[2], json!("c"));
        assert!(sq.is_complete());
        assert!(sq.push(&mut tree));
        assert_eq!(tree.get(&path()), &[json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn grouped_buckets_follow_membership() {
        let users = ids(2);
        let groups = ids(1);
        let all: Vec<RequestId> = users.iter().chain(&groups).copied().collect();
        let spec = GroupSpec::from([
            ("users".to_string(), users.clone()),
            ("groups".to_string(), groups.clone()),
        ]);
        let mut sq = SubQuery::builder(all, path()).group(spec).build();

        sq.update(users[0], json!("a"));
        sq.update(users[1], json!("b"));
        sq.update(groups[0], json!("c"));

        assert_eq!(sq.results(), vec![json!({"users": ["a", "b"], "groups": ["c"]})]);
    }

    #[test]
    fn seed_extends_tracking() {
        let rest = ids(2);
        let first = RequestId::new();
        let mut sq = SubQuery::builder(rest.clone(), path())
            .seed(first, json!([1, 2, 3]))
            .build();

        assert!(sq.tracks(&first));
        assert_eq!(sq.pending(), 2);
        sq.update(rest[0], json!([4, 5]));
        sq.update(rest[1], json!([]));
        assert!(sq.is_complete());
        assert_eq!(sq.results(), vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
    }

    #[test]
    fn absorbed_subquery_waits_and_pushes_together() {
        let first = ids(1);
        let second = ids(1);
        let mut a = SubQuery::builder(first.clone(), path()).build();
        let b = SubQuery::builder(second.clone(), path()).build();
        a.absorb(b);
        assert!(a.tracks(&second[0]));
        assert_eq!(a.pending(), 2);

        let mut tree = ResultTree::new();
        a.update(first[0], json!([{"id": 10}, {"id": 11}]));
        assert!(!a.push(&mut tree));
        a.update(second[0], json!([{"id": 20}, {"id": 21}]));
        assert!(a.push(&mut tree));
        assert_eq!(
            tree.get(&path()),
            &[json!({"id": 10}), json!({"id": 11}), json!({"id": 20}), json!({"id": 21})]
        );
    }

    #[test]
    fn push_happens_once() {
        let ids = ids(1);
        let mut sq = SubQuery::builder(ids.clone(), path()).build();
        let mut tree = ResultTree::new();
        sq.update(ids[0], json!(1));
        assert!(sq.push(&mut tree));

        tree.set(&path(), vec![json!("later")]);
        assert!(!sq.push(&mut tree));
        assert_eq!(tree.get(&path()), &[json!("later")]);
    }
}

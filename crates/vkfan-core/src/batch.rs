use crate::Ident;

/// Separator used when several identifiers share one request parameter.
pub const ID_SEPARATOR: &str = ", ";

/// How a list of identifiers is split across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdBatch {
    /// Zero or one identifier, left unjoined. Sent with the singular parameter.
    Single(Vec<Ident>),
    /// Joined groups of at most `limit` identifiers each, in input order.
    Multi { groups: Vec<String>, total: usize },
}

impl IdBatch {
    pub fn is_multi(&self) -> bool {
        matches!(self, IdBatch::Multi { .. })
    }

    pub fn total(&self) -> usize {
        match self {
            IdBatch::Single(ids) => ids.len(),
            IdBatch::Multi { total, .. } => *total,
        }
    }

    /// The payload as request values: joined groups, or the lone identifier.
    pub fn payload(&self) -> Vec<String> {
        match self {
            IdBatch::Single(ids) => ids.iter().map(ToString::to_string).collect(),
            IdBatch::Multi { groups, .. } => groups.clone(),
        }
    }
}

/// Split `ids` into API-sized groups. A `None` limit puts every identifier in its own group.
pub fn batch_ids(ids: &[Ident], limit: Option<usize>) -> IdBatch {
    let total = ids.len();
    if total <= 1 {
        return IdBatch::Single(ids.to_vec());
    }

    let max = limit.unwrap_or(1).max(1);
    let groups = ids.chunks(max).map(join_ids).collect();
    IdBatch::Multi { groups, total }
}

fn join_ids(ids: &[Ident]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(ID_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn idents(n: usize) -> Vec<Ident> {
        (1..=n as i64).map(Ident::Id).collect()
    }

    #[test]
    fn empty_and_single_are_not_multi() {
        assert_eq!(batch_ids(&[], Some(10)), IdBatch::Single(vec![]));
        let one = idents(1);
        let batch = batch_ids(&one, Some(10));
        assert!(!batch.is_multi());
        assert_eq!(batch.total(), 1);
        assert_eq!(batch.payload(), vec!["1".to_string()]);
    }

    #[test]
    fn within_limit_is_one_group() {
        let batch = batch_ids(&idents(3), Some(1000));
        assert_eq!(
            batch,
            IdBatch::Multi {
                groups: vec!["1, 2, 3".to_string()],
                total: 3
            }
        );
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_group() {
        let batch = batch_ids(&idents(4), Some(2));
        assert_eq!(batch.payload(), vec!["1, 2".to_string(), "3, 4".to_string()]);
    }

    #[test]
    fn no_limit_splits_one_per_group() {
        let batch = batch_ids(&idents(3), None);
        assert_eq!(batch.payload(), vec!["1", "2", "3"]);
        assert!(batch.is_multi());
    }

    proptest! {
        #[test]
        fn groups_cover_input_in_order(len in 0usize..300, max in 1usize..50) {
            let ids = idents(len);
            let batch = batch_ids(&ids, Some(max));
            prop_assert_eq!(batch.total(), len);

            if len <= 1 {
                prop_assert!(!batch.is_multi());
                prop_assert_eq!(batch, IdBatch::Single(ids));
            } else {
                let groups = batch.payload();
                prop_assert_eq!(groups.len(), len.div_ceil(max));
                let mut rejoined = Vec::new();
                for group in &groups {
                    let parts: Vec<Ident> = group.split(ID_SEPARATOR).map(Ident::from).collect();
                    prop_assert!(parts.len() <= max);
                    rejoined.extend(parts);
                }
                prop_assert_eq!(rejoined, ids);
            }
        }
    }
}

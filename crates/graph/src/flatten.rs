use crate::value::{NestedValue, Scalar};

/// Reduce a response tree to its scalar leaves, depth-first and left-to-right.
///
/// Mapping values are visited in insertion order, sequence elements in index
/// order. The output holds exactly one entry per leaf.
pub fn flatten(value: &NestedValue) -> Vec<Scalar> {
    let mut leaves = Vec::new();
    visit(value, &mut leaves);
    leaves
}

fn visit(value: &NestedValue, leaves: &mut Vec<Scalar>) {
    match value {
        NestedValue::Scalar(scalar) => leaves.push(scalar.clone()),
        NestedValue::Mapping(entries) => {
            for (_, child) in entries {
                visit(child, leaves);
            }
        }
        NestedValue::Sequence(items) => {
            for child in items {
                visit(child, leaves);
            }
        }
    }
}

/// First `min(n, len)` elements in order; nothing when `n <= 0`.
pub fn truncate<T: Clone>(items: &[T], n: i64) -> Vec<T> {
    if n <= 0 {
        return Vec::new();
    }
    let take = usize::try_from(n).unwrap_or(usize::MAX).min(items.len());
    items[..take].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(leaves: &[Scalar]) -> Vec<String> {
        leaves.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flatten_depth_first_order() {
        let tree = NestedValue::from(json!({
            "disease": {
                "name": "melanoma",
                "knownDrugs": {
                    "rows": [
                        {"drug": {"name": "DABRAFENIB", "id": "CHEMBL2028663"}},
                        {"drug": {"name": "TRAMETINIB"}}
                    ],
                    "count": 2
                }
            }
        }));

        assert_eq!(
            strings(&flatten(&tree)),
            vec!["melanoma", "DABRAFENIB", "CHEMBL2028663", "TRAMETINIB", "2"]
        );
    }

    #[test]
    fn test_flatten_counts_every_leaf() {
        let tree = NestedValue::from(json!([[1, [2, [3, null]]], {"a": false, "b": {"c": "x"}}]));
        assert_eq!(flatten(&tree).len(), 6);
    }

    #[test]
    fn test_flatten_empty_containers() {
        assert!(flatten(&NestedValue::from(json!({}))).is_empty());
        assert!(flatten(&NestedValue::from(json!([]))).is_empty());
        assert!(flatten(&NestedValue::from(json!({"a": [], "b": {}}))).is_empty());
    }

    #[test]
    fn test_flatten_already_flat_is_unchanged() {
        let flat = NestedValue::from(json!(["a", 1, true, null]));
        let once = flatten(&flat);
        let again = flatten(&NestedValue::Sequence(
            once.iter().cloned().map(NestedValue::Scalar).collect(),
        ));
        assert_eq!(once, again);
        assert_eq!(strings(&once), vec!["a", "1", "true", "null"]);
    }

    #[test]
    fn test_flatten_bare_scalar() {
        let leaves = flatten(&NestedValue::from(json!("EFO_0000756")));
        assert_eq!(leaves, vec![Scalar::from("EFO_0000756")]);
    }

    #[test]
    fn test_truncate_shorter_than_n() {
        let items = vec![1, 2, 3];
        assert_eq!(truncate(&items, 3), items);
        assert_eq!(truncate(&items, 10), items);
    }

    #[test]
    fn test_truncate_takes_prefix() {
        let items = vec!["a", "b", "c", "d"];
        assert_eq!(truncate(&items, 2), vec!["a", "b"]);
    }

    #[test]
    fn test_truncate_non_positive() {
        let items = vec![1, 2, 3];
        assert!(truncate(&items, 0).is_empty());
        assert!(truncate(&items, -4).is_empty());
    }
}

use crate::{
    config::IndexConfig,
    index::{BuildIndexExt, Index, UniqueIndex},
    key::IndexKey,
    obs::{metrics_report, metrics_reset_all},
};

#[derive(Clone, Debug, Eq, PartialEq)]
struct Named {
    id: u32,
    name: Option<&'static str>,
}

const fn named(id: u32, name: Option<&'static str>) -> Named {
    Named { id, name }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct Sentinel(i32);

impl IndexKey for Sentinel {
    fn is_null(&self) -> bool {
        self.0 < 0
    }
}

//
// Index
//

#[test]
fn groups_values_by_key_in_encounter_order() {
    let index = vec![(1, "a"), (2, "b"), (1, "c")].build_index_with(|pair| pair.0, |pair| pair.1);

    assert_eq!(index.find(&1), ["a", "c"]);
    assert_eq!(index.find(&2), ["b"]);
    assert!(index.find(&3).is_empty());
    assert!(index.contains(&1));
    assert!(!index.contains(&3));
    assert_eq!(index.len(), 2);
    assert_eq!(index.value_count(), 3);
}

#[test]
fn identity_projection_keeps_whole_items() {
    let items = [named(1, Some("one")), named(2, Some("two"))];
    let by_id = items.iter().build_index(|item| item.id);

    assert_eq!(by_id.find(&2), [&items[1]]);
}

#[test]
fn null_keys_collect_in_the_null_bucket() {
    let items = vec![
        named(1, None),
        named(2, Some("two")),
        named(3, None),
    ];
    let by_name = items.build_index(|item| item.name);

    let nulls: Vec<u32> = by_name.find(&None).iter().map(|item| item.id).collect();
    assert_eq!(nulls, [1, 3]);
    assert!(by_name.contains(&None));
    assert_eq!(by_name.len(), 2);
    assert_eq!(by_name.keys().count(), 1);
}

#[test]
fn null_lookup_on_index_without_nulls_is_empty() {
    let by_name = vec![named(1, Some("one"))].build_index(|item| item.name);

    assert!(by_name.find(&None).is_empty());
    assert!(!by_name.contains(&None));
}

#[test]
fn custom_null_keys_share_one_bucket() {
    let index = vec![-1, 4, -7].build_index(|n| Sentinel(*n));

    assert_eq!(index.find(&Sentinel(-100)), [-1, -7]);
    assert_eq!(index.find(&Sentinel(4)), [4]);
}

#[test]
fn iter_reports_null_bucket_as_none() {
    let index = vec![(Some('a'), 1), (None, 2)].build_index_with(|p| p.0, |p| p.1);

    let mut buckets: Vec<_> = index.iter().map(|(k, v)| (k.copied(), v.to_vec())).collect();
    buckets.sort();
    assert_eq!(buckets, [(None, vec![2]), (Some(Some('a')), vec![1])]);
}

#[test]
fn empty_source_builds_empty_index() {
    let index = Vec::<u8>::new().build_index(|n| *n);

    assert!(index.is_empty());
    assert_eq!(index, Index::new());
}

#[test]
fn remove_one_drops_emptied_buckets() {
    let mut index = vec![(1, "a"), (1, "b")].build_index_with(|p| p.0, |p| p.1);

    assert!(index.remove_one(&1, &"a"));
    assert_eq!(index.find(&1), ["b"]);
    assert!(index.remove_one(&1, &"b"));
    assert!(!index.contains(&1));
    assert!(index.is_empty());
    assert!(!index.remove_one(&1, &"b"));
}

#[test]
fn indexer_yields_bucket_or_empty_slice() {
    let index = vec![(1, "a"), (2, "b"), (1, "c")].build_index_with(|p| p.0, |p| p.1);

    assert_eq!(index[&1], ["a", "c"]);
    assert!(index[&9].is_empty());
}

#[test]
fn slot_insert_and_remove_address_one_position() {
    let mut index = vec![(1, "a"), (1, "b")].build_index_with(|p| p.0, |p| p.1);

    index.insert_at(1, 1, "x");
    index.insert_at(1, 99, "z");
    index.insert_at(2, 0, "y");
    assert_eq!(index.find(&1), ["a", "x", "b", "z"]);

    assert_eq!(index.remove_slot(&1, 2), Some("b"));
    assert_eq!(index.remove_slot(&1, 9), None);
    assert_eq!(index.remove_slot(&2, 0), Some("y"));
    assert!(!index.contains(&2));
    assert_eq!(index.find(&1), ["a", "x", "z"]);
}

#[test]
fn clear_empties_every_bucket() {
    let mut index = vec![Some(1), None, Some(2)].build_index(|n| *n);

    index.clear();

    assert!(!index.contains(&Some(1)));
    assert!(!index.contains(&None));
    assert!(index.is_empty());
}

//
// UniqueIndex
//

#[test]
fn unique_index_finds_single_values() {
    let index = vec![(1, "a"), (2, "b")]
        .build_unique_index_with(|p| p.0, |p| p.1)
        .unwrap();

    assert_eq!(index.find(&1), Ok(&"a"));
    assert_eq!(index.try_find(&2), Some(&"b"));
    assert_eq!(index[&2], "b");
    assert_eq!(index.len(), 2);
}

#[test]
fn unique_index_missing_key_fails() {
    let index = vec![1u8].build_unique_index(|n| *n).unwrap();

    let err = index.find(&9).unwrap_err();
    assert!(err.is_key_not_found());
    assert_eq!(index.try_find(&9), None);
    assert!(!index.contains(&9));
}

#[test]
#[should_panic(expected = "key not found")]
fn unique_indexer_panics_on_missing_key() {
    let index = vec![1u8].build_unique_index(|n| *n).unwrap();
    let _ = index[&2];
}

#[test]
fn unique_index_rejects_duplicates_all_or_nothing() {
    let result = vec![(1, "a"), (2, "b"), (1, "c")].build_unique_index_with(|p| p.0, |p| p.1);

    let err = result.unwrap_err();
    assert!(err.is_duplicate_key());
    assert_eq!(err.to_string(), "duplicate key in unique index: 1");
}

#[test]
fn unique_index_stores_one_null_keyed_value() {
    let items = vec![named(1, None), named(2, Some("x"))];
    let by_name = items.build_unique_index(|item| item.name).unwrap();

    assert_eq!(by_name.find(&None).map(|item| item.id), Ok(1));
    assert!(by_name.contains(&None));
    assert_eq!(by_name.iter().filter(|(key, _)| key.is_none()).count(), 1);
}

#[test]
fn unique_index_rejects_second_null_key() {
    let items = vec![named(1, None), named(2, None)];
    let err = items.build_unique_index(|item| item.name).unwrap_err();

    assert_eq!(err.to_string(), "duplicate key in unique index: None");
}

#[test]
fn unique_index_null_lookup_without_null_value_fails() {
    let by_name = vec![named(1, Some("x"))]
        .build_unique_index(|item| item.name)
        .unwrap();

    assert!(by_name.find(&None).unwrap_err().is_key_not_found());
    assert_eq!(by_name.try_find(&None), None);
}

#[test]
fn unique_remove_clears_slot() {
    let mut index = vec![Some(1), None].build_unique_index(|n| *n).unwrap();

    assert_eq!(index.remove(&None), Some(None));
    assert_eq!(index.remove(&Some(1)), Some(Some(1)));
    assert!(index.is_empty());
    assert_eq!(index, UniqueIndex::default());
}

//
// Metrics
//

#[test]
fn builds_record_metrics_unless_disabled() {
    metrics_reset_all();

    let _ = vec![1, 2, 3].build_index(|n| *n);
    let _ = Index::build_with_config(
        vec![4, 5],
        |n| *n,
        |n| n,
        &IndexConfig::new().without_metrics(),
    );
    let _ = vec![1, 1].build_unique_index(|n| *n);

    let report = metrics_report();
    assert_eq!(report.ops.indexes_built, 1);
    assert_eq!(report.ops.rows_scanned, 3);
    assert_eq!(report.index("index").built, 1);
    assert_eq!(report.ops.unique_violations, 1);
}

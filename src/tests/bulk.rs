use crate::resolve::{keep_orig_val, take_new_val};
use crate::{DefaultHashBuilder, HamtMap, TableOption};

#[test]
fn from_list_later_duplicates_win() {
    let map = HamtMap::from_list([("a", 1), ("b", 2), ("a", 3)]);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&"a"), Some(&3));
    map.validate().unwrap();
}

#[test]
fn from_list_empty() {
    let map: HamtMap<u32, u32> = HamtMap::from_list(std::iter::empty());
    assert!(map.is_empty());
    map.validate().unwrap();
}

#[test]
fn from_list_matches_folded_puts() {
    let pairs: Vec<(u32, u32)> = (0..3_000).map(|i| (i, i ^ 0x55)).collect();
    let built = HamtMap::from_list(pairs.iter().copied());
    let folded = pairs.iter().fold(HamtMap::new(), |m, &(k, v)| m.put(k, v));
    assert_eq!(built, folded);
    assert_eq!(built.count(), 3_000);
    built.validate().unwrap();
}

#[test]
fn from_list_with_every_option() {
    for option in [TableOption::Hybrid, TableOption::FixedOnly, TableOption::SparseOnly] {
        let map: HamtMap<u32, u32> =
            HamtMap::from_list_with((0..1_000).map(|i| (i, i)), option, DefaultHashBuilder::default());
        assert_eq!(map.len(), 1_000);
        assert_eq!(map.options(), option);
        map.validate().unwrap();
    }
}

#[test]
fn bulk_insert_resolves_conflicts() {
    let base = HamtMap::from_list((0..10).map(|i| (i, i)));

    let kept = base.bulk_insert((5..15).map(|i| (i, 100 + i)), keep_orig_val);
    assert_eq!(kept.len(), 15);
    assert_eq!(kept.get(&5), Some(&5));
    assert_eq!(kept.get(&12), Some(&112));

    let taken = base.bulk_insert((5..15).map(|i| (i, 100 + i)), take_new_val);
    assert_eq!(taken.get(&5), Some(&105));

    let summed = base.bulk_insert((5..15).map(|i| (i, 1)), |_, old, new| old + new);
    assert_eq!(summed.get(&5), Some(&6));
    assert_eq!(summed.get(&14), Some(&1));

    // Receiver untouched.
    assert_eq!(base.len(), 10);
    assert_eq!(base.get(&5), Some(&5));
    assert_eq!(base.get(&12), None);
    base.validate().unwrap();
    summed.validate().unwrap();
}

#[test]
fn bulk_insert_empty_input_keeps_contents() {
    let base = HamtMap::from_list((0..10).map(|i| (i, i)));
    let same = base.bulk_insert(std::iter::empty(), take_new_val);
    assert_eq!(same, base);
}

#[test]
fn bulk_insert_shares_untouched_subtrees() {
    let base = HamtMap::from_list((0..5_000_u32).map(|i| (i, i)));
    let next = base.bulk_insert([(1_u32, 0_u32)], take_new_val);
    // One leaf changed; every other entry still resolves to the same value.
    assert_eq!(next.get(&1), Some(&0));
    assert_eq!(base.get(&1), Some(&1));
    for i in 2..5_000 {
        assert!(std::ptr::eq(next.get(&i).unwrap(), base.get(&i).unwrap()));
    }
}

#[test]
fn merge_resolves_with_receiver_first() {
    let left = HamtMap::from_list([("a", 1), ("b", 2)]);
    let right = HamtMap::from_list([("b", 20), ("c", 30)]);

    let merged = left.merge(&right, |_, mine, theirs| mine * 100 + theirs);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.get(&"a"), Some(&1));
    assert_eq!(merged.get(&"b"), Some(&220));
    assert_eq!(merged.get(&"c"), Some(&30));
    assert_eq!(left.len(), 2);
    assert_eq!(right.len(), 2);
}

#[test]
fn merge_shortcuts() {
    let map = HamtMap::from_list([(1, 1)]);
    let empty = HamtMap::new();
    assert!(map.merge(&empty, take_new_val).ptr_eq(&map));
    assert_eq!(empty.merge(&map, take_new_val), map);
}

#[test]
fn merge_with_shared_version_resolves_every_key() {
    let map = HamtMap::from_list((0..10).map(|i| (i, 1)));
    let twin = map.clone();
    let rebuilt = HamtMap::from_list((0..10).map(|i| (i, 1)));

    let doubled = map.merge(&twin, |_, mine, theirs| mine + theirs);
    let doubled_rebuilt = map.merge(&rebuilt, |_, mine, theirs| mine + theirs);
    let doubled_self = map.merge(&map, |_, mine, theirs| mine + theirs);

    for i in 0..10 {
        assert_eq!(doubled.get(&i), Some(&2));
        assert_eq!(doubled_self.get(&i), Some(&2));
    }
    assert_eq!(doubled, doubled_rebuilt);
    assert_eq!(doubled.len(), 10);
    assert!(map.values().all(|&v| v == 1));
    assert!(twin.ptr_eq(&map));
    doubled.validate().unwrap();
}

#[test]
fn merge_rehashes_with_receiver_hasher() {
    // Each map draws its own random seed; merge must not reuse the other's hashes.
    let left = HamtMap::from_list((0..500).map(|i| (i, 0)));
    let right = HamtMap::from_list((250..750).map(|i| (i, 1)));
    let merged = left.merge(&right, keep_orig_val);
    assert_eq!(merged.len(), 750);
    for i in 0..750 {
        assert_eq!(merged.get(&i), Some(&usize::from(i >= 500)));
    }
    merged.validate().unwrap();
}

#[test]
fn bulk_delete_reports_missing_in_order() {
    let map = HamtMap::from_list((0..10).map(|i| (i, i)));
    let (next, missing) = map.bulk_delete([3, 42, 5, 17, 3]);
    assert_eq!(missing, [42, 17, 3]);
    assert_eq!(next.len(), 8);
    assert!(!next.contains_key(&3));
    assert!(!next.contains_key(&5));
    assert_eq!(map.len(), 10);
    next.validate().unwrap();
}

#[test]
fn bulk_delete_everything() {
    let map = HamtMap::from_list((0..2_000).map(|i| (i, i)));
    let (next, missing) = map.bulk_delete(0..2_000);
    assert!(missing.is_empty());
    assert!(next.is_empty());
    assert_eq!(next.stats().tables(), 1);
    assert_eq!(map.count(), 2_000);
    next.validate().unwrap();
}

#[test]
fn extend_builds_in_place() {
    let mut map = HamtMap::new();
    map.extend((0..100).map(|i| (i, i)));
    let snapshot = map.clone();
    map.extend((100..200).map(|i| (i, i)));
    assert_eq!(map.len(), 200);
    assert_eq!(snapshot.len(), 100);
    assert_eq!(snapshot.get(&150), None);
    snapshot.validate().unwrap();
    map.validate().unwrap();
}

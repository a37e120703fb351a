use crate::HamtMap;
use crate::resolve::{keep_orig_val, take_new_val};

#[test]
fn empty_map() {
    let map: HamtMap<String, i32> = HamtMap::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.count(), 0);
    assert_eq!(map.iter().next(), None);
}

#[test]
fn put_one() {
    let map = HamtMap::new().put("hello", 42);
    assert_eq!(map.len(), 1);
    assert!(!map.is_empty());
    assert_eq!(map.get(&"hello"), Some(&42));
}

#[test]
fn get_missing_key() {
    let map = HamtMap::new().put("a", 1);
    assert_eq!(map.get(&"b"), None);
    assert_eq!(map.get_key_value(&"b"), None);
}

#[test]
fn get_key_value_returns_stored_key() {
    let map = HamtMap::new().put(String::from("k"), 7);
    let (k, v) = map.get_key_value(&String::from("k")).unwrap();
    assert_eq!(k, "k");
    assert_eq!(*v, 7);
}

#[test]
fn put_multiple() {
    let mut map = HamtMap::new();
    for i in 0..10 {
        map = map.put(i, i * 10);
    }
    assert_eq!(map.len(), 10);
    for i in 0..10 {
        assert_eq!(map.get(&i), Some(&(i * 10)));
    }
}

#[test]
fn store_reports_added() {
    let (map, added) = HamtMap::new().store("k", 1);
    assert!(added);
    let (map, added) = map.store("k", 2);
    assert!(!added);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&"k"), Some(&2));
}

#[test]
fn replace_allocates_new_version() {
    let v1 = HamtMap::new().put("k", 1);
    let v2 = v1.put("k", 1);
    assert!(!v1.ptr_eq(&v2));
    assert_eq!(v1, v2);
}

#[test]
fn contains_key() {
    let map = HamtMap::new().put("a", 1);
    assert!(map.contains_key(&"a"));
    assert!(!map.contains_key(&"b"));
}

#[test]
fn load_or_store_stores_when_absent() {
    let map = HamtMap::new().put("a", 1);
    let (next, value, loaded) = map.load_or_store("b", 2);
    assert!(!loaded);
    assert_eq!(value, 2);
    assert_eq!(next.get(&"b"), Some(&2));
    assert_eq!(map.get(&"b"), None);
}

#[test]
fn remove_existing() {
    let map = HamtMap::new().put("a", 1).put("b", 2);
    let (map, removed) = map.remove(&"a");
    assert_eq!(removed, Some(1));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&"a"), None);
    assert_eq!(map.get(&"b"), Some(&2));
}

#[test]
fn remove_missing_shares_root() {
    let map = HamtMap::new().put("a", 1);
    let (next, removed) = map.remove(&"zzz");
    assert_eq!(removed, None);
    assert!(next.ptr_eq(&map));
    assert!(map.del(&"zzz").ptr_eq(&map));
}

#[test]
fn del_all() {
    let mut map = HamtMap::new();
    for i in 0..100 {
        map = map.put(i, i);
    }
    for i in 0..100 {
        map = map.del(&i);
    }
    assert!(map.is_empty());
    assert_eq!(map.count(), 0);
    assert_eq!(map.stats().tables(), 1);
    map.validate().unwrap();
}

#[test]
fn put_then_del_round_trip() {
    let base = HamtMap::new().put(1, "one");
    let map = base.put(2, "two").del(&2);
    assert_eq!(map.get(&2), None);
    assert_eq!(map, base);
}

#[test]
fn range_stops_early() {
    let map = HamtMap::from_list((0..50).map(|i| (i, i)));
    let mut seen = 0;
    map.range(|_, _| {
        seen += 1;
        seen < 10
    });
    assert_eq!(seen, 10);
}

#[test]
fn range_visits_every_entry() {
    let map = HamtMap::from_list((0..300).map(|i| (i, i * 2)));
    let mut sum = 0;
    map.range(|k, v| {
        assert_eq!(*v, k * 2);
        sum += k;
        true
    });
    assert_eq!(sum, (0..300).sum());
}

#[test]
fn keys_and_values() {
    let map = HamtMap::from_list([("a", 1), ("b", 2), ("c", 3)]);
    let mut keys: Vec<_> = map.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, ["a", "b", "c"]);
    let mut values: Vec<_> = map.values().copied().collect();
    values.sort_unstable();
    assert_eq!(values, [1, 2, 3]);
}

#[test]
fn iter_is_exact_size() {
    let map = HamtMap::from_list((0..77).map(|i| (i, ())));
    let mut iter = map.iter();
    assert_eq!(iter.len(), 77);
    iter.next();
    assert_eq!(iter.len(), 76);
    assert_eq!(iter.count(), 76);
}

#[test]
fn iteration_order_is_stable_per_version() {
    let map = HamtMap::from_list((0..500).map(|i| (i, i)));
    let first: Vec<_> = map.iter().collect();
    let second: Vec<_> = map.iter().collect();
    assert_eq!(first, second);
}

#[test]
fn resolve_policies() {
    assert_eq!(keep_orig_val(&"k", &1, 2), 1);
    assert_eq!(take_new_val(&"k", &1, 2), 2);
}

#[test]
fn options_carried_by_versions() {
    use crate::TableOption;

    let map = HamtMap::with_options(TableOption::SparseOnly).put(1, 1).put(2, 2);
    assert_eq!(map.options(), TableOption::SparseOnly);
    assert_eq!(map.del(&1).options(), TableOption::SparseOnly);
}

use super::{CollidingKey, IdentityState};
use crate::config::{BITS_PER_LEVEL, DEPTH_LIMIT};
use crate::{HamtMap, TableOption};

type CollidingMap<V> = HamtMap<CollidingKey, V, IdentityState>;

fn colliding_map<V>() -> CollidingMap<V> {
    HamtMap::with_hasher(IdentityState::default())
}

/// Two keys with the same 64-bit hash create a collision leaf.
#[test]
fn two_colliding_keys() {
    let k1 = CollidingKey::new(1, 0xDEAD_BEEF);
    let k2 = CollidingKey::new(2, 0xDEAD_BEEF);

    let map = colliding_map().put(k1.clone(), "first").put(k2.clone(), "second");

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&"first"));
    assert_eq!(map.get(&k2), Some(&"second"));
    let stats = map.stats();
    assert_eq!(stats.collision_leaves, 1);
    assert_eq!(stats.collision_entries, 2);
    map.validate().unwrap();
}

/// A key with the same full hash joins the existing leaf where it sits.
#[test]
fn collision_leaf_stays_in_place() {
    let map = colliding_map()
        .put(CollidingKey::new(1, 0xCAFE), 1)
        .put(CollidingKey::new(2, 0xCAFE), 2);
    let stats = map.stats();
    assert_eq!(stats.max_depth, 0);
    assert_eq!(stats.tables(), 1);
    assert_eq!(stats.collision_leaves, 1);
}

/// A third key sharing only the root index pushes the collision leaf down.
#[test]
fn collision_leaf_fans_out() {
    let a = CollidingKey::new(1, 0xCAFE);
    let b = CollidingKey::new(2, 0xCAFE);
    let c = CollidingKey::new(3, 0xCAFE ^ (1 << 40));

    let map = colliding_map().put(a.clone(), 1).put(b.clone(), 2).put(c.clone(), 3);

    assert_eq!(map.get(&a), Some(&1));
    assert_eq!(map.get(&b), Some(&2));
    assert_eq!(map.get(&c), Some(&3));
    let stats = map.stats();
    assert_eq!(stats.collision_leaves, 1);
    assert_eq!(stats.flat_leaves, 1);
    assert!(stats.max_depth > 0);
    map.validate().unwrap();
}

/// Three keys with the same hash.
#[test]
fn three_colliding_keys() {
    let keys: Vec<CollidingKey> = (0..3).map(|i| CollidingKey::new(i, 0xCAFE)).collect();

    let mut map = colliding_map();
    for (i, k) in keys.iter().enumerate() {
        map = map.put(k.clone(), i);
    }

    assert_eq!(map.len(), 3);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(map.get(k), Some(&i));
    }
    assert_eq!(map.stats().collision_entries, 3);
}

/// Remove from collision leaf.
#[test]
fn remove_from_collision() {
    let k1 = CollidingKey::new(1, 0xAAAA);
    let k2 = CollidingKey::new(2, 0xAAAA);
    let k3 = CollidingKey::new(3, 0xAAAA);

    let map = colliding_map().put(k1.clone(), 10).put(k2.clone(), 20).put(k3.clone(), 30);

    let (map, removed) = map.remove(&k2);
    assert_eq!(removed, Some(20));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&10));
    assert_eq!(map.get(&k2), None);
    assert_eq!(map.get(&k3), Some(&30));
    map.validate().unwrap();
}

/// A collision leaf pruned to one pair degrades to a flat leaf.
#[test]
fn collision_degrades_to_flat() {
    let k1 = CollidingKey::new(1, 0xABCD);
    let k2 = CollidingKey::new(2, 0xABCD);

    let map = colliding_map().put(k1.clone(), 1).put(k2.clone(), 2).del(&k1);

    let stats = map.stats();
    assert_eq!(stats.collision_leaves, 0);
    assert_eq!(stats.flat_leaves, 1);
    assert_eq!(map.get(&k2), Some(&2));
    map.validate().unwrap();
}

/// Same hash, absent key: nothing changes.
#[test]
fn remove_absent_colliding_key() {
    let k1 = CollidingKey::new(1, 0x77);
    let k2 = CollidingKey::new(2, 0x77);
    let map = colliding_map().put(k1, 1);

    let (next, removed) = map.remove(&k2);
    assert_eq!(removed, None);
    assert!(next.ptr_eq(&map));
}

/// Overwrite in collision leaf.
#[test]
fn overwrite_in_collision() {
    let k1 = CollidingKey::new(1, 0xBBBB);
    let k2 = CollidingKey::new(2, 0xBBBB);

    let (map, added) = colliding_map()
        .put(k1.clone(), "old")
        .put(k2.clone(), "val2")
        .store(k1.clone(), "new");

    assert!(!added);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&k1), Some(&"new"));
    assert_eq!(map.get(&k2), Some(&"val2"));
}

/// Collision leaf with remove-all returns to empty.
#[test]
fn collision_remove_all() {
    let k1 = CollidingKey::new(1, 0xCCCC);
    let k2 = CollidingKey::new(2, 0xCCCC);

    let map = colliding_map().put(k1.clone(), 1).put(k2.clone(), 2);
    let map = map.del(&k1).del(&k2);

    assert!(map.is_empty());
    assert_eq!(map.stats().tables(), 1);
    map.validate().unwrap();
}

/// Mixed: some keys collide, some don't.
#[test]
fn mixed_collisions_and_normal() {
    let collide_a = CollidingKey::new(1, 0xDDDD);
    let collide_b = CollidingKey::new(2, 0xDDDD);
    let normal = CollidingKey::new(3, 0xEEEE);

    let map = colliding_map()
        .put(collide_a.clone(), "a")
        .put(collide_b.clone(), "b")
        .put(normal.clone(), "c");

    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&collide_a), Some(&"a"));
    assert_eq!(map.get(&collide_b), Some(&"b"));
    assert_eq!(map.get(&normal), Some(&"c"));
    assert_eq!(map.count(), 3);
}

/// Hashes equal in every level but the last separate there.
#[test]
fn split_at_last_level() {
    let last_shift = (DEPTH_LIMIT as u32 - 1) * BITS_PER_LEVEL;
    let a = CollidingKey::new(1, 0x1234);
    let b = CollidingKey::new(2, 0x1234 | (1 << last_shift));

    let map = colliding_map().put(a.clone(), 'a').put(b.clone(), 'b');
    let stats = map.stats();
    assert_eq!(stats.collision_leaves, 0);
    assert_eq!(stats.leaves_by_depth[DEPTH_LIMIT - 1], 2);
    assert_eq!(map.get(&a), Some(&'a'));
    assert_eq!(map.get(&b), Some(&'b'));
    map.validate().unwrap();
}

/// Collision handling is the same under every table policy.
#[test]
fn collisions_under_every_option() {
    for option in [TableOption::Hybrid, TableOption::FixedOnly, TableOption::SparseOnly] {
        let mut map: CollidingMap<u32> = HamtMap::with_options_and_hasher(option, IdentityState::default());
        for id in 0..40 {
            map = map.put(CollidingKey::new(id, u64::from(id % 4)), id);
        }
        assert_eq!(map.len(), 40);
        assert_eq!(map.stats().collision_leaves, 4);
        for id in (0..40).step_by(3) {
            map = map.del(&CollidingKey::new(id, u64::from(id % 4)));
        }
        assert_eq!(map.len(), 26);
        map.validate().unwrap();
    }
}

/// Bulk operations resolve colliding keys individually.
#[test]
fn bulk_insert_into_collision_leaf() {
    let keys: Vec<CollidingKey> = (0..5).map(|i| CollidingKey::new(i, 0x5555)).collect();
    let map = colliding_map().put(keys[0].clone(), 100);

    let map = map.bulk_insert(keys.iter().cloned().map(|k| (k.clone(), k.id)), crate::resolve::keep_orig_val);

    assert_eq!(map.len(), 5);
    assert_eq!(map.get(&keys[0]), Some(&100));
    assert_eq!(map.get(&keys[4]), Some(&4));
    map.validate().unwrap();
}

/// `load_or_store` resolves hits and misses against the leaf in the target slot.
#[test]
fn load_or_store_through_collision_leaf() {
    let map = colliding_map()
        .put(CollidingKey::new(1, 0xCAFE), 1)
        .put(CollidingKey::new(2, 0xCAFE), 2);

    let (same, value, loaded) = map.load_or_store(CollidingKey::new(2, 0xCAFE), 20);
    assert!(loaded);
    assert_eq!(value, 2);
    assert!(same.ptr_eq(&map));

    let (joined, value, loaded) = map.load_or_store(CollidingKey::new(3, 0xCAFE), 3);
    assert!(!loaded);
    assert_eq!(value, 3);
    assert_eq!(joined.len(), 3);
    assert_eq!(joined.stats().collision_entries, 3);
    joined.validate().unwrap();

    // Same root index, different full hash: the leaf is pushed down.
    let other = 0xCAFE ^ (1 << BITS_PER_LEVEL);
    let (split, value, loaded) = map.load_or_store(CollidingKey::new(4, other), 4);
    assert!(!loaded);
    assert_eq!(value, 4);
    assert_eq!(split.len(), 3);
    assert_eq!(split.get(&CollidingKey::new(4, other)), Some(&4));
    assert_eq!(split.get(&CollidingKey::new(1, 0xCAFE)), Some(&1));
    assert_eq!(map.len(), 2);
    split.validate().unwrap();
}

//! Conflict policies for [`bulk_insert`](crate::HamtMap::bulk_insert) and
//! [`merge`](crate::HamtMap::merge).
//!
//! A policy is any `FnMut(&K, &V, V) -> V` called with the key already in
//! the receiver, its current value, and the incoming value. Its result is
//! stored.

/// Keeps the value already in the receiver.
pub fn keep_orig_val<K, V: Clone>(_key: &K, orig: &V, _new: V) -> V {
    orig.clone()
}

/// Replaces the receiver's value with the incoming one.
pub fn take_new_val<K, V>(_key: &K, _orig: &V, new: V) -> V {
    new
}

//! # Container Primitives
//!
//! Small, list-backed containers that every graph and the trie are built on.
//!
//! - [`List`]: singly linked list with O(n) append and O(1) front operations
//! - [`Set`]: insertion-ordered set, duplicates rejected by value equality
//! - [`Map`]: key/value list, new keys are prepended
//!
//! Nothing here hashes. Catalog-sized graphs hold a few thousand nodes at most,
//! and value equality is the only contract the callers rely on.

use std::fmt;

struct Node<T> {
    value: T,
    next: Option<Box<Node<T>>>,
}

/// Singly linked list.
///
/// Iterates in insertion order for values added with [`List::push`].
pub struct List<T> {
    head: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> List<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Appends `value` at the tail. Walks the whole list.
    pub fn push(&mut self, value: T) {
        let mut cursor = &mut self.head;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(Box::new(Node { value, next: None }));
        self.len += 1;
    }

    /// Inserts `value` before the current head.
    pub fn push_front(&mut self, value: T) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { value, next }));
        self.len += 1;
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.head.take().map(|node| {
            self.head = node.next;
            self.len -= 1;
            node.value
        })
    }

    /// Removes and returns the first element matching `predicate`.
    pub fn remove_first<F>(&mut self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = &mut self.head;
        while matches!(cursor, Some(node) if !predicate(&node.value)) {
            if let Some(node) = cursor {
                cursor = &mut node.next;
            }
        }

        let node = cursor.take()?;
        *cursor = node.next;
        self.len -= 1;
        Some(node.value)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.iter_mut().nth(index)
    }

    /// O(1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head.as_deref_mut(),
        }
    }
}

impl<T: PartialEq> List<T> {
    /// Removes the first element equal to `value`.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, value: &T) -> bool {
        self.remove_first(|candidate| candidate == value).is_some()
    }

    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|candidate| candidate == value)
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Box's drop glue would recurse once per node.
impl<T> Drop for List<T> {
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for List<T> {
    /// Builds back to front so collecting stays linear.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let buffered: Vec<T> = iter.into_iter().collect();
        let mut list = Self::new();
        for value in buffered.into_iter().rev() {
            list.push_front(value);
        }
        list
    }
}

pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            &node.value
        })
    }
}

pub struct IterMut<'a, T> {
    next: Option<&'a mut Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.take().map(|node| {
            self.next = node.next.as_deref_mut();
            &mut node.value
        })
    }
}

pub struct IntoIter<T>(List<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Unordered set over a [`List`]. Iteration follows insertion order.
#[derive(Clone, PartialEq, Eq)]
pub struct Set<T> {
    items: List<T>,
}

impl<T: PartialEq> Set<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: List::new() }
    }

    /// Returns `false` when an equal value was already present.
    pub fn add(&mut self, value: T) -> bool {
        if self.items.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    pub fn remove(&mut self, value: &T) -> bool {
        self.items.remove(value)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: PartialEq> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

impl<T> IntoIterator for Set<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[derive(Clone, PartialEq)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Key/value map over a [`List`] of entries.
///
/// `put` on a fresh key prepends, so iteration yields the newest key first.
#[derive(Clone, PartialEq)]
pub struct Map<K, V> {
    entries: List<Entry<K, V>>,
}

impl<K: PartialEq, V> Map<K, V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: List::new(),
        }
    }

    /// Overwrites an existing key in place, otherwise prepends.
    /// Returns the previous value for `key`.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            return Some(std::mem::replace(&mut entry.value, value));
        }
        self.entries.push_front(Entry { key, value });
        None
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key == *key)
            .map(|entry| &mut entry.value)
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries
            .remove_first(|entry| entry.key == *key)
            .map(|entry| entry.value)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|entry| (&entry.key, &entry.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries
            .iter_mut()
            .map(|entry| (&entry.key, &mut entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|entry| &entry.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|entry| &entry.value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|entry| &mut entry.value)
    }
}

impl<K: PartialEq + Clone, V> Map<K, V> {
    /// Derived set of keys, in map iteration order.
    #[must_use]
    pub fn key_set(&self) -> Set<K> {
        self.keys().cloned().collect()
    }
}

impl<K: PartialEq, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|entry| (&entry.key, &entry.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_push_keeps_insertion_order() {
        let mut list = List::new();
        list.push(1);
        list.push(2);
        list.push(3);

        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(list.get(1), Some(&2));
        assert_eq!(list.get(3), None);
    }

    #[test]
    fn test_list_remove_first_match_only() {
        let mut list: List<&str> = ["a", "b", "a", "c"].into_iter().collect();

        assert!(list.remove(&"a"));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert!(!list.remove(&"z"));
        assert_eq!(list.len(), 3);

        assert!(list.remove(&"c"));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_list_front_operations() {
        let mut list = List::new();
        list.push_front(2);
        list.push_front(1);
        list.push(3);

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_front(), Some(2));
        assert_eq!(list.pop_front(), Some(3));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_list_get_mut_and_into_iter() {
        let mut list: List<i32> = (1..=3).collect();
        if let Some(value) = list.get_mut(0) {
            *value = 10;
        }
        assert_eq!(list.into_iter().collect::<Vec<_>>(), vec![10, 2, 3]);
    }

    #[test]
    fn test_long_list_drops_without_overflow() {
        let list: List<u32> = (0..200_000).collect();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }

    #[test]
    fn test_set_rejects_duplicates_by_value() {
        let mut set = Set::new();
        assert!(set.add("x".to_string()));
        assert!(set.add("y".to_string()));
        assert!(!set.add("x".to_string()));

        assert_eq!(set.len(), 2);
        assert!(set.contains(&"y".to_string()));
        assert_eq!(set.iter().cloned().collect::<Vec<_>>(), vec!["x", "y"]);

        assert!(set.remove(&"x".to_string()));
        assert!(!set.remove(&"x".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_map_put_overwrites_and_prepends() {
        let mut map = Map::new();
        assert_eq!(map.put("a", 1), None);
        assert_eq!(map.put("b", 2), None);
        assert_eq!(map.put("a", 3), Some(1));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&"a"), Some(&3));
        // Newest key first.
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_map_remove_and_defaults() {
        let mut map = Map::new();
        map.put(1_u32, "one");
        map.put(2_u32, "two");

        assert_eq!(map.remove(&1), Some("one"));
        assert_eq!(map.remove(&1), None);
        assert!(!map.contains_key(&1));
        assert_eq!(*map.get_or_default(&1, &"none"), "none");
        assert_eq!(*map.get_or_default(&2, &"none"), "two");
    }

    #[test]
    fn test_map_key_set_and_get_mut() {
        let mut map: Map<u32, Vec<u32>> = Map::new();
        map.put(7, Vec::new());
        map.put(8, Vec::new());
        if let Some(values) = map.get_mut(&7) {
            values.push(1);
        }

        let keys = map.key_set();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&7) && keys.contains(&8));
        assert_eq!(map.get(&7), Some(&vec![1]));
    }
}

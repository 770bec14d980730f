use std::fmt;

use super::comparator::{Comparator, NaturalOrder};

/// Map with unique keys kept sorted by `C`.
///
/// Backed by a sorted vector: lookups are binary searches and iteration walks
/// the entries in comparator order.
#[derive(Clone)]
pub struct DeterministicMap<K, V, C = NaturalOrder> {
    entries: Vec<(K, V)>,
    comparator: C,
}

impl<K: Ord, V> DeterministicMap<K, V, NaturalOrder> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K: Ord, V> Default for DeterministicMap<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> DeterministicMap<K, V, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            entries: Vec::new(),
            comparator,
        }
    }

    pub fn from_iter_with<I: IntoIterator<Item = (K, V)>>(comparator: C, iter: I) -> Self {
        let mut map = Self::with_comparator(comparator);
        map.extend(iter);
        map
    }

    fn position(&self, key: &K) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(existing, _)| self.comparator.compare(existing, key))
    }

    /// Inserts or replaces the value for `key`, returning the previous value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Ok(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            Err(index) => {
                self.entries.insert(index, (key, value));
                None
            }
        }
    }

    /// Inserts only if `key` is absent. Hands the pair back otherwise.
    pub fn insert_unique(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        match self.position(&key) {
            Ok(_) => Err((key, value)),
            Err(index) => {
                self.entries.insert(index, (key, value));
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).ok().map(|index| &self.entries[index].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.position(key) {
            Ok(index) => Some(&mut self.entries[index].1),
            Err(_) => None,
        }
    }

    pub fn has(&self, key: &K) -> bool {
        self.position(key).is_ok()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        match self.position(key) {
            Ok(index) => Some(self.entries.remove(index).1),
            Err(_) => None,
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn for_each<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (key, value) in &self.entries {
            f(key, value);
        }
    }
}

pub struct Iter<'a, K, V> {
    inner: std::slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (key, value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a DeterministicMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for DeterministicMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for DeterministicMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for DeterministicMap<K, V, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with(NaturalOrder, iter)
    }
}

// Entries are sorted, so equal contents means equal vectors
impl<K: PartialEq, V: PartialEq, C> PartialEq for DeterministicMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq, C> Eq for DeterministicMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for DeterministicMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}

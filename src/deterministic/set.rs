use std::fmt;

use super::comparator::{Comparator, NaturalOrder};

/// Set of unique elements kept sorted by `C`.
#[derive(Clone)]
pub struct DeterministicSet<T, C = NaturalOrder> {
    elements: Vec<T>,
    comparator: C,
}

impl<T: Ord> DeterministicSet<T, NaturalOrder> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: Ord> Default for DeterministicSet<T, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> DeterministicSet<T, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            elements: Vec::new(),
            comparator,
        }
    }

    pub fn from_iter_with<I: IntoIterator<Item = T>>(comparator: C, iter: I) -> Self {
        let mut set = Self::with_comparator(comparator);
        set.extend(iter);
        set
    }

    fn position(&self, value: &T) -> Result<usize, usize> {
        self.elements
            .binary_search_by(|existing| self.comparator.compare(existing, value))
    }

    /// Returns `false` when the element was already present.
    pub fn add(&mut self, value: T) -> bool {
        match self.position(&value) {
            Ok(_) => false,
            Err(index) => {
                self.elements.insert(index, value);
                true
            }
        }
    }

    pub fn has(&self, value: &T) -> bool {
        self.position(value).is_ok()
    }

    pub fn remove(&mut self, value: &T) -> bool {
        match self.position(value) {
            Ok(index) => {
                self.elements.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn for_each<F: FnMut(&T)>(&self, f: F) {
        self.elements.iter().for_each(f);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }
}

impl<'a, T, C: Comparator<T>> IntoIterator for &'a DeterministicSet<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C> IntoIterator for DeterministicSet<T, C> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<T, C: Comparator<T>> Extend<T> for DeterministicSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for DeterministicSet<T, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_with(NaturalOrder, iter)
    }
}

impl<T: PartialEq, C> PartialEq for DeterministicSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<T: Eq, C> Eq for DeterministicSet<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for DeterministicSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.elements.iter()).finish()
    }
}

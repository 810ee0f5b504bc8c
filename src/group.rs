use smallvec::SmallVec;

use crate::DEFAULT_GROUP_SIZE;

/// A sorted set of identifiers, e.g. all genes encoding a protein
///
/// Each identifier can occur only once in the group and the group is
/// always sorted. Iterating an `IdGroup` is therefore deterministic,
/// which keeps floating point accumulation over the group reproducible.
///
/// Most nodes in the relation graph have only few neighbours, so
/// small groups are stored inline without a heap allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGroup<T> {
    ids: SmallVec<[T; DEFAULT_GROUP_SIZE]>,
}

impl<T> Default for IdGroup<T> {
    fn default() -> Self {
        Self {
            ids: SmallVec::new(),
        }
    }
}

impl<T: Ord> IdGroup<T> {
    /// Constructs a new, empty [`IdGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the group contains no identifiers
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of identifiers in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds a new identifier to the group
    ///
    /// Returns whether the identifier was newly inserted. That is:
    ///
    /// - If the group did not previously contain this identifier, true is returned.
    /// - If the group already contained this identifier, false is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use phenorank::IdGroup;
    ///
    /// let mut group = IdGroup::new();
    /// assert!(group.insert("b"));
    /// assert!(group.insert("a"));
    /// assert!(!group.insert("b"));
    ///
    /// assert_eq!(group.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    /// ```
    pub fn insert(&mut self, id: T) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the identifier
    pub fn contains(&self, id: &T) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Returns the identifiers as a sorted slice
    pub fn as_slice(&self) -> &[T] {
        &self.ids
    }

    /// Returns an iterator of the identifiers in ascending order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.ids.iter()
    }
}

impl<'a, T> IntoIterator for &'a IdGroup<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

impl<T: Ord> FromIterator<T> for IdGroup<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut group = IdGroup::new();
        for id in iter {
            group.insert(id);
        }
        group
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_keeps_order_and_uniqueness() {
        let mut group = IdGroup::new();
        for id in [5u32, 1, 3, 1, 5, 2] {
            group.insert(id);
        }
        assert_eq!(group.len(), 4);
        assert_eq!(group.iter().copied().collect::<Vec<u32>>(), vec![1, 2, 3, 5]);
    }

    #[test]
    fn grows_beyond_inline_capacity() {
        let group: IdGroup<u32> = (0..100).rev().collect();
        assert_eq!(group.len(), 100);
        assert!(group.contains(&0));
        assert!(group.contains(&99));
        assert!(!group.contains(&100));
        assert_eq!(group.iter().next(), Some(&0));
    }

    #[test]
    fn empty_group() {
        let group: IdGroup<String> = IdGroup::default();
        assert!(group.is_empty());
        assert!(group.iter().next().is_none());
    }
}

//! Shared, ordered collections of values.

use std::sync::Arc;

use crate::value::DataValue;

/// An ordered collection of values with reference identity.
///
/// Cloning a `Collection` is cheap and the clone refers to the *same*
/// collection: [`Collection::ptr_eq`] returns `true` for both handles. Two
/// collections built separately are never identical, even when their
/// members compare equal. Template expansion relies on this to tell "the
/// same list referenced twice" from "two different lists".
///
/// # Example
///
/// ```
/// use stencil_data::{Collection, DataValue};
///
/// let items: Collection = vec![1, 2, 3].into_iter().collect();
/// let alias = items.clone();
/// assert!(items.ptr_eq(&alias));
///
/// let other: Collection = vec![1, 2, 3].into_iter().collect();
/// assert!(!items.ptr_eq(&other));
/// assert_eq!(items, other);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Collection(Arc<Vec<DataValue>>);

impl Collection {
    /// Creates a collection from already converted values.
    pub fn new(items: Vec<DataValue>) -> Self {
        Collection(Arc::new(items))
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the collection has no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Member at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.0.get(index)
    }

    /// Iterates members in their original order.
    pub fn iter(&self) -> std::slice::Iter<'_, DataValue> {
        self.0.iter()
    }

    /// Returns `true` if both handles point to the same collection object.
    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl<T: Into<DataValue>> FromIterator<T> for Collection {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Collection::new(iter.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DataValue>> From<Vec<T>> for Collection {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a DataValue;
    type IntoIter = std::slice::Iter<'a, DataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//! Named data sets and the scope chain used during expansion.

use std::collections::BTreeMap;

use crate::value::DataValue;

/// The caller's registry of named data sets.
///
/// Names are case-sensitive and unique; inserting a name twice replaces
/// the earlier value.
///
/// ```
/// use stencil_data::{DataSets, DataValue, MapRecord};
///
/// let data = DataSets::new()
///     .with("P", MapRecord::new().with("Name", "John"))
///     .with("Title", "Report");
///
/// assert_eq!(data.len(), 2);
/// assert_eq!(data.get("Title"), Some(&DataValue::from("Report")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSets {
    sets: BTreeMap<String, DataValue>,
}

impl DataSets {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a data set, returning the registry for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Registers a data set, returning the value it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<DataValue>,
    ) -> Option<DataValue> {
        self.sets.insert(name.into(), value.into())
    }

    /// Looks up a data set by exact name.
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.sets.get(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<DataValue>> FromIterator<(K, V)> for DataSets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut sets = DataSets::new();
        for (name, value) in iter {
            sets.insert(name, value);
        }
        sets
    }
}

/// Innermost-first chain of name bindings.
///
/// The root of every chain is a [`DataSets`] registry. Expanding a
/// collection-bound unit pushes a member binding that shadows the
/// collection's name while that member's copy is rendered; the binding is
/// gone once the child scope is dropped.
///
/// ```
/// use stencil_data::{DataSets, DataValue, Scope};
///
/// let data = DataSets::new().with("L", vec!["A", "B"]);
/// let root = Scope::root(&data);
/// let member = root.push("L", DataValue::from("A"));
///
/// assert_eq!(member.lookup("L"), Some(&DataValue::from("A")));
/// assert!(root.lookup("L").is_some_and(|v| v.is_collection()));
/// ```
#[derive(Debug)]
pub enum Scope<'a> {
    Root(&'a DataSets),
    Member {
        name: &'a str,
        value: DataValue,
        parent: &'a Scope<'a>,
    },
}

impl<'a> Scope<'a> {
    /// Starts a chain at the caller's registry.
    pub fn root(sets: &'a DataSets) -> Self {
        Scope::Root(sets)
    }

    /// Returns a child scope binding `name` to `value`.
    pub fn push(&'a self, name: &'a str, value: DataValue) -> Scope<'a> {
        Scope::Member {
            name,
            value,
            parent: self,
        }
    }

    /// Finds the innermost binding for `name`.
    pub fn lookup(&self, name: &str) -> Option<&DataValue> {
        let mut current = self;
        loop {
            match current {
                Scope::Root(sets) => return sets.get(name),
                Scope::Member {
                    name: bound,
                    value,
                    parent,
                } => {
                    if *bound == name {
                        return Some(value);
                    }
                    current = parent;
                }
            }
        }
    }

    /// Number of member bindings above the root.
    pub fn depth(&self) -> usize {
        match self {
            Scope::Root(_) => 0,
            Scope::Member { parent, .. } => parent.depth() + 1,
        }
    }
}

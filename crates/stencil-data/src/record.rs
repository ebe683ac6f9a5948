//! Property access for record-shaped data.
//!
//! Templates address record properties by name (`{{Person::Name}}`). Instead
//! of inspecting types at runtime, every record type exposes its properties
//! through the [`Record`] trait.

use std::collections::BTreeMap;

use crate::value::DataValue;

/// Trait for values whose properties can be addressed from a template.
///
/// This trait is typically derived using `#[derive(Record)]` from the
/// `stencil-macros` crate, but can also be implemented manually.
///
/// # Derive Usage
///
/// ```ignore
/// use stencil_macros::Record;
///
/// #[derive(Clone, Record)]
/// #[record(rename_all = "PascalCase")]
/// struct Person {
///     name: String,
///     age: u32,
///     #[record(skip)]
///     internal_id: u64,
/// }
/// ```
///
/// # Manual Implementation
///
/// ```
/// use stencil_data::{DataValue, Record};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl Record for Person {
///     fn field(&self, name: &str) -> Option<DataValue> {
///         match name {
///             "Name" => Some(DataValue::from(self.name.as_str())),
///             "Age" => Some(DataValue::from(self.age)),
///             _ => None,
///         }
///     }
/// }
///
/// let person = Person { name: "John".into(), age: 30 };
/// assert_eq!(person.field("Name"), Some(DataValue::from("John")));
/// assert_eq!(person.field("Height"), None);
/// ```
pub trait Record: Send + Sync {
    /// Returns the value of the named property.
    ///
    /// Returns `None` if the property does not exist. A property that exists
    /// but holds nothing should return `Some(DataValue::Null)`.
    fn field(&self, name: &str) -> Option<DataValue>;

    /// Textual form used when the record itself is written where a scalar is
    /// expected. Records without one are written as nothing.
    fn to_text(&self) -> Option<String> {
        None
    }
}

/// A record backed by a map of named values.
///
/// This is the shape JSON objects take after conversion, and a convenient
/// way to build ad-hoc records in code.
///
/// ```
/// use stencil_data::{DataValue, MapRecord, Record};
///
/// let person = MapRecord::new()
///     .with("Name", "John")
///     .with("Age", 30);
///
/// assert_eq!(person.field("Age"), Some(DataValue::from(30)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapRecord {
    fields: BTreeMap<String, DataValue>,
}

impl MapRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, returning the record for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field, returning the previous value under that name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<DataValue>,
    ) -> Option<DataValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Borrowed access to a field.
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.fields.get(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl Record for MapRecord {
    fn field(&self, name: &str) -> Option<DataValue> {
        self.fields.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<DataValue>> FromIterator<(K, V)> for MapRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = MapRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

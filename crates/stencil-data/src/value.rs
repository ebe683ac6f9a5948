//! Runtime values supplied to templates.
//!
//! The [`DataValue`] enum is the closed set of shapes a data set (or any
//! property of one) can take at render time: scalars, records and ordered
//! collections. Template code never inspects Rust types; it only looks at
//! which variant it was handed.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::collection::Collection;
use crate::number::Number;
use crate::record::{MapRecord, Record};

/// Format used for the textual form of date-time values.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// A value that can be bound to a data-set name or returned by a record.
///
/// # Example
///
/// ```
/// use stencil_data::{DataValue, MapRecord};
///
/// let person = DataValue::from(MapRecord::new().with("Name", "John"));
/// assert_eq!(person.path("Name"), Some(DataValue::from("John")));
///
/// let people = DataValue::from(vec![person.clone(), person]);
/// assert_eq!(people.as_collection().map(|c| c.len()), Some(2));
/// ```
#[derive(Clone, Default)]
pub enum DataValue {
    /// Absent or null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// Text value.
    Text(String),
    /// Date and time without a time zone.
    DateTime(NaiveDateTime),
    /// Record with named properties.
    Record(Arc<dyn Record>),
    /// Ordered collection of values.
    List(Collection),
}

impl DataValue {
    /// Wraps any [`Record`] implementation.
    pub fn record(record: impl Record + 'static) -> Self {
        DataValue::Record(Arc::new(record))
    }

    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Returns `true` if this is an ordered collection.
    pub fn is_collection(&self) -> bool {
        matches!(self, DataValue::List(_))
    }

    /// Returns `true` if this is a record.
    pub fn is_record(&self) -> bool {
        matches!(self, DataValue::Record(_))
    }

    /// Extracts the text value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the record, if present.
    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            DataValue::Record(r) => Some(r.as_ref()),
            _ => None,
        }
    }

    /// Extracts the collection, if present.
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            DataValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a single property on a record value.
    pub fn field(&self, name: &str) -> Option<DataValue> {
        self.as_record()?.field(name)
    }

    /// Resolves a dotted property path against this value.
    ///
    /// Supports:
    /// - Simple properties: `Name`
    /// - Nested records: `Address.City`
    /// - Collection indices: `Lines.0` or `Lines.0.Sku`
    pub fn path(&self, path: &str) -> Option<DataValue> {
        let mut current = self.clone();

        for segment in path.split('.') {
            let segment = segment.trim();
            current = match &current {
                DataValue::Record(record) => record.field(segment)?,
                DataValue::List(items) => {
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?.clone()
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Numeric conversion rule used by aggregation.
    ///
    /// Numbers convert as-is, booleans to `1`/`0`, text is parsed after
    /// trimming. Everything else has no numeric value.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(n.to_f64()),
            DataValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            DataValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Truthiness used by conditional markers.
    ///
    /// `true`, non-zero numbers and non-empty text are truthy; every other
    /// value is not.
    pub fn is_truthy(&self) -> bool {
        match self {
            DataValue::Bool(b) => *b,
            DataValue::Number(n) => !n.is_zero(),
            DataValue::Text(s) => !s.is_empty(),
            _ => false,
        }
    }

    /// Textual form written in place of a token.
    ///
    /// Returns `None` for collections and for records that have no textual
    /// form; such tokens are left untouched.
    pub fn to_text(&self) -> Option<String> {
        match self {
            DataValue::Null => Some(String::new()),
            DataValue::Bool(b) => Some(b.to_string()),
            DataValue::Number(n) => Some(n.to_string()),
            DataValue::Text(s) => Some(s.clone()),
            DataValue::DateTime(dt) => Some(dt.format(DATE_TIME_FORMAT).to_string()),
            DataValue::Record(record) => record.to_text(),
            DataValue::List(_) => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "bool",
            DataValue::Number(_) => "number",
            DataValue::Text(_) => "text",
            DataValue::DateTime(_) => "datetime",
            DataValue::Record(_) => "record",
            DataValue::List(_) => "collection",
        }
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DataValue::Null, DataValue::Null) => true,
            (DataValue::Bool(a), DataValue::Bool(b)) => a == b,
            (DataValue::Number(a), DataValue::Number(b)) => a == b,
            (DataValue::Text(a), DataValue::Text(b)) => a == b,
            (DataValue::DateTime(a), DataValue::DateTime(b)) => a == b,
            // Records have no structural equality; identity only.
            (DataValue::Record(a), DataValue::Record(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (DataValue::List(a), DataValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => f.write_str("Null"),
            DataValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            DataValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            DataValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            DataValue::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            // Records are opaque; print their identity.
            DataValue::Record(record) => f
                .debug_tuple("Record")
                .field(&Arc::as_ptr(record).cast::<()>())
                .finish(),
            DataValue::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => write!(f, "[{}]", self.kind()),
        }
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<Number> for DataValue {
    fn from(n: Number) -> Self {
        DataValue::Number(n)
    }
}

macro_rules! data_value_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for DataValue {
                fn from(n: $source) -> Self {
                    DataValue::Number(Number::from(n))
                }
            }
        )*
    };
}

data_value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::Text(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.to_string())
    }
}

impl From<&String> for DataValue {
    fn from(s: &String) -> Self {
        DataValue::Text(s.clone())
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(dt: NaiveDateTime) -> Self {
        DataValue::DateTime(dt)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(date: NaiveDate) -> Self {
        DataValue::DateTime(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<MapRecord> for DataValue {
    fn from(record: MapRecord) -> Self {
        DataValue::Record(Arc::new(record))
    }
}

impl From<Arc<dyn Record>> for DataValue {
    fn from(record: Arc<dyn Record>) -> Self {
        DataValue::Record(record)
    }
}

impl From<Collection> for DataValue {
    fn from(items: Collection) -> Self {
        DataValue::List(items)
    }
}

impl<T: Into<DataValue>> From<Vec<T>> for DataValue {
    fn from(items: Vec<T>) -> Self {
        DataValue::List(Collection::from(items))
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, age: i64) -> DataValue {
        MapRecord::new().with("Name", name).with("Age", age).into()
    }

    #[test]
    fn value_type_checks() {
        assert!(DataValue::Null.is_null());
        assert!(DataValue::from(vec![1]).is_collection());
        assert!(person("A", 1).is_record());
        assert!(!DataValue::from("x").is_record());
    }

    #[test]
    fn value_extractors() {
        assert_eq!(DataValue::from("hello").as_str(), Some("hello"));
        assert_eq!(DataValue::from(42).as_number(), Some(Number::I64(42)));
        assert_eq!(DataValue::from(true).as_bool(), Some(true));
        assert_eq!(DataValue::from("x").as_number(), None);
    }

    #[test]
    fn path_reads_record_fields() {
        assert_eq!(person("John", 30).path("Name"), Some(DataValue::from("John")));
        assert_eq!(person("John", 30).path("Height"), None);
    }

    #[test]
    fn path_walks_nested_records_and_indices() {
        let order: DataValue = MapRecord::new()
            .with("Customer", person("Ann", 40))
            .with("Lines", vec![MapRecord::new().with("Sku", "X-1")])
            .into();

        assert_eq!(order.path("Customer.Name"), Some(DataValue::from("Ann")));
        assert_eq!(order.path("Lines.0.Sku"), Some(DataValue::from("X-1")));
        assert_eq!(order.path("Lines.1.Sku"), None);
        assert_eq!(order.path("Lines.first"), None);
    }

    #[test]
    fn path_on_scalar_is_none() {
        assert_eq!(DataValue::from(3).path("Anything"), None);
    }

    #[test]
    fn numeric_conversion_rule() {
        assert_eq!(DataValue::from(2).to_number(), Some(2.0));
        assert_eq!(DataValue::from(true).to_number(), Some(1.0));
        assert_eq!(DataValue::from(" 2.5 ").to_number(), Some(2.5));
        assert_eq!(DataValue::from("abc").to_number(), None);
        assert_eq!(DataValue::Null.to_number(), None);
        assert_eq!(person("A", 1).to_number(), None);
    }

    #[test]
    fn truthiness() {
        assert!(DataValue::from(true).is_truthy());
        assert!(!DataValue::from(false).is_truthy());
        assert!(DataValue::from(3).is_truthy());
        assert!(!DataValue::from(0).is_truthy());
        assert!(!DataValue::from(0.0).is_truthy());
        assert!(DataValue::from("x").is_truthy());
        assert!(!DataValue::from("").is_truthy());
        assert!(!DataValue::Null.is_truthy());
        assert!(!person("A", 1).is_truthy());
        assert!(!DataValue::from(vec![1]).is_truthy());
    }

    #[test]
    fn textual_forms() {
        assert_eq!(DataValue::Null.to_text().as_deref(), Some(""));
        assert_eq!(DataValue::from(30).to_text().as_deref(), Some("30"));
        assert_eq!(DataValue::from(2.0).to_text().as_deref(), Some("2"));
        assert_eq!(DataValue::from(false).to_text().as_deref(), Some("false"));
        assert_eq!(DataValue::from(vec![1]).to_text(), None);
        assert_eq!(person("A", 1).to_text(), None);

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).map(DataValue::from);
        assert_eq!(
            date.and_then(|d| d.to_text()).as_deref(),
            Some("2024-03-05T00:00:00.000")
        );
    }

    #[test]
    fn record_equality_is_identity() {
        let a = person("A", 1);
        let b = person("A", 1);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn option_conversion() {
        assert_eq!(DataValue::from(None::<i32>), DataValue::Null);
        assert_eq!(DataValue::from(Some("x")), DataValue::from("x"));
    }

    #[test]
    fn debug_prints_records_opaquely() {
        assert_eq!(format!("{:?}", DataValue::from("a")), "Text(\"a\")");
        assert!(format!("{:?}", person("A", 1)).starts_with("Record(0x"));
        assert_eq!(format!("{:?}", DataValue::Null), "Null");
    }

    #[test]
    fn display_uses_textual_form_or_kind() {
        assert_eq!(DataValue::from("a").to_string(), "a");
        assert_eq!(DataValue::from(vec![1]).to_string(), "[collection]");
    }
}

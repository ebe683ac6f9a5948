//! Conversion from `serde` data.
//!
//! Any `Serialize` value can become a [`DataValue`] by going through
//! `serde_json::Value`: objects become [`MapRecord`]s, arrays become
//! [`Collection`]s.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::collection::Collection;
use crate::number::Number;
use crate::record::MapRecord;
use crate::scope::DataSets;
use crate::value::DataValue;

impl From<JsonValue> for DataValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    DataValue::Number(Number::U64(u))
                } else {
                    DataValue::Number(Number::F64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            JsonValue::String(s) => DataValue::Text(s),
            JsonValue::Array(items) => {
                DataValue::List(Collection::new(items.into_iter().map(Into::into).collect()))
            }
            JsonValue::Object(map) => map.into_iter().collect::<MapRecord>().into(),
        }
    }
}

impl DataValue {
    /// Converts any serializable value.
    ///
    /// ```
    /// use serde::Serialize;
    /// use stencil_data::DataValue;
    ///
    /// #[derive(Serialize)]
    /// struct Person { name: String, age: u32 }
    ///
    /// let value = DataValue::from_serialize(&Person { name: "John".into(), age: 30 }).unwrap();
    /// assert_eq!(value.path("age"), Some(DataValue::from(30)));
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(DataValue::from)
    }
}

impl DataSets {
    /// Builds a registry from a JSON object, one data set per key.
    ///
    /// Returns an error if `value` does not serialize to an object.
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            JsonValue::Object(map) => Ok(map.into_iter().collect()),
            other => Err(serde::de::Error::custom(format!(
                "data sets must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

//! Data model for stencil templates.
//!
//! Templates never see Rust types directly. Everything bound to a template
//! is a [`DataValue`]: scalars, [`Record`]s whose properties are looked up
//! by name, and ordered [`Collection`]s whose members drive row and element
//! expansion.
//!
//! # Building data sets
//!
//! ```
//! use stencil_data::{DataSets, DataValue, MapRecord};
//!
//! let data = DataSets::new()
//!     .with("P", MapRecord::new().with("Name", "John").with("Age", 30))
//!     .with("L", vec![
//!         MapRecord::new().with("Name", "A"),
//!         MapRecord::new().with("Name", "B"),
//!     ]);
//!
//! assert_eq!(data.get("P").and_then(|p| p.path("Age")), Some(DataValue::from(30)));
//! ```
//!
//! Records can also come from any `serde::Serialize` value via
//! [`DataValue::from_serialize`], or from a struct deriving `Record` with
//! the `stencil-macros` crate.

mod collection;
mod json;
mod number;
mod record;
mod scope;
mod value;

pub use collection::Collection;
pub use number::Number;
pub use record::{MapRecord, Record};
pub use scope::{DataSets, Scope};
pub use value::{DataValue, DATE_TIME_FORMAT};

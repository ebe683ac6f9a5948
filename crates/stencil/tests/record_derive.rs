//! Tests for `#[derive(Record)]` as seen from user code.

use stencil::{DataValue, Record};

#[derive(Clone, Record)]
struct Plain {
    name: String,
    r#type: String,
    score: Option<f64>,
}

#[derive(Clone, Record)]
#[record(rename_all = "camelCase")]
struct Customer {
    first_name: String,
    #[record(rename = "Years")]
    age: u32,
    #[record(skip)]
    #[allow(dead_code)]
    password: String,
    address: Address,
}

#[derive(Clone, Record)]
#[record(rename_all = "PascalCase")]
struct Address {
    city: String,
}

fn customer() -> Customer {
    Customer {
        first_name: "Ada".into(),
        age: 36,
        password: "hunter2".into(),
        address: Address {
            city: "London".into(),
        },
    }
}

#[test]
fn field_names_default_to_rust_names() {
    let plain = Plain {
        name: "x".into(),
        r#type: "kind".into(),
        score: None,
    };
    assert_eq!(plain.field("name"), Some(DataValue::from("x")));
    assert_eq!(plain.field("type"), Some(DataValue::from("kind")));
    assert_eq!(plain.field("score"), Some(DataValue::Null));
    assert_eq!(plain.field("Name"), None);
}

#[test]
fn rename_all_rename_and_skip() {
    let c = customer();
    assert_eq!(c.field("firstName"), Some(DataValue::from("Ada")));
    assert_eq!(c.field("Years"), Some(DataValue::from(36u32)));
    assert_eq!(c.field("age"), None);
    assert_eq!(c.field("password"), None);
}

#[test]
fn nested_records_resolve_by_path() {
    let value = DataValue::from(customer());
    assert!(value.is_record());
    assert_eq!(value.path("address.City"), Some(DataValue::from("London")));
}

#[test]
fn records_have_no_text_by_default() {
    assert_eq!(customer().to_text(), None);
}

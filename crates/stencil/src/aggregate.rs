//! Sum, Average and Count over collections.

use stencil_data::{Collection, DataValue, Number};

use crate::config::AggregationPolicy;
use crate::error::AggregateError;
use crate::token::Aggregation;

/// Evaluates an aggregation over a collection.
///
/// Returns `Ok(None)` when there is no collection or no aggregation.
/// `Count` is the number of members regardless of `property`. `Sum` and
/// `Average` project `property` from each member (the member itself when
/// `property` is `None`) and convert it with [`DataValue::to_number`].
///
/// Members without a numeric value are skipped or rejected depending on
/// `policy`. An `Average` over no numeric members is `None`. A `Sum` stays
/// an integer while every summed member is an integer number.
///
/// ```
/// use stencil::{aggregate, Aggregation, AggregationPolicy};
/// use stencil_data::{Collection, Number};
///
/// let values: Collection = vec![1, 2, 3].into();
/// let total = aggregate(Some(&values), None, Some(Aggregation::Sum), AggregationPolicy::default());
/// assert_eq!(total, Ok(Some(Number::I64(6))));
/// ```
pub fn aggregate(
    collection: Option<&Collection>,
    property: Option<&str>,
    kind: Option<Aggregation>,
    policy: AggregationPolicy,
) -> Result<Option<Number>, AggregateError> {
    let (Some(collection), Some(kind)) = (collection, kind) else {
        return Ok(None);
    };

    if kind == Aggregation::Count {
        return Ok(Some(Number::from(collection.len())));
    }

    let mut sum = 0.0;
    let mut int_sum = Some(0i64);
    let mut count = 0usize;
    for (index, member) in collection.iter().enumerate() {
        let value = project(member, property);
        match value.as_ref().and_then(DataValue::to_number) {
            Some(n) => {
                sum += n;
                count += 1;
                let integer = value
                    .as_ref()
                    .and_then(DataValue::as_number)
                    .and_then(Number::as_i64);
                int_sum = int_sum.zip(integer).and_then(|(a, b)| a.checked_add(b));
            }
            None if policy == AggregationPolicy::Strict => {
                return Err(AggregateError::NonNumeric {
                    index,
                    property: property.map(str::to_string),
                });
            }
            None => {}
        }
    }

    Ok(match kind {
        Aggregation::Sum => Some(int_sum.map_or(Number::F64(sum), Number::I64)),
        Aggregation::Average if count == 0 => None,
        Aggregation::Average => Some(Number::F64(sum / count as f64)),
        Aggregation::Count => None,
    })
}

fn project(member: &DataValue, property: Option<&str>) -> Option<DataValue> {
    match property {
        Some(path) => member.path(path),
        None => Some(member.clone()),
    }
}

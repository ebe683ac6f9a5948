//! Resolving field references against a scope chain.

use stencil_data::{Collection, DataValue, Number, Scope};
use tracing::trace;

use crate::aggregate::aggregate;
use crate::config::AggregationPolicy;
use crate::error::AggregateError;
use crate::token::FieldReference;

/// Why a reference produced nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Miss {
    /// No data set with that name is in scope.
    UnknownDataset,
    /// The data set exists but the property path does not.
    MissingProperty,
}

impl Miss {
    pub fn describe(self) -> &'static str {
        match self {
            Miss::UnknownDataset => "unknown data set",
            Miss::MissingProperty => "missing property",
        }
    }
}

/// A token that resolved to nothing, reported by dry runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMiss {
    /// Where the token sits: `Sheet!B3` or an element path.
    pub location: String,
    /// The token text, delimiters included.
    pub token: String,
    pub reason: Miss,
}

/// Outcome of resolving one reference.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    /// A value to substitute.
    Value(DataValue),
    /// A collection; the enclosing unit is expanded once per member.
    Collection(Collection),
    /// Result of an aggregation tag.
    Aggregate(Option<Number>),
    /// Nothing to substitute.
    Miss(Miss),
}

impl Lookup {
    /// Textual form for substitution into markup, if any.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Lookup::Value(value) => value.to_text(),
            Lookup::Aggregate(Some(n)) => Some(n.to_string()),
            Lookup::Aggregate(None) => Some(String::new()),
            Lookup::Collection(_) | Lookup::Miss(_) => None,
        }
    }
}

/// Resolves `reference` under `scope`.
///
/// The data-set name is looked up innermost-first. With an aggregation tag
/// the data set is aggregated when it is a collection. A collection-valued
/// data set is returned as is, whether or not a property is named; the
/// property is resolved per member once the member is in scope. Otherwise
/// the property path is resolved on the runtime value.
///
/// Inside a member scope the aggregated name is the member, not the
/// collection, so `{{L::Qty::Sum}}` in an `L`-bound unit yields an empty
/// aggregate rather than a miss.
///
/// Only strict aggregation can fail.
pub fn resolve(
    reference: &FieldReference,
    scope: &Scope<'_>,
    policy: AggregationPolicy,
) -> Result<Lookup, AggregateError> {
    let name = reference.dataset_name();
    let Some(value) = scope.lookup(name) else {
        trace!(dataset = name, "data set not in scope");
        return Ok(Lookup::Miss(Miss::UnknownDataset));
    };

    if let Some(kind) = reference.aggregation() {
        let result = aggregate(
            value.as_collection(),
            reference.property_path(),
            Some(kind),
            policy,
        )?;
        trace!(dataset = name, aggregation = kind.as_tag(), ?result, "aggregated");
        return Ok(Lookup::Aggregate(result));
    }

    if let DataValue::List(items) = value {
        return Ok(Lookup::Collection(items.clone()));
    }

    let resolved = match reference.property_path() {
        None => Some(value.clone()),
        Some(path) => value.path(path),
    };

    Ok(match resolved {
        Some(DataValue::List(items)) => Lookup::Collection(items),
        Some(value) => Lookup::Value(value),
        None => {
            trace!(
                dataset = name,
                property = reference.property_path(),
                "property not found"
            );
            Lookup::Miss(Miss::MissingProperty)
        }
    })
}

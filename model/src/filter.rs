//! Comparison filters on scalar fields.
//!
//! A [`Filter`] is the Rust form of the filter input objects in the GraphQL API: a set of optional
//! comparison operators plus a nested, negated filter of the same type. Each operator is
//! tri-state; it can be absent, explicitly `null`, or carry a value, and the three are not
//! interchangeable (`equals: null` matches null values, an absent `equals` matches everything).
//!
//! Field types resolve a [`Filter`] into a [`FieldCondition`], which is what the storage layer
//! evaluates against stored values.

use super::value::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;

/// A filter on a scalar field with values of type `T`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(deserialize = "T: Deserialize<'de>", serialize = "T: Serialize")
)]
pub struct Filter<T> {
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub equals: Option<Option<T>>,
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub r#in: Option<Option<Vec<T>>>,
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub not_in: Option<Option<Vec<T>>>,
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub lt: Option<Option<T>>,
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub lte: Option<Option<T>>,
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub gt: Option<Option<T>>,
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub gte: Option<Option<T>>,
    #[serde(default, deserialize_with = "tri_state", skip_serializing_if = "Option::is_none")]
    pub not: Option<Option<Box<Filter<T>>>>,
}

// Not derived, since the derive would require `T: Default`.
impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            r#in: None,
            not_in: None,
            lt: None,
            lte: None,
            gt: None,
            gte: None,
            not: None,
        }
    }
}

/// Distinguish an explicit `null` (`Some(None)`) from a missing key (`None`).
fn tri_state<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply `f` to the value inside a tri-state entry, leaving absent and null entries untouched.
fn map_entry<T, U, E>(
    entry: Option<Option<T>>,
    f: impl FnOnce(T) -> Result<U, E>,
) -> Result<Option<Option<U>>, E> {
    match entry {
        Some(Some(value)) => f(value).map(|value| Some(Some(value))),
        Some(None) => Ok(Some(None)),
        None => Ok(None),
    }
}

/// The comparison operators of a [`Filter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Comparison {
    fn test(self, ord: Ordering) -> bool {
        match self {
            Self::Lt => ord.is_lt(),
            Self::Lte => ord.is_le(),
            Self::Gt => ord.is_gt(),
            Self::Gte => ord.is_ge(),
        }
    }
}

impl<T> Filter<T> {
    /// A filter matching values equal to `value`.
    pub fn equals(value: impl Into<T>) -> Self {
        Self {
            equals: Some(Some(value.into())),
            ..Default::default()
        }
    }

    /// Transform every value in the filter, including values in lists and nested filters.
    ///
    /// Explicit nulls are preserved as-is at every level of nesting.
    pub fn try_map<U, E>(self, f: &impl Fn(T) -> Result<U, E>) -> Result<Filter<U>, E> {
        let list = |values: Vec<T>| values.into_iter().map(f).collect::<Result<Vec<_>, _>>();
        Ok(Filter {
            equals: map_entry(self.equals, f)?,
            r#in: map_entry(self.r#in, list)?,
            not_in: map_entry(self.not_in, list)?,
            lt: map_entry(self.lt, f)?,
            lte: map_entry(self.lte, f)?,
            gt: map_entry(self.gt, f)?,
            gte: map_entry(self.gte, f)?,
            not: map_entry(self.not, |nested| (*nested).try_map(f).map(Box::new))?,
        })
    }

    /// Split the filter into one filter per present operator, in declaration order.
    fn into_entries(self) -> Vec<FilterEntry<T>> {
        let mut entries = vec![];
        if let Some(value) = self.equals {
            entries.push(FilterEntry::Op(Filter {
                equals: Some(value),
                ..Default::default()
            }));
        }
        if let Some(values) = self.r#in {
            entries.push(FilterEntry::Op(Filter {
                r#in: Some(values),
                ..Default::default()
            }));
        }
        if let Some(values) = self.not_in {
            entries.push(FilterEntry::Op(Filter {
                not_in: Some(values),
                ..Default::default()
            }));
        }
        for (op, value) in [
            (Comparison::Lt, self.lt),
            (Comparison::Lte, self.lte),
            (Comparison::Gt, self.gt),
            (Comparison::Gte, self.gte),
        ] {
            if let Some(value) = value {
                let mut filter = Filter::default();
                *filter.comparison_mut(op) = Some(value);
                entries.push(FilterEntry::Op(filter));
            }
        }
        match self.not {
            Some(Some(nested)) => entries.push(FilterEntry::Not(*nested)),
            Some(None) => entries.push(FilterEntry::Op(Filter {
                not: Some(None),
                ..Default::default()
            })),
            None => {}
        }
        entries
    }

    fn comparison_mut(&mut self, op: Comparison) -> &mut Option<Option<T>> {
        match op {
            Comparison::Lt => &mut self.lt,
            Comparison::Lte => &mut self.lte,
            Comparison::Gt => &mut self.gt,
            Comparison::Gte => &mut self.gte,
        }
    }
}

enum FilterEntry<T> {
    Op(Filter<T>),
    Not(Filter<T>),
}

impl Filter<Value> {
    /// Test a stored value against this filter, with ORM semantics.
    ///
    /// Every present operator must match. A `null` operand for `in`, `notIn` or a comparison
    /// places no constraint. `not` applied to a nested filter never matches a null value; use a
    /// [`FieldCondition::Not`] to negate a filter in a way which lets null values through.
    pub fn matches(&self, value: &Value) -> bool {
        if let Some(expected) = &self.equals {
            let matched = match expected {
                Some(expected) => !value.is_null() && value == expected,
                None => value.is_null(),
            };
            if !matched {
                return false;
            }
        }
        if let Some(Some(values)) = &self.r#in {
            if value.is_null() || !values.contains(value) {
                return false;
            }
        }
        if let Some(Some(values)) = &self.not_in {
            if value.is_null() || values.contains(value) {
                return false;
            }
        }
        for (op, operand) in [
            (Comparison::Lt, &self.lt),
            (Comparison::Lte, &self.lte),
            (Comparison::Gt, &self.gt),
            (Comparison::Gte, &self.gte),
        ] {
            if let Some(Some(operand)) = operand {
                match value.compare(operand) {
                    Some(ord) if op.test(ord) => {}
                    _ => return false,
                }
            }
        }
        match &self.not {
            Some(Some(nested)) => !value.is_null() && !nested.matches(value),
            Some(None) => !value.is_null(),
            None => true,
        }
    }
}

/// A resolved condition on a single field, ready to be evaluated by the storage layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldCondition {
    /// A filter handed to the storage layer as-is.
    Filter(Filter<Value>),
    /// Satisfied if every condition is satisfied.
    And(Vec<FieldCondition>),
    /// Satisfied if the condition is not satisfied, including for null values.
    Not(Box<FieldCondition>),
}

impl FieldCondition {
    /// Satisfied only by null values.
    pub fn is_null() -> Self {
        Self::Filter(Filter {
            equals: Some(None),
            ..Default::default()
        })
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Filter(filter) => filter.matches(value),
            Self::And(conditions) => conditions.iter().all(|cond| cond.matches(value)),
            Self::Not(cond) => !cond.matches(value),
        }
    }
}

impl From<Filter<Value>> for FieldCondition {
    fn from(filter: Filter<Value>) -> Self {
        Self::Filter(filter)
    }
}

/// Resolve a filter on a nullable field.
///
/// Each operator becomes its own condition in a conjunction, and a nested `not` filter becomes an
/// explicit negation of the resolved nested filter. Unlike the storage layer's own `not`, the
/// negation matches null values, so `{ not: { equals: "2000-01-01" } }` selects items with no
/// date as well.
pub fn resolve_common(filter: Filter<Value>) -> FieldCondition {
    FieldCondition::And(
        filter
            .into_entries()
            .into_iter()
            .map(|entry| match entry {
                FilterEntry::Op(op) => FieldCondition::Filter(op),
                FilterEntry::Not(nested) => FieldCondition::Not(Box::new(resolve_common(nested))),
            })
            .collect(),
    )
}

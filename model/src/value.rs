//! Values flowing between the GraphQL API, field resolvers and storage.

use async_graphql::{Number, Value as ConstValue};
use chrono::{DateTime, Utc};
use derive_more::From;
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::cmp::Ordering;

/// Error converting a GraphQL value into a [`Value`].
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
#[snafu(display("unsupported input value {value}"))]
pub struct UnsupportedValue {
    value: String,
}

/// A scalar value as seen by field resolvers and the storage layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, From, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The absence of a value.
    #[default]
    #[from(ignore)]
    Null,
    /// An integer, used for item IDs.
    Int(i64),
    /// A text string.
    String(String),
    /// An instant in time.
    DateTime(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Compare two values of the same kind.
    ///
    /// Values of different kinds, and nulls, are incomparable.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(l), Self::Int(r)) => Some(l.cmp(r)),
            (Self::String(l), Self::String(r)) => Some(l.cmp(r)),
            (Self::DateTime(l), Self::DateTime(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    /// Convert a GraphQL input value.
    pub fn from_graphql(value: ConstValue) -> Result<Self, UnsupportedValue> {
        match value {
            ConstValue::Null => Ok(Self::Null),
            ConstValue::String(s) => Ok(Self::String(s)),
            ConstValue::Number(n) => n.as_i64().map(Self::Int).ok_or_else(|| UnsupportedValue {
                value: n.to_string(),
            }),
            other => Err(UnsupportedValue {
                value: other.to_string(),
            }),
        }
    }

    /// Convert into a GraphQL output value.
    pub fn into_graphql(self) -> ConstValue {
        match self {
            Self::Null => ConstValue::Null,
            Self::Int(i) => ConstValue::Number(Number::from(i)),
            Self::String(s) => ConstValue::String(s),
            Self::DateTime(t) => ConstValue::String(t.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

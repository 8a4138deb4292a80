//! Named GraphQL types contributed by field types.
//!
//! Field types describe the types they need as plain data. The schema compiler registers each
//! distinct name once, and rejects two different definitions under the same name.

use crate::date::PlainDate;
use async_graphql::{
    dynamic::{Enum, InputObject, InputValue, Scalar, Type, TypeRef},
    Value as ConstValue,
};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The values a custom scalar accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarFormat {
    /// A `YYYY-MM-DD` string.
    PlainDate,
}

impl ScalarFormat {
    pub fn accepts(self, value: &ConstValue) -> bool {
        match self {
            Self::PlainDate => {
                matches!(value, ConstValue::String(s) if s.parse::<PlainDate>().is_ok())
            }
        }
    }
}

/// A custom scalar type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarDef {
    pub name: String,
    pub description: String,
    pub format: ScalarFormat,
}

/// An input object type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputObjectDef {
    pub name: String,
    pub fields: Vec<(String, TypeRef)>,
}

/// An enum type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub items: Vec<String>,
}

/// A named GraphQL type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamedType {
    Scalar(ScalarDef),
    InputObject(InputObjectDef),
    Enum(EnumDef),
}

impl NamedType {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(def) => &def.name,
            Self::InputObject(def) => &def.name,
            Self::Enum(def) => &def.name,
        }
    }

    /// Build the type for registration in a dynamic schema.
    pub fn build(&self) -> Type {
        match self {
            Self::Scalar(def) => {
                let format = def.format;
                Scalar::new(&def.name)
                    .description(&def.description)
                    .validator(move |value| format.accepts(value))
                    .into()
            }
            Self::InputObject(def) => def
                .fields
                .iter()
                .fold(InputObject::new(&def.name), |obj, (name, ty)| {
                    obj.field(InputValue::new(name, ty.clone()))
                })
                .into(),
            Self::Enum(def) => def
                .items
                .iter()
                .fold(Enum::new(&def.name), |e, item| e.item(item.as_str()))
                .into(),
        }
    }
}

/// Name of the calendar date scalar.
pub const PLAIN_DATE: &str = "PlainDate";

/// Name of the enum used for ordering arguments.
pub const ORDER_DIRECTION: &str = "OrderDirection";

/// The calendar date scalar.
pub fn plain_date_scalar() -> NamedType {
    NamedType::Scalar(ScalarDef {
        name: PLAIN_DATE.into(),
        description: "A date without a time of day, as a full-date ISO8601 string such as 1970-01-01"
            .into(),
        format: ScalarFormat::PlainDate,
    })
}

/// Name of the filter type for item ids.
pub const ID_FILTER: &str = "IDFilter";

/// The filter type for item ids.
pub fn id_filter() -> NamedType {
    let id = || TypeRef::named(TypeRef::ID);
    let ids = || TypeRef::named_nn_list(TypeRef::ID);
    NamedType::InputObject(InputObjectDef {
        name: ID_FILTER.into(),
        fields: vec![
            ("equals".into(), id()),
            ("in".into(), ids()),
            ("notIn".into(), ids()),
            ("lt".into(), id()),
            ("lte".into(), id()),
            ("gt".into(), id()),
            ("gte".into(), id()),
            ("not".into(), TypeRef::named(ID_FILTER)),
        ],
    })
}

/// The direction of an ordering argument.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// The enum type of ordering arguments.
pub fn order_direction_enum() -> NamedType {
    NamedType::Enum(EnumDef {
        name: ORDER_DIRECTION.into(),
        items: OrderDirection::iter().map(|dir| dir.to_string()).collect(),
    })
}

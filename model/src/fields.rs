//! Field types and the descriptors they hand to the schema compiler.
//!
//! A field type is a function from user configuration to a [`FieldTypeFunc`]. The schema compiler
//! calls that function once per schema build with the [`FieldMeta`] of the field's position in
//! the application, and gets back a [`FieldDescriptor`]: how the field is stored, which GraphQL
//! arguments it contributes to each operation, how those arguments are resolved into stored
//! values, and how stored values are resolved back into GraphQL output.

use super::{
    error::ConfigError,
    filter::{FieldCondition, Filter},
    hooks::FieldHooks,
    provider::DatabaseProvider,
    schema::types::NamedType,
    value::Value,
};
use anyhow::Error;
use async_graphql::dynamic::TypeRef;
use convert_case::{Case, Casing};
use std::sync::Arc;
use strum::Display;

pub mod non_null;
pub mod plain_date;

pub use plain_date::{plain_date, PlainDateFieldConfig};

/// Where a field lives in the application.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldMeta {
    /// The key of the list (or singleton) owning the field.
    pub list_key: String,
    /// The key of the field within its list.
    pub field_key: String,
    /// The database engine the application is deployed against.
    pub provider: DatabaseProvider,
}

/// Whether a stored field admits null values.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum FieldMode {
    Required,
    Optional,
}

/// The shape of a field in storage.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum DbFieldKind {
    /// A single column holding a scalar.
    Scalar,
}

/// The scalar type of a column.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int,
    String,
    DateTime,
}

/// The kind of database index on a column.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum IndexKind {
    Index,
    Unique,
}

/// User configuration of the index on a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IsIndexed {
    #[default]
    No,
    Index,
    Unique,
}

impl IsIndexed {
    pub fn index_kind(self) -> Option<IndexKind> {
        match self {
            Self::No => None,
            Self::Index => Some(IndexKind::Index),
            Self::Unique => Some(IndexKind::Unique),
        }
    }
}

/// A default value applied by the database itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DbDefault {
    Literal(Value),
    Autoincrement,
}

/// A database-specific column type refining the [`ScalarType`].
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum NativeType {
    Date,
}

/// How a field is stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DbField {
    pub kind: DbFieldKind,
    pub mode: FieldMode,
    pub scalar: ScalarType,
    pub index: Option<IndexKind>,
    pub default: Option<DbDefault>,
    /// The column name, if it differs from the field key.
    pub map: Option<String>,
    pub native_type: Option<NativeType>,
}

/// A GraphQL argument contributed by a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arg {
    pub ty: TypeRef,
    pub default_value: Option<Value>,
}

impl Arg {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: Option<Value>) -> Self {
        self.default_value = value;
        self
    }
}

/// A function resolving a GraphQL value into another representation.
pub type Resolver<I, O> = Arc<dyn Fn(I) -> Result<O, Error> + Send + Sync>;

/// Input to a create mutation.
#[derive(Clone)]
pub struct CreateInput {
    pub arg: Arg,
    /// Resolve the supplied value, or `None` if the caller omitted the field.
    pub resolve: Resolver<Option<Value>, Value>,
}

/// Input to an update mutation.
///
/// The resolver only runs for fields the caller supplied.
#[derive(Clone)]
pub struct UpdateInput {
    pub arg: Arg,
    pub resolve: Resolver<Value, Value>,
}

/// Filter input for queries.
#[derive(Clone)]
pub struct WhereInput {
    pub arg: Arg,
    /// Resolve the filter on this field, or `None` if the caller passed `null` in its place.
    pub resolve: Resolver<Option<Filter<Value>>, FieldCondition>,
}

/// Input identifying a single item by a unique field.
#[derive(Clone)]
pub struct UniqueWhereInput {
    pub arg: Arg,
    pub resolve: Resolver<Value, Value>,
}

/// Input ordering query results by a field.
#[derive(Clone, Debug)]
pub struct OrderByInput {
    pub arg: Arg,
}

/// Every GraphQL input a field contributes.
#[derive(Clone)]
pub struct FieldInputs {
    pub create: CreateInput,
    pub update: UpdateInput,
    pub r#where: WhereInput,
    pub order_by: OrderByInput,
    pub unique_where: Option<UniqueWhereInput>,
}

/// The GraphQL output of a field.
#[derive(Clone)]
pub struct OutputField {
    pub ty: TypeRef,
    /// Resolve a stored value into its GraphQL representation.
    pub resolve: Resolver<Value, Value>,
}

/// Everything the schema compiler needs to know about a field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub db: DbField,
    pub input: FieldInputs,
    pub output: OutputField,
    pub hooks: FieldHooks,
    /// Named GraphQL types referenced by the field's inputs and output.
    pub graphql_types: Vec<NamedType>,
    /// Human readable name of the field.
    pub label: String,
    /// Reference to the presentation assets of the field in the admin interface.
    pub views: String,
    admin_meta: serde_json::Value,
}

impl FieldDescriptor {
    /// Metadata describing the field to the admin interface.
    pub fn get_admin_meta(&self) -> serde_json::Value {
        self.admin_meta.clone()
    }
}

/// A configured field type, waiting to be placed in a list.
pub type FieldTypeFunc =
    Arc<dyn Fn(&FieldMeta) -> Result<FieldDescriptor, ConfigError> + Send + Sync>;

/// Per-operation GraphQL nullability of a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GraphqlNonNull {
    pub is_non_null: bool,
}

/// GraphQL configuration shared by every field type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldGraphqlConfig {
    pub create: GraphqlNonNull,
    pub read: GraphqlNonNull,
}

/// Database configuration shared by every field type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldDbConfig {
    pub is_nullable: Option<bool>,
    /// Store the field in a column with this name instead of the field key.
    pub map: Option<String>,
}

/// Validation configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Validation {
    pub is_required: Option<bool>,
}

/// Turn an identifier like `publishedOn` into a label like `Published On`.
pub fn humanize(key: &str) -> String {
    key.to_case(Case::Title)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("publishedOn"), "Published On");
        assert_eq!(humanize("date"), "Date");
        assert_eq!(humanize("release_date"), "Release Date");
    }

    #[test]
    fn test_index_kind() {
        assert_eq!(IsIndexed::No.index_kind(), None);
        assert_eq!(IsIndexed::Index.index_kind(), Some(IndexKind::Index));
        assert_eq!(IsIndexed::Unique.index_kind(), Some(IndexKind::Unique));
    }
}

//! The schema compiler.
//!
//! [`create_system`] turns the configuration of an application into a [`System`], in which every
//! field descriptor has been built and every list has been named. The GraphQL API
//! ([`graphql`]), the storage schema ([`prisma`]) and the tables of the store are all derived
//! from the system.

use super::{
    config::{DbConfig, ExtendGraphqlSchema, ListKind, SystemConfig},
    date::PlainDate,
    error::ConfigError,
    fields::{DbDefault, DbField, FieldDescriptor, FieldMeta, ScalarType},
    provider::DatabaseProvider,
    store::{Column, IdKind, Store, TableSchema},
    value::Value,
};
use async_graphql::dynamic::Schema;
use convert_case::{Case, Casing};
use indexmap::IndexMap;
use std::sync::Arc;

pub mod graphql;
pub mod prisma;
pub mod types;

/// Names of the GraphQL types and operations generated for a list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListNames {
    pub output: String,
    pub where_input: String,
    pub where_unique_input: String,
    pub order_by_input: String,
    pub create_input: String,
    pub update_input: String,
    pub item_query: String,
    pub list_query: String,
    pub count_query: String,
    pub create_mutation: String,
    pub update_mutation: String,
    pub delete_mutation: String,
}

impl ListNames {
    pub fn new(key: &str, plural: Option<&str>) -> Self {
        let plural = plural
            .map(String::from)
            .unwrap_or_else(|| format!("{key}s"));
        let list_query = plural.to_case(Case::Camel);
        Self {
            output: key.into(),
            where_input: format!("{key}WhereInput"),
            where_unique_input: format!("{key}WhereUniqueInput"),
            order_by_input: format!("{key}OrderByInput"),
            create_input: format!("{key}CreateInput"),
            update_input: format!("{key}UpdateInput"),
            item_query: key.to_case(Case::Camel),
            count_query: format!("{list_query}Count"),
            list_query,
            create_mutation: format!("create{key}"),
            update_mutation: format!("update{key}"),
            delete_mutation: format!("delete{key}"),
        }
    }
}

/// A field whose descriptor has been built.
#[derive(Clone)]
pub struct InitialisedField {
    pub key: String,
    /// The name of the column holding the field.
    pub column: String,
    pub descriptor: FieldDescriptor,
}

/// A list whose fields have all been built.
#[derive(Clone)]
pub struct InitialisedList {
    pub key: String,
    pub kind: ListKind,
    pub id: IdKind,
    pub names: ListNames,
    pub fields: IndexMap<String, InitialisedField>,
}

impl InitialisedList {
    /// The table holding the items of this list.
    pub fn table_schema(&self) -> TableSchema {
        TableSchema {
            name: self.key.clone(),
            id: self.id,
            columns: self
                .fields
                .values()
                .map(|field| Column {
                    name: field.column.clone(),
                    scalar: field.descriptor.db.scalar,
                    mode: field.descriptor.db.mode,
                    index: field.descriptor.db.index,
                    default: column_default(&field.descriptor.db),
                })
                .collect(),
        }
    }

    /// The field stored in `column`, if any.
    pub fn field_by_column(&self, column: &str) -> Option<&InitialisedField> {
        self.fields.values().find(|field| field.column == column)
    }
}

/// The value a column takes when an insert omits it.
///
/// Date defaults are written as `YYYY-MM-DD` literals, which date-time columns hold as midnight
/// UTC.
fn column_default(db: &DbField) -> Option<Value> {
    match &db.default {
        Some(DbDefault::Literal(Value::String(s))) if db.scalar == ScalarType::DateTime => s
            .parse::<PlainDate>()
            .ok()
            .map(|date| date.to_utc_midnight().into()),
        Some(DbDefault::Literal(value)) => Some(value.clone()),
        Some(DbDefault::Autoincrement) | None => None,
    }
}

/// A compiled application.
#[derive(Clone)]
pub struct System {
    pub provider: DatabaseProvider,
    pub db: DbConfig,
    pub graphql_path: String,
    pub ui_disabled: bool,
    pub lists: IndexMap<String, Arc<InitialisedList>>,
    extend_graphql_schema: Option<ExtendGraphqlSchema>,
}

impl System {
    /// Build the GraphQL schema, with resolvers reading and writing `store`.
    pub fn graphql_schema(&self, store: Store) -> Result<Schema, ConfigError> {
        graphql::build_schema(self, store)
    }

    /// The storage schema in Prisma schema language.
    pub fn prisma_schema(&self) -> String {
        prisma::print_schema(self)
    }

    pub fn table_schemas(&self) -> Vec<TableSchema> {
        self.lists.values().map(|list| list.table_schema()).collect()
    }
}

/// Compile the configuration of an application.
pub fn create_system(config: &SystemConfig) -> Result<System, ConfigError> {
    let provider = config.db.provider;
    let lists = config
        .lists
        .iter()
        .map(|(list_key, list)| {
            if list.fields.is_empty() {
                return Err(ConfigError::EmptyList {
                    list_key: list_key.clone(),
                });
            }
            let fields = list
                .fields
                .iter()
                .map(|(field_key, field)| {
                    if field_key == "id" {
                        return Err(ConfigError::ReservedFieldName {
                            list_key: list_key.clone(),
                            field_key: field_key.clone(),
                        });
                    }
                    let descriptor = field(&FieldMeta {
                        list_key: list_key.clone(),
                        field_key: field_key.clone(),
                        provider,
                    })?;
                    let column = descriptor
                        .db
                        .map
                        .clone()
                        .unwrap_or_else(|| field_key.clone());
                    Ok((
                        field_key.clone(),
                        InitialisedField {
                            key: field_key.clone(),
                            column,
                            descriptor,
                        },
                    ))
                })
                .collect::<Result<IndexMap<_, _>, _>>()?;
            Ok((
                list_key.clone(),
                Arc::new(InitialisedList {
                    key: list_key.clone(),
                    kind: list.kind,
                    id: list.db.id_field,
                    names: ListNames::new(list_key, list.graphql.plural.as_deref()),
                    fields,
                }),
            ))
        })
        .collect::<Result<IndexMap<_, _>, _>>()?;
    tracing::info!(%provider, lists = ?lists.keys().collect::<Vec<_>>(), "compiled system");

    Ok(System {
        provider,
        db: config.db.clone(),
        graphql_path: config.graphql.path.clone(),
        ui_disabled: config.ui.is_disabled,
        lists,
        extend_graphql_schema: config.graphql.extend_graphql_schema.clone(),
    })
}

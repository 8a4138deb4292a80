//! Errors raised while compiling an application's configuration.

use snafu::Snafu;

/// A mistake in the configuration of a list or field.
///
/// These are detected when the schema is built and are fatal to application startup.
#[derive(Clone, Debug, PartialEq, Eq, Snafu)]
pub enum ConfigError {
    #[snafu(display(
        "The {field_type} field at {list_key}.{field_key} specifies defaultValue: {value} but values must be provided as a full-date ISO8601 string such as 1970-01-01"
    ))]
    InvalidDefaultValue {
        field_type: &'static str,
        list_key: String,
        field_key: String,
        value: String,
    },

    #[snafu(display(
        "The field at {list_key}.{field_key} sets graphql.read.isNonNull: true but not validation.isRequired: true or db.isNullable: false.\nSet validation.isRequired: true or db.isNullable: false, or disable graphql.read.isNonNull"
    ))]
    ReadNonNullNotAllowed { list_key: String, field_key: String },

    #[snafu(display(
        "The field at {list_key}.{field_key} sets graphql.create.isNonNull: true but has neither a defaultValue nor validation.isRequired: true.\nSet a defaultValue or validation.isRequired: true, or disable graphql.create.isNonNull"
    ))]
    CreateNonNullNotAllowed { list_key: String, field_key: String },

    #[snafu(display("The list {list_key} has no fields"))]
    EmptyList { list_key: String },

    #[snafu(display("The field {list_key}.{field_key} uses the reserved name {field_key}"))]
    ReservedFieldName { list_key: String, field_key: String },

    #[snafu(display(
        "The GraphQL type {name} is defined more than once with different definitions"
    ))]
    ConflictingGraphqlType { name: String },

    #[snafu(display("Invalid GraphQL schema: {message}"))]
    GraphqlSchema { message: String },
}

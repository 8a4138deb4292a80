//! Checks relating GraphQL nullability to storage nullability, shared by all field types.

use super::{FieldDbConfig, FieldGraphqlConfig, FieldMeta, Validation};
use crate::error::ConfigError;

/// Decide whether a field's column is nullable.
///
/// An explicit `validation.is_required` takes precedence, then an explicit `db.is_nullable`.
/// Fields are nullable by default.
pub fn get_resolved_is_nullable(validation: &Validation, db: &FieldDbConfig) -> bool {
    match (validation.is_required, db.is_nullable) {
        (Some(is_required), _) => !is_required,
        (None, Some(is_nullable)) => is_nullable,
        (None, None) => true,
    }
}

/// A field can only be non-null when read if its column can never hold null.
pub fn assert_read_is_non_null_allowed(
    meta: &FieldMeta,
    graphql: &FieldGraphqlConfig,
    resolved_is_nullable: bool,
) -> Result<(), ConfigError> {
    if graphql.read.is_non_null && resolved_is_nullable {
        return Err(ConfigError::ReadNonNullNotAllowed {
            list_key: meta.list_key.clone(),
            field_key: meta.field_key.clone(),
        });
    }
    Ok(())
}

/// A field can only be non-null on create if it has a default value or is required.
pub fn assert_create_is_non_null_allowed(
    meta: &FieldMeta,
    graphql: &FieldGraphqlConfig,
    has_default: bool,
    is_required: bool,
) -> Result<(), ConfigError> {
    if graphql.create.is_non_null && !has_default && !is_required {
        return Err(ConfigError::CreateNonNullNotAllowed {
            list_key: meta.list_key.clone(),
            field_key: meta.field_key.clone(),
        });
    }
    Ok(())
}

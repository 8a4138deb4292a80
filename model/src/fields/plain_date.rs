//! A calendar date field.
//!
//! Values are exchanged with clients as `YYYY-MM-DD` strings. Engines with a native date column
//! store them as date-times pinned to midnight UTC; other engines store the string itself.

use super::{
    humanize,
    non_null::{
        assert_create_is_non_null_allowed, assert_read_is_non_null_allowed,
        get_resolved_is_nullable,
    },
    Arg, CreateInput, DbDefault, DbField, DbFieldKind, FieldDbConfig, FieldDescriptor,
    FieldGraphqlConfig, FieldInputs, FieldMeta, FieldMode, FieldTypeFunc, IsIndexed, NativeType,
    OrderByInput, OutputField, ScalarType, UniqueWhereInput, UpdateInput, Validation, WhereInput,
};
use crate::{
    date::PlainDate,
    error::ConfigError,
    filter::{resolve_common, FieldCondition, Filter},
    hooks::{FieldHooks, ValidateInputArgs, ValidateInputHook},
    provider::DateRepresentation,
    schema::types::{
        order_direction_enum, plain_date_scalar, InputObjectDef, NamedType, ORDER_DIRECTION,
        PLAIN_DATE,
    },
    value::Value,
};
use anyhow::Error;
use async_graphql::dynamic::TypeRef;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Name of the filter type for optional date fields.
pub const NULLABLE_FILTER: &str = "PlainDateNullableFilter";

/// Name of the filter type for required date fields.
pub const FILTER: &str = "PlainDateFilter";

/// Configuration of a [`plain_date`] field.
#[derive(Clone, Default)]
pub struct PlainDateFieldConfig {
    pub is_indexed: IsIndexed,
    pub validation: Validation,
    /// A `YYYY-MM-DD` date used when a create mutation omits the field.
    pub default_value: Option<String>,
    /// Human readable name, used in validation messages.
    pub label: Option<String>,
    pub hooks: FieldHooks,
    pub graphql: FieldGraphqlConfig,
    pub db: FieldDbConfig,
}

/// Admin interface metadata of a date field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainDateFieldMeta {
    pub default_value: Option<String>,
    pub is_required: bool,
}

/// A calendar date field.
pub fn plain_date(config: PlainDateFieldConfig) -> FieldTypeFunc {
    Arc::new(move |meta| build(&config, meta))
}

fn build(config: &PlainDateFieldConfig, meta: &FieldMeta) -> Result<FieldDescriptor, ConfigError> {
    if let Some(value) = &config.default_value {
        if value.parse::<PlainDate>().is_err() {
            return Err(ConfigError::InvalidDefaultValue {
                field_type: "plainDate",
                list_key: meta.list_key.clone(),
                field_key: meta.field_key.clone(),
                value: value.clone(),
            });
        }
    }

    let resolved_is_nullable = get_resolved_is_nullable(&config.validation, &config.db);
    assert_read_is_non_null_allowed(meta, &config.graphql, resolved_is_nullable)?;
    assert_create_is_non_null_allowed(
        meta,
        &config.graphql,
        config.default_value.is_some(),
        config.validation.is_required == Some(true) || !resolved_is_nullable,
    )?;

    let mode = if resolved_is_nullable {
        FieldMode::Optional
    } else {
        FieldMode::Required
    };
    let label = config
        .label
        .clone()
        .unwrap_or_else(|| humanize(&meta.field_key));
    let native = meta.provider.date_representation() == DateRepresentation::Native;
    tracing::debug!(
        list = %meta.list_key,
        field = %meta.field_key,
        %mode,
        native,
        "building plainDate field"
    );

    let resolve_input: fn(Value) -> Result<Value, Error> = if native {
        date_string_to_utc_midnight
    } else {
        Ok
    };
    let default_value = config.default_value.clone();
    let create = CreateInput {
        arg: if config.graphql.create.is_non_null {
            Arg::new(TypeRef::named_nn(PLAIN_DATE))
                .with_default(config.default_value.as_deref().map(Value::from))
        } else {
            Arg::new(TypeRef::named(PLAIN_DATE))
        },
        resolve: Arc::new(move |value: Option<Value>| {
            let value = value.unwrap_or_else(|| default_value.as_deref().into());
            resolve_input(value)
        }),
    };
    let update = UpdateInput {
        arg: Arg::new(TypeRef::named(PLAIN_DATE)),
        resolve: Arc::new(resolve_input),
    };

    let filter_name = match mode {
        FieldMode::Optional => NULLABLE_FILTER,
        FieldMode::Required => FILTER,
    };
    let r#where = WhereInput {
        arg: Arg::new(TypeRef::named(filter_name)),
        resolve: Arc::new(move |filter: Option<Filter<Value>>| -> Result<FieldCondition, Error> {
            let Some(filter) = filter else {
                return Ok(FieldCondition::is_null());
            };
            let filter = if native {
                filter.try_map(&date_string_to_utc_midnight)?
            } else {
                filter
            };
            Ok(match mode {
                FieldMode::Optional => resolve_common(filter),
                FieldMode::Required => FieldCondition::Filter(filter),
            })
        }),
    };

    let unique_where = (config.is_indexed == IsIndexed::Unique).then(|| UniqueWhereInput {
        arg: Arg::new(TypeRef::named(PLAIN_DATE)),
        resolve: Arc::new(resolve_input),
    });

    let output = OutputField {
        ty: if config.graphql.read.is_non_null {
            TypeRef::named_nn(PLAIN_DATE)
        } else {
            TypeRef::named(PLAIN_DATE)
        },
        resolve: Arc::new(utc_midnight_to_date_string),
    };

    let is_required = config.validation.is_required == Some(true) || !resolved_is_nullable;
    let hooks = FieldHooks {
        validate_input: Some(Arc::new(ValidateRequired {
            label: label.clone(),
            is_required,
            then: config.hooks.validate_input.clone(),
        })),
    };

    let admin_meta = PlainDateFieldMeta {
        default_value: config.default_value.clone(),
        is_required: config.validation.is_required.unwrap_or(false),
    };

    Ok(FieldDescriptor {
        db: DbField {
            kind: DbFieldKind::Scalar,
            mode,
            scalar: if native {
                ScalarType::DateTime
            } else {
                ScalarType::String
            },
            index: config.is_indexed.index_kind(),
            default: config
                .default_value
                .as_deref()
                .map(|value| DbDefault::Literal(value.into())),
            map: config.db.map.clone(),
            native_type: native.then_some(NativeType::Date),
        },
        input: FieldInputs {
            create,
            update,
            r#where,
            order_by: OrderByInput {
                arg: Arg::new(TypeRef::named(ORDER_DIRECTION)),
            },
            unique_where,
        },
        output,
        hooks,
        graphql_types: vec![
            plain_date_scalar(),
            order_direction_enum(),
            filter_type(filter_name),
        ],
        label,
        views: "plain-date/views".into(),
        admin_meta: serde_json::to_value(admin_meta).unwrap_or_default(),
    })
}

/// Convert a `YYYY-MM-DD` string into a date-time at midnight UTC.
///
/// Nulls, and values which are not strings, are passed through.
fn date_string_to_utc_midnight(value: Value) -> Result<Value, Error> {
    match value {
        Value::String(s) => Ok(s.parse::<PlainDate>()?.to_utc_midnight().into()),
        other => Ok(other),
    }
}

/// Convert a stored date-time back into a `YYYY-MM-DD` string, using its UTC date.
fn utc_midnight_to_date_string(value: Value) -> Result<Value, Error> {
    Ok(match value {
        Value::DateTime(instant) => PlainDate::from_utc(instant).to_string().into(),
        other => other,
    })
}

/// The filter input type for date fields.
///
/// The type is self-referential: its `not` field is another filter of the same type.
fn filter_type(name: &str) -> NamedType {
    let date = || TypeRef::named(PLAIN_DATE);
    let dates = || TypeRef::named_nn_list(PLAIN_DATE);
    NamedType::InputObject(InputObjectDef {
        name: name.into(),
        fields: vec![
            ("equals".into(), date()),
            ("in".into(), dates()),
            ("notIn".into(), dates()),
            ("lt".into(), date()),
            ("lte".into(), date()),
            ("gt".into(), date()),
            ("gte".into(), date()),
            ("not".into(), TypeRef::named(name.to_string())),
        ],
    })
}

/// Reject null values of required fields, then run the caller's hook.
struct ValidateRequired {
    label: String,
    is_required: bool,
    then: Option<Arc<dyn ValidateInputHook>>,
}

#[async_trait]
impl ValidateInputHook for ValidateRequired {
    async fn validate_input(&self, args: &mut ValidateInputArgs<'_>) -> Result<(), Error> {
        let value = args.resolved_data.get(args.field_key);
        if self.is_required && value.map_or(false, Value::is_null) {
            args.add_validation_error(format!("{} is required", self.label));
        }
        if let Some(then) = &self.then {
            then.validate_input(args).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        fields::{GraphqlNonNull, IndexKind},
        hooks::Operation,
        provider::DatabaseProvider,
    };
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;
    use serde_json::json;
    use std::sync::Mutex;
    use strum::IntoEnumIterator;

    fn meta(provider: DatabaseProvider) -> FieldMeta {
        FieldMeta {
            list_key: "Post".into(),
            field_key: "publishedOn".into(),
            provider,
        }
    }

    fn build_with(config: PlainDateFieldConfig, provider: DatabaseProvider) -> FieldDescriptor {
        plain_date(config)(&meta(provider)).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> Value {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().into()
    }

    fn filter(value: serde_json::Value) -> Option<Filter<Value>> {
        serde_json::from_value(value).unwrap()
    }

    async fn validate(
        descriptor: &FieldDescriptor,
        resolved: Option<Value>,
    ) -> Vec<String> {
        let mut data = IndexMap::new();
        if let Some(value) = resolved {
            data.insert("publishedOn".to_string(), value);
        }
        let mut errors = vec![];
        let mut args = ValidateInputArgs::new(
            "Post",
            "publishedOn",
            Operation::Create,
            &data,
            None,
            &mut errors,
        );
        descriptor
            .hooks
            .validate_input
            .as_ref()
            .unwrap()
            .validate_input(&mut args)
            .await
            .unwrap();
        errors
    }

    #[test]
    fn test_invalid_default_value() {
        for value in ["1970-13-40", "not-a-date"] {
            let config = PlainDateFieldConfig {
                default_value: Some(value.into()),
                ..Default::default()
            };
            let err = match plain_date(config)(&meta(DatabaseProvider::Postgresql)) {
                Err(err) => err,
                Ok(_) => panic!("default value {value} should be rejected"),
            };
            assert_eq!(
                err.to_string(),
                format!(
                    "The plainDate field at Post.publishedOn specifies defaultValue: {value} but values must be provided as a full-date ISO8601 string such as 1970-01-01"
                )
            );
        }
    }

    #[test]
    fn test_conflicting_non_null() {
        let config = PlainDateFieldConfig {
            graphql: FieldGraphqlConfig {
                read: GraphqlNonNull { is_non_null: true },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            plain_date(config)(&meta(DatabaseProvider::Sqlite)),
            Err(ConfigError::ReadNonNullNotAllowed { .. })
        ));

        let config = PlainDateFieldConfig {
            graphql: FieldGraphqlConfig {
                create: GraphqlNonNull { is_non_null: true },
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            plain_date(config)(&meta(DatabaseProvider::Sqlite)),
            Err(ConfigError::CreateNonNullNotAllowed { .. })
        ));
    }

    #[test]
    fn test_storage_by_provider() {
        let config = PlainDateFieldConfig {
            is_indexed: IsIndexed::Unique,
            default_value: Some("1970-01-01".into()),
            db: FieldDbConfig {
                is_nullable: Some(false),
                map: Some("published_on".into()),
            },
            ..Default::default()
        };
        for provider in DatabaseProvider::iter() {
            let native = provider != DatabaseProvider::Sqlite;
            let descriptor = build_with(config.clone(), provider);
            assert_eq!(
                descriptor.db,
                DbField {
                    kind: DbFieldKind::Scalar,
                    mode: FieldMode::Required,
                    scalar: if native {
                        ScalarType::DateTime
                    } else {
                        ScalarType::String
                    },
                    index: Some(IndexKind::Unique),
                    default: Some(DbDefault::Literal("1970-01-01".into())),
                    map: Some("published_on".into()),
                    native_type: native.then_some(NativeType::Date),
                }
            );
        }
    }

    #[test]
    fn test_mode() {
        let mode = |validation, is_nullable| {
            build_with(
                PlainDateFieldConfig {
                    validation: Validation {
                        is_required: validation,
                    },
                    db: FieldDbConfig {
                        is_nullable,
                        map: None,
                    },
                    ..Default::default()
                },
                DatabaseProvider::Sqlite,
            )
            .db
            .mode
        };
        assert_eq!(mode(None, None), FieldMode::Optional);
        assert_eq!(mode(Some(true), None), FieldMode::Required);
        assert_eq!(mode(None, Some(false)), FieldMode::Required);
        assert_eq!(mode(Some(false), Some(false)), FieldMode::Optional);
    }

    #[test]
    fn test_create_native() {
        let descriptor = build_with(
            PlainDateFieldConfig {
                default_value: Some("1970-01-01".into()),
                ..Default::default()
            },
            DatabaseProvider::Postgresql,
        );
        let create = &descriptor.input.create.resolve;
        assert_eq!(create(Some("2020-02-29".into())).unwrap(), midnight(2020, 2, 29));
        assert_eq!(create(None).unwrap(), midnight(1970, 1, 1));
        assert_eq!(create(Some(Value::Null)).unwrap(), Value::Null);
        assert!(create(Some("2020-02-30".into())).is_err());
        assert_eq!(descriptor.input.create.arg, Arg::new(TypeRef::named("PlainDate")));
    }

    #[test]
    fn test_create_text() {
        let descriptor = build_with(Default::default(), DatabaseProvider::Sqlite);
        let create = &descriptor.input.create.resolve;
        assert_eq!(create(Some("2020-02-29".into())).unwrap(), "2020-02-29".into());
        assert_eq!(create(None).unwrap(), Value::Null);
        assert_eq!(create(Some(Value::Null)).unwrap(), Value::Null);
    }

    #[test]
    fn test_create_non_null_arg() {
        let descriptor = build_with(
            PlainDateFieldConfig {
                default_value: Some("1970-01-01".into()),
                graphql: FieldGraphqlConfig {
                    create: GraphqlNonNull { is_non_null: true },
                    ..Default::default()
                },
                ..Default::default()
            },
            DatabaseProvider::Mysql,
        );
        assert_eq!(
            descriptor.input.create.arg,
            Arg::new(TypeRef::named_nn("PlainDate")).with_default(Some("1970-01-01".into()))
        );
    }

    #[test]
    fn test_update() {
        let native = build_with(Default::default(), DatabaseProvider::Mysql);
        assert_eq!(
            (native.input.update.resolve)("2000-01-01".into()).unwrap(),
            midnight(2000, 1, 1)
        );
        assert_eq!((native.input.update.resolve)(Value::Null).unwrap(), Value::Null);

        let text = build_with(Default::default(), DatabaseProvider::Sqlite);
        assert_eq!(
            (text.input.update.resolve)("2000-01-01".into()).unwrap(),
            "2000-01-01".into()
        );
    }

    #[test]
    fn test_where_native_required() {
        let descriptor = build_with(
            PlainDateFieldConfig {
                validation: Validation {
                    is_required: Some(true),
                },
                ..Default::default()
            },
            DatabaseProvider::Postgresql,
        );
        assert_eq!(descriptor.input.r#where.arg.ty, TypeRef::named("PlainDateFilter"));
        let cond = (descriptor.input.r#where.resolve)(filter(json!({
            "gte": "2000-01-01",
            "not": { "equals": "1999-12-31", "in": null, "not": null },
            "notIn": ["1979-04-12"],
            "lt": null,
        })))
        .unwrap();
        assert_eq!(
            cond,
            FieldCondition::Filter(Filter {
                gte: Some(Some(midnight(2000, 1, 1))),
                not_in: Some(Some(vec![midnight(1979, 4, 12)])),
                lt: Some(None),
                not: Some(Some(Box::new(Filter {
                    equals: Some(Some(midnight(1999, 12, 31))),
                    r#in: Some(None),
                    not: Some(None),
                    ..Default::default()
                }))),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_where_native_optional() {
        let descriptor = build_with(Default::default(), DatabaseProvider::Mysql);
        assert_eq!(
            descriptor.input.r#where.arg.ty,
            TypeRef::named("PlainDateNullableFilter")
        );
        let cond = (descriptor.input.r#where.resolve)(filter(json!({
            "gte": "2000-01-01",
            "not": { "equals": "1999-12-31" },
        })))
        .unwrap();
        assert_eq!(
            cond,
            FieldCondition::And(vec![
                FieldCondition::Filter(Filter {
                    gte: Some(Some(midnight(2000, 1, 1))),
                    ..Default::default()
                }),
                FieldCondition::Not(Box::new(FieldCondition::And(vec![
                    FieldCondition::Filter(Filter::equals(midnight(1999, 12, 31)))
                ]))),
            ])
        );
        assert!(!cond.matches(&Value::Null));
        assert!(cond.matches(&midnight(2000, 1, 1)));
    }

    #[test]
    fn test_where_text() {
        let descriptor = build_with(
            PlainDateFieldConfig {
                db: FieldDbConfig {
                    is_nullable: Some(false),
                    map: None,
                },
                ..Default::default()
            },
            DatabaseProvider::Sqlite,
        );
        let input = filter(json!({ "in": ["2000-01-01"], "not": { "equals": null } }));
        assert_eq!(
            (descriptor.input.r#where.resolve)(input.clone()).unwrap(),
            FieldCondition::Filter(input.unwrap())
        );
    }

    #[test]
    fn test_where_invalid_date() {
        let descriptor = build_with(Default::default(), DatabaseProvider::Postgresql);
        assert!((descriptor.input.r#where.resolve)(filter(json!({
            "not": { "in": ["2000-01-01", "2000-01-32"] }
        })))
        .is_err());
    }

    #[test]
    fn test_where_null() {
        for provider in [DatabaseProvider::Sqlite, DatabaseProvider::Postgresql] {
            for is_nullable in [true, false] {
                let descriptor = build_with(
                    PlainDateFieldConfig {
                        db: FieldDbConfig {
                            is_nullable: Some(is_nullable),
                            map: None,
                        },
                        ..Default::default()
                    },
                    provider,
                );
                let cond = (descriptor.input.r#where.resolve)(None).unwrap();
                assert_eq!(cond, FieldCondition::is_null());
                assert!(cond.matches(&Value::Null));
                assert!(!cond.matches(&"2000-01-01".into()));
                assert!(!cond.matches(&midnight(2000, 1, 1)));
            }
        }
    }

    #[test]
    fn test_unique_where() {
        let descriptor = build_with(Default::default(), DatabaseProvider::Postgresql);
        assert!(descriptor.input.unique_where.is_none());

        let descriptor = build_with(
            PlainDateFieldConfig {
                is_indexed: IsIndexed::Index,
                ..Default::default()
            },
            DatabaseProvider::Postgresql,
        );
        assert!(descriptor.input.unique_where.is_none());

        for provider in DatabaseProvider::iter() {
            let descriptor = build_with(
                PlainDateFieldConfig {
                    is_indexed: IsIndexed::Unique,
                    ..Default::default()
                },
                provider,
            );
            let unique = descriptor.input.unique_where.unwrap();
            let expected = match provider {
                DatabaseProvider::Sqlite => "2020-06-10".into(),
                DatabaseProvider::Postgresql | DatabaseProvider::Mysql => midnight(2020, 6, 10),
            };
            assert_eq!((unique.resolve)("2020-06-10".into()).unwrap(), expected);
        }
    }

    #[test]
    fn test_output() {
        for provider in DatabaseProvider::iter() {
            let descriptor = build_with(Default::default(), provider);
            let create = &descriptor.input.create.resolve;
            let output = &descriptor.output.resolve;
            for s in ["1979-04-12", "1999-12-31", "2000-01-01", "2020-02-29"] {
                let stored = create(Some(s.into())).unwrap();
                assert_eq!(output(stored).unwrap(), Value::from(s));
            }
            assert_eq!(output(Value::Null).unwrap(), Value::Null);
            assert_eq!(descriptor.output.ty, TypeRef::named("PlainDate"));
        }

        // Time of day is discarded using UTC components.
        let descriptor = build_with(Default::default(), DatabaseProvider::Postgresql);
        let late = Utc.with_ymd_and_hms(1999, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(
            (descriptor.output.resolve)(late.into()).unwrap(),
            "1999-12-31".into()
        );
    }

    #[test]
    fn test_read_non_null_output() {
        let descriptor = build_with(
            PlainDateFieldConfig {
                validation: Validation {
                    is_required: Some(true),
                },
                graphql: FieldGraphqlConfig {
                    read: GraphqlNonNull { is_non_null: true },
                    ..Default::default()
                },
                ..Default::default()
            },
            DatabaseProvider::Sqlite,
        );
        assert_eq!(descriptor.output.ty, TypeRef::named_nn("PlainDate"));
    }

    #[test]
    fn test_graphql_types() {
        let optional = build_with(Default::default(), DatabaseProvider::Sqlite);
        let required = build_with(
            PlainDateFieldConfig {
                validation: Validation {
                    is_required: Some(true),
                },
                ..Default::default()
            },
            DatabaseProvider::Sqlite,
        );
        let names = |d: &FieldDescriptor| {
            d.graphql_types
                .iter()
                .map(|ty| ty.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(
            names(&optional),
            ["PlainDate", "OrderDirection", "PlainDateNullableFilter"]
        );
        assert_eq!(names(&required), ["PlainDate", "OrderDirection", "PlainDateFilter"]);

        let NamedType::InputObject(def) = &required.graphql_types[2] else {
            panic!("expected an input object");
        };
        assert_eq!(
            def.fields.last().unwrap(),
            &("not".to_string(), TypeRef::named("PlainDateFilter"))
        );
        assert_eq!(def.fields[1], ("in".to_string(), TypeRef::named_nn_list("PlainDate")));
    }

    #[test]
    fn test_admin_meta() {
        let descriptor = build_with(
            PlainDateFieldConfig {
                default_value: Some("1970-01-01".into()),
                validation: Validation {
                    is_required: Some(true),
                },
                ..Default::default()
            },
            DatabaseProvider::Sqlite,
        );
        assert_eq!(
            descriptor.get_admin_meta(),
            json!({ "defaultValue": "1970-01-01", "isRequired": true })
        );
        assert_eq!(descriptor.views, "plain-date/views");
        assert_eq!(descriptor.label, "Published On");

        let descriptor = build_with(Default::default(), DatabaseProvider::Sqlite);
        assert_eq!(
            descriptor.get_admin_meta(),
            json!({ "defaultValue": null, "isRequired": false })
        );
    }

    #[async_std::test]
    async fn test_validate_required() {
        for provider in DatabaseProvider::iter() {
            let required = build_with(
                PlainDateFieldConfig {
                    db: FieldDbConfig {
                        is_nullable: Some(false),
                        map: None,
                    },
                    ..Default::default()
                },
                provider,
            );
            assert_eq!(
                validate(&required, Some(Value::Null)).await,
                ["Published On is required"]
            );
            assert!(validate(&required, None).await.is_empty());
            assert!(validate(&required, Some("2000-01-01".into())).await.is_empty());

            let optional = build_with(Default::default(), provider);
            assert!(validate(&optional, Some(Value::Null)).await.is_empty());
        }
    }

    #[async_std::test]
    async fn test_validate_custom_label_and_caller_hook() {
        let calls = Arc::new(Mutex::new(vec![]));
        let hook_calls = calls.clone();
        let descriptor = build_with(
            PlainDateFieldConfig {
                label: Some("Release".into()),
                validation: Validation {
                    is_required: Some(true),
                },
                hooks: FieldHooks::validate_input(move |args: &mut ValidateInputArgs| -> Result<(), Error> {
                    hook_calls.lock().unwrap().push(args.field_key.to_string());
                    args.add_validation_error("caller says no");
                    Ok(())
                }),
                ..Default::default()
            },
            DatabaseProvider::Postgresql,
        );
        assert_eq!(
            validate(&descriptor, Some(Value::Null)).await,
            ["Release is required", "caller says no"]
        );
        assert_eq!(*calls.lock().unwrap(), ["publishedOn"]);
    }
}

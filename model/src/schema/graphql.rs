//! The generated GraphQL API.
//!
//! Each list contributes an output type, input types for filtering, ordering, creating and
//! updating items, and the queries and mutations using them. Resolvers translate GraphQL
//! arguments into store operations using the inputs and outputs of each field's descriptor.

use super::{
    types::{id_filter, order_direction_enum, NamedType, OrderDirection, ID_FILTER, ORDER_DIRECTION},
    InitialisedList, System,
};
use crate::{
    config::{ListKind, SchemaParts},
    error::ConfigError,
    fields::Arg,
    filter::{FieldCondition, Filter},
    hooks::{Operation, ValidateInputArgs},
    store::{Condition, IdKind, OrderBy, Query, Row, Store},
    value::Value,
};
use async_graphql::{
    dynamic::{
        Field, FieldFuture, FieldValue, InputObject, InputValue, Object, ResolverContext, Schema,
        Type, TypeRef,
    },
    Error, Value as ConstValue,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Build the GraphQL schema of `system`.
pub fn build_schema(system: &System, store: Store) -> Result<Schema, ConfigError> {
    let mut named = IndexMap::new();
    register(&mut named, id_filter())?;
    register(&mut named, order_direction_enum())?;

    let mut query = Object::new("Query");
    let mut mutation = Object::new("Mutation");
    let mut types: Vec<Type> = vec![];
    for list in system.lists.values() {
        for field in list.fields.values() {
            for ty in &field.descriptor.graphql_types {
                register(&mut named, ty.clone())?;
            }
        }

        types.push(output_type(list).into());
        types.push(update_input(list).into());
        match list.kind {
            ListKind::List => {
                types.push(where_input(list).into());
                types.push(where_unique_input(list).into());
                types.push(order_by_input(list).into());
                types.push(create_input(list).into());
                query = query
                    .field(list_query(list))
                    .field(item_query(list))
                    .field(count_query(list));
                mutation = mutation
                    .field(create_mutation(list))
                    .field(update_mutation(list))
                    .field(delete_mutation(list));
            }
            ListKind::Singleton => {
                query = query.field(singleton_query(list));
                mutation = mutation.field(singleton_update_mutation(list));
            }
        }
    }
    types.extend(named.values().map(NamedType::build));

    let mut parts = SchemaParts {
        query,
        mutation,
        types,
    };
    if let Some(extend) = &system.extend_graphql_schema {
        parts = extend(parts);
    }

    let query_name = parts.query.type_name().to_string();
    let mutation_name = parts.mutation.type_name().to_string();
    let builder = Schema::build(&query_name, Some(mutation_name.as_str()), None)
        .register(parts.query)
        .register(parts.mutation);
    let schema = parts
        .types
        .into_iter()
        .fold(builder, |builder, ty| builder.register(ty))
        .data(store)
        .finish()
        .map_err(|err| ConfigError::GraphqlSchema {
            message: err.to_string(),
        })?;
    tracing::info!(lists = system.lists.len(), "built GraphQL schema");
    Ok(schema)
}

/// Add a type contributed by a field, unless an identical type is already present.
fn register(types: &mut IndexMap<String, NamedType>, ty: NamedType) -> Result<(), ConfigError> {
    match types.get(ty.name()) {
        Some(existing) if *existing != ty => Err(ConfigError::ConflictingGraphqlType {
            name: ty.name().into(),
        }),
        Some(_) => Ok(()),
        None => {
            types.insert(ty.name().into(), ty);
            Ok(())
        }
    }
}

fn input_value(name: &str, arg: &Arg) -> InputValue {
    let value = InputValue::new(name, arg.ty.clone());
    match &arg.default_value {
        Some(default) => value.default_value(default.clone().into_graphql()),
        None => value,
    }
}

fn output_type(list: &InitialisedList) -> Object {
    let id = Field::new("id", TypeRef::named_nn(TypeRef::ID), |ctx| {
        FieldFuture::new(async move {
            let row = ctx.parent_value.try_downcast_ref::<Row>()?;
            Ok(Some(FieldValue::value(id_to_graphql(&row.id))))
        })
    });
    list.fields
        .values()
        .fold(Object::new(&list.names.output).field(id), |obj, field| {
            let column = field.column.clone();
            let resolve = field.descriptor.output.resolve.clone();
            obj.field(Field::new(
                &field.key,
                field.descriptor.output.ty.clone(),
                move |ctx| {
                    let column = column.clone();
                    let resolve = resolve.clone();
                    FieldFuture::new(async move {
                        let row = ctx.parent_value.try_downcast_ref::<Row>()?;
                        Ok(match resolve(row.get(&column).clone())? {
                            Value::Null => None,
                            value => Some(FieldValue::value(value.into_graphql())),
                        })
                    })
                },
            ))
        })
}

fn where_input(list: &InitialisedList) -> InputObject {
    let name = &list.names.where_input;
    let obj = InputObject::new(name).field(InputValue::new("id", TypeRef::named(ID_FILTER)));
    list.fields
        .values()
        .fold(obj, |obj, field| {
            obj.field(input_value(&field.key, &field.descriptor.input.r#where.arg))
        })
        .field(InputValue::new("AND", TypeRef::named_nn_list(name)))
        .field(InputValue::new("OR", TypeRef::named_nn_list(name)))
        .field(InputValue::new("NOT", TypeRef::named_nn_list(name)))
}

fn where_unique_input(list: &InitialisedList) -> InputObject {
    let obj = InputObject::new(&list.names.where_unique_input)
        .field(InputValue::new("id", TypeRef::named(TypeRef::ID)));
    list.fields.values().fold(obj, |obj, field| {
        match &field.descriptor.input.unique_where {
            Some(unique) => obj.field(input_value(&field.key, &unique.arg)),
            None => obj,
        }
    })
}

fn order_by_input(list: &InitialisedList) -> InputObject {
    let obj = InputObject::new(&list.names.order_by_input)
        .field(InputValue::new("id", TypeRef::named(ORDER_DIRECTION)));
    list.fields.values().fold(obj, |obj, field| {
        obj.field(input_value(&field.key, &field.descriptor.input.order_by.arg))
    })
}

fn create_input(list: &InitialisedList) -> InputObject {
    list.fields
        .values()
        .fold(InputObject::new(&list.names.create_input), |obj, field| {
            obj.field(input_value(&field.key, &field.descriptor.input.create.arg))
        })
}

fn update_input(list: &InitialisedList) -> InputObject {
    list.fields
        .values()
        .fold(InputObject::new(&list.names.update_input), |obj, field| {
            obj.field(input_value(&field.key, &field.descriptor.input.update.arg))
        })
}

/// A root field whose resolver operates on `list`.
fn list_field<F>(name: &str, ty: TypeRef, list: &Arc<InitialisedList>, resolve: F) -> Field
where
    F: for<'a> Fn(Arc<InitialisedList>, ResolverContext<'a>) -> FieldFuture<'a>
        + Send
        + Sync
        + 'static,
{
    let list = list.clone();
    Field::new(name, ty, move |ctx| resolve(list.clone(), ctx))
}

fn list_query(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.list_query,
        TypeRef::named_nn_list(&list.names.output),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let query = Query {
                    condition: resolve_where(&list, arg_json(&ctx, "where")?.as_ref())?,
                    order_by: resolve_order_by(&list, arg_json(&ctx, "orderBy")?.as_ref())?,
                    skip: arg_count(&ctx, "skip")?.unwrap_or(0),
                    take: arg_count(&ctx, "take")?,
                };
                tracing::debug!(list = %list.key, ?query, "list query");
                let rows = store.select(&list.key, &query).await?;
                Ok(Some(FieldValue::list(
                    rows.into_iter().map(FieldValue::owned_any),
                )))
            })
        },
    )
    .argument(
        InputValue::new("where", TypeRef::named_nn(&list.names.where_input))
            .default_value(ConstValue::Object(Default::default())),
    )
    .argument(
        InputValue::new("orderBy", TypeRef::named_nn_list_nn(&list.names.order_by_input))
            .default_value(ConstValue::List(vec![])),
    )
    .argument(InputValue::new("take", TypeRef::named(TypeRef::INT)))
    .argument(
        InputValue::new("skip", TypeRef::named_nn(TypeRef::INT))
            .default_value(ConstValue::Number(0.into())),
    )
}

fn item_query(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.item_query,
        TypeRef::named(&list.names.output),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let condition = resolve_unique_where(&list, arg_json(&ctx, "where")?.as_ref())?;
                let row = store.find_first(&list.key, &condition).await?;
                Ok(row.map(FieldValue::owned_any))
            })
        },
    )
    .argument(InputValue::new(
        "where",
        TypeRef::named_nn(&list.names.where_unique_input),
    ))
}

fn count_query(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.count_query,
        TypeRef::named(TypeRef::INT),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let condition = resolve_where(&list, arg_json(&ctx, "where")?.as_ref())?;
                let count = store.count(&list.key, &condition).await?;
                Ok(Some(FieldValue::value(ConstValue::Number(count.into()))))
            })
        },
    )
    .argument(
        InputValue::new("where", TypeRef::named_nn(&list.names.where_input))
            .default_value(ConstValue::Object(Default::default())),
    )
}

fn create_mutation(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.create_mutation,
        TypeRef::named(&list.names.output),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let data = input_data(&ctx)?;
                let row = create_item(&list, store, None, data).await?;
                Ok(Some(FieldValue::owned_any(row)))
            })
        },
    )
    .argument(
        InputValue::new("data", TypeRef::named_nn(&list.names.create_input))
            .default_value(ConstValue::Object(Default::default())),
    )
}

fn update_mutation(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.update_mutation,
        TypeRef::named(&list.names.output),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let condition = resolve_unique_where(&list, arg_json(&ctx, "where")?.as_ref())?;
                let data = input_data(&ctx)?;
                let row = update_item(&list, store, &condition, data).await?;
                Ok(Some(FieldValue::owned_any(row)))
            })
        },
    )
    .argument(InputValue::new(
        "where",
        TypeRef::named_nn(&list.names.where_unique_input),
    ))
    .argument(InputValue::new(
        "data",
        TypeRef::named_nn(&list.names.update_input),
    ))
}

fn delete_mutation(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.delete_mutation,
        TypeRef::named(&list.names.output),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let condition = resolve_unique_where(&list, arg_json(&ctx, "where")?.as_ref())?;
                let item = store
                    .find_first(&list.key, &condition)
                    .await?
                    .ok_or_else(|| access_denied("delete", &list.key))?;
                let row = store.delete(&list.key, &item.id).await?;
                tracing::debug!(list = %list.key, id = ?row.id, "deleted item");
                Ok(Some(FieldValue::owned_any(row)))
            })
        },
    )
    .argument(InputValue::new(
        "where",
        TypeRef::named_nn(&list.names.where_unique_input),
    ))
}

/// The id of the only item of a singleton.
fn singleton_id() -> Value {
    Value::Int(1)
}

fn singleton_query(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.item_query,
        TypeRef::named(&list.names.output),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let row = store
                    .find_first(&list.key, &Condition::id(singleton_id()))
                    .await?;
                Ok(row.map(FieldValue::owned_any))
            })
        },
    )
}

/// Update the item of a singleton, creating it if it does not exist yet.
fn singleton_update_mutation(list: &Arc<InitialisedList>) -> Field {
    list_field(
        &list.names.update_mutation,
        TypeRef::named(&list.names.output),
        list,
        |list, ctx| {
            FieldFuture::new(async move {
                let store = ctx.data::<Store>()?;
                let data = input_data(&ctx)?;
                let condition = Condition::id(singleton_id());
                let row = match store.find_first(&list.key, &condition).await? {
                    Some(_) => update_item(&list, store, &condition, data).await?,
                    None => create_item(&list, store, Some(singleton_id()), data).await?,
                };
                Ok(Some(FieldValue::owned_any(row)))
            })
        },
    )
    .argument(InputValue::new(
        "data",
        TypeRef::named_nn(&list.names.update_input),
    ))
}

/// Resolve input data and run validation hooks, then insert a new item.
async fn create_item(
    list: &InitialisedList,
    store: &Store,
    id: Option<Value>,
    data: IndexMap<String, ConstValue>,
) -> Result<Row, Error> {
    let mut resolved = IndexMap::new();
    for field in list.fields.values() {
        let supplied = data
            .get(&field.key)
            .cloned()
            .map(Value::from_graphql)
            .transpose()?;
        let value = (field.descriptor.input.create.resolve)(supplied)?;
        resolved.insert(field.key.clone(), value);
    }
    validate(list, Operation::Create, &resolved, None).await?;

    let columns = into_columns(list, resolved);
    let row = match id {
        Some(id) => store.insert_with_id(&list.key, id, columns).await?,
        None => store.insert(&list.key, columns).await?,
    };
    tracing::debug!(list = %list.key, id = ?row.id, "created item");
    Ok(row)
}

/// Resolve the supplied input data and run validation hooks, then update an existing item.
async fn update_item(
    list: &InitialisedList,
    store: &Store,
    condition: &Condition,
    data: IndexMap<String, ConstValue>,
) -> Result<Row, Error> {
    let item = store
        .find_first(&list.key, condition)
        .await?
        .ok_or_else(|| access_denied("update", &list.key))?;

    let mut resolved = IndexMap::new();
    for (key, value) in data {
        let field = list
            .fields
            .get(&key)
            .ok_or_else(|| Error::new(format!("{} has no field {key}", list.key)))?;
        let value = (field.descriptor.input.update.resolve)(Value::from_graphql(value)?)?;
        resolved.insert(key, value);
    }
    validate(list, Operation::Update, &resolved, Some(&item)).await?;

    let row = store
        .update(&list.key, &item.id, into_columns(list, resolved))
        .await?;
    tracing::debug!(list = %list.key, id = ?row.id, "updated item");
    Ok(row)
}

/// Run the validation hook of every field, collecting all of their errors.
async fn validate(
    list: &InitialisedList,
    operation: Operation,
    resolved: &IndexMap<String, Value>,
    item: Option<&Row>,
) -> Result<(), Error> {
    let mut messages = vec![];
    for field in list.fields.values() {
        let Some(hook) = &field.descriptor.hooks.validate_input else {
            continue;
        };
        let mut errors = vec![];
        let mut args = ValidateInputArgs::new(
            &list.key,
            &field.key,
            operation,
            resolved,
            item,
            &mut errors,
        );
        hook.validate_input(&mut args).await?;
        messages.extend(
            errors
                .into_iter()
                .map(|msg| format!("  - {}.{}: {msg}", list.key, field.key)),
        );
    }
    if messages.is_empty() {
        return Ok(());
    }
    tracing::warn!(list = %list.key, %operation, ?messages, "rejected invalid input");
    Err(Error::new(format!(
        "You provided invalid data for this operation.\n{}",
        messages.join("\n")
    )))
}

/// Key resolved values by column instead of by field.
fn into_columns(list: &InitialisedList, resolved: IndexMap<String, Value>) -> IndexMap<String, Value> {
    resolved
        .into_iter()
        .map(|(key, value)| match list.fields.get(&key) {
            Some(field) => (field.column.clone(), value),
            None => (key, value),
        })
        .collect()
}

fn access_denied(action: &str, list_key: &str) -> Error {
    Error::new(format!(
        "Access denied: You cannot {action} that {list_key} - it may not exist"
    ))
}

/// The `data` argument, keyed by field, with explicit nulls kept.
fn input_data(ctx: &ResolverContext<'_>) -> Result<IndexMap<String, ConstValue>, Error> {
    let Some(data) = ctx.args.get("data") else {
        return Ok(Default::default());
    };
    Ok(data
        .object()?
        .iter()
        .map(|(name, value)| (name.to_string(), value.as_value().clone()))
        .collect())
}

/// An argument as JSON, or `None` if it is absent or null.
fn arg_json(ctx: &ResolverContext<'_>, name: &str) -> Result<Option<serde_json::Value>, Error> {
    match ctx.args.get(name) {
        Some(arg) if !arg.is_null() => Ok(Some(arg.as_value().clone().into_json()?)),
        _ => Ok(None),
    }
}

/// A non-negative integer argument.
fn arg_count(ctx: &ResolverContext<'_>, name: &str) -> Result<Option<usize>, Error> {
    match ctx.args.get(name) {
        Some(arg) if !arg.is_null() => {
            let n = arg.i64()?;
            usize::try_from(n)
                .map(Some)
                .map_err(|_| Error::new(format!("{name} must not be negative, got {n}")))
        }
        _ => Ok(None),
    }
}

fn id_to_graphql(id: &Value) -> ConstValue {
    match id {
        Value::Int(n) => ConstValue::String(n.to_string()),
        Value::String(s) => ConstValue::String(s.clone()),
        other => other.clone().into_graphql(),
    }
}

/// Interpret an `ID` input for a list with the given kind of ids.
fn parse_id(kind: IdKind, value: Value) -> Result<Value, Error> {
    match (kind, value) {
        (_, Value::Null) => Ok(Value::Null),
        (IdKind::Autoincrement, Value::Int(n)) => Ok(Value::Int(n)),
        (IdKind::Autoincrement, Value::String(s)) => s
            .parse()
            .map(Value::Int)
            .map_err(|_| Error::new(format!("Only an integer can be passed to id filters, got {s:?}"))),
        (IdKind::Cuid, Value::String(s)) => Ok(Value::String(s)),
        (IdKind::Cuid, Value::Int(n)) => Ok(Value::String(n.to_string())),
        (_, other) => Err(Error::new(format!("invalid id {other:?}"))),
    }
}

/// Resolve a `WhereInput` into a condition on rows.
fn resolve_where(list: &InitialisedList, input: Option<&serde_json::Value>) -> Result<Condition, Error> {
    let Some(input) = input else {
        return Ok(Condition::default());
    };
    let serde_json::Value::Object(entries) = input else {
        return Err(Error::new(format!("{} must be an object", list.names.where_input)));
    };

    let mut conditions = vec![];
    for (key, value) in entries {
        let condition = match key.as_str() {
            // Null combinators place no constraint.
            "AND" | "OR" | "NOT" if value.is_null() => continue,
            "AND" => Condition::All(resolve_where_list(list, value)?),
            "OR" => Condition::Any(resolve_where_list(list, value)?),
            "NOT" => Condition::Not(Box::new(Condition::Any(resolve_where_list(list, value)?))),
            // Items always have an id.
            "id" if value.is_null() => Condition::Any(vec![]),
            "id" => {
                let filter: Filter<Value> = serde_json::from_value(value.clone())?;
                Condition::Field {
                    column: "id".into(),
                    condition: FieldCondition::Filter(
                        filter.try_map(&|id| parse_id(list.id, id))?,
                    ),
                }
            }
            key => {
                let field = list.fields.get(key).ok_or_else(|| {
                    Error::new(format!("{} has no field {key}", list.names.where_input))
                })?;
                let filter: Option<Filter<Value>> = serde_json::from_value(value.clone())?;
                Condition::Field {
                    column: field.column.clone(),
                    condition: (field.descriptor.input.r#where.resolve)(filter)?,
                }
            }
        };
        conditions.push(condition);
    }
    Ok(Condition::All(conditions))
}

fn resolve_where_list(
    list: &InitialisedList,
    value: &serde_json::Value,
) -> Result<Vec<Condition>, Error> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| resolve_where(list, Some(item)))
            .collect(),
        item => Ok(vec![resolve_where(list, Some(item))?]),
    }
}

/// Resolve a `WhereUniqueInput`, which must name exactly one key.
fn resolve_unique_where(
    list: &InitialisedList,
    input: Option<&serde_json::Value>,
) -> Result<Condition, Error> {
    let entries = match input {
        Some(serde_json::Value::Object(entries)) => entries
            .iter()
            .filter(|(_, value)| !value.is_null())
            .collect::<Vec<_>>(),
        _ => vec![],
    };
    let [(key, value)] = entries[..] else {
        return Err(Error::new(format!(
            "Exactly one key must be passed in a unique where input but {} keys were passed",
            entries.len()
        )));
    };

    let value: Value = serde_json::from_value(value.clone())?;
    if key == "id" {
        return Ok(Condition::id(parse_id(list.id, value)?));
    }
    let field = list.fields.get(key.as_str()).ok_or_else(|| {
        Error::new(format!("{} has no field {key}", list.names.where_unique_input))
    })?;
    let unique = field.descriptor.input.unique_where.as_ref().ok_or_else(|| {
        Error::new(format!("{}.{key} is not a unique field", list.key))
    })?;
    Ok(Condition::column_equals(
        field.column.clone(),
        (unique.resolve)(value)?,
    ))
}

/// Resolve a list of `OrderByInput`s, each of which must name exactly one key.
fn resolve_order_by(
    list: &InitialisedList,
    input: Option<&serde_json::Value>,
) -> Result<Vec<OrderBy>, Error> {
    let items = match input {
        Some(serde_json::Value::Array(items)) => items.as_slice(),
        Some(item) => std::slice::from_ref(item),
        None => &[],
    };
    items
        .iter()
        .map(|item| {
            let entries = match item {
                serde_json::Value::Object(entries) => entries
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .collect::<Vec<_>>(),
                _ => vec![],
            };
            let [(key, direction)] = entries[..] else {
                return Err(Error::new(format!(
                    "Only a single key must be passed to {}",
                    list.names.order_by_input
                )));
            };
            let direction = direction
                .as_str()
                .and_then(|dir| dir.parse::<OrderDirection>().ok())
                .ok_or_else(|| Error::new(format!("invalid order direction {direction}")))?;
            let column = if key == "id" {
                "id".to_string()
            } else {
                list.fields
                    .get(key.as_str())
                    .ok_or_else(|| {
                        Error::new(format!("{} has no field {key}", list.names.order_by_input))
                    })?
                    .column
                    .clone()
            };
            Ok(OrderBy { column, direction })
        })
        .collect()
}
